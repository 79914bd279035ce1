use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{
    errors::Error as JwtError, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use rocket::{
    http::{Cookie, SameSite, Status},
    outcome::{try_outcome, IntoOutcome},
    request::{self, FromRequest},
    Request, State,
};
use serde::{Deserialize, Serialize};

use crate::Config;

use super::code::Code;

pub const CHALLENGE_COOKIE: &str = "challenge";

/// An outstanding OTP challenge. Travels in a signed private cookie rather
/// than server memory, so any server process can verify it and restarts
/// lose nothing. The expiry is carried explicitly and checked on read.
#[derive(Debug, Serialize, Deserialize)]
pub struct Challenge {
    /// The email the code was issued for.
    pub email: String,
    #[serde(rename = "cod")]
    pub code: Code,
    #[serde(rename = "exp", with = "ts_seconds")]
    pub expire_at: DateTime<Utc>,
}

impl Challenge {
    /// Issue a fresh challenge for the given email.
    pub fn new(email: String, config: &Config) -> Self {
        Self {
            email,
            code: Code::random(),
            expire_at: Utc::now() + config.otp_ttl(),
        }
    }

    /// Has this challenge expired as of `now`?
    pub fn expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expire_at
    }

    /// Serialize this challenge into a cookie.
    pub fn into_cookie(self, config: &Config) -> Cookie<'static> {
        let ttl = self.expire_at - Utc::now();
        let token = jsonwebtoken::encode(
            &Header::default(),
            &self,
            &EncodingKey::from_secret(config.jwt_secret()),
        )
        .unwrap(); // Infallible.

        Cookie::build(CHALLENGE_COOKIE, token)
            .max_age(time::Duration::seconds(ttl.num_seconds()))
            .same_site(SameSite::Strict)
            .finish()
    }

    /// Deserialize a challenge from a cookie.
    pub fn from_cookie(cookie: &Cookie<'static>, config: &Config) -> Result<Self, JwtError> {
        jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|data: TokenData<Self>| data.claims)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for Challenge {
    type Error = JwtError;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let config = req.guard::<&State<Config>>().await.unwrap(); // Valid as `Config` is always managed

        let cookie = try_outcome!(req.cookies().get_private(CHALLENGE_COOKIE).or_forward(()));
        let challenge = try_outcome!(Self::from_cookie(&cookie, config)
            .into_outcome(Status::Unauthorized));
        request::Outcome::Success(challenge)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn expiry_is_checked_against_the_given_instant() {
        let challenge = Challenge {
            email: "tunde@campus.edu".to_string(),
            code: Code::random(),
            expire_at: Utc::now() + Duration::minutes(5),
        };
        assert!(!challenge.expired(Utc::now()));
        assert!(challenge.expired(challenge.expire_at));
        assert!(challenge.expired(challenge.expire_at + Duration::seconds(1)));
    }
}
