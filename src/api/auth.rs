use chrono::Utc;
use mongodb::bson::doc;
use rocket::{
    http::{Cookie, CookieJar, Status},
    serde::json::Json,
    Route, State,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    face::FaceClient,
    model::{
        admin::{Admin, AdminCredentials},
        auth::{AuthToken, AUTH_TOKEN_COOKIE},
        mongodb::{Coll, Id},
        otp::{Challenge, Code, CHALLENGE_COOKIE},
        student::Student,
    },
    Config,
};

pub fn routes() -> Vec<Route> {
    routes![
        authenticate_admin,
        login,
        request_otp,
        verify_otp,
        request_password_reset,
        confirm_password_reset,
        logout,
    ]
}

#[post("/auth/admin", data = "<credentials>", format = "json")]
async fn authenticate_admin(
    cookies: &CookieJar<'_>,
    credentials: Json<AdminCredentials>,
    admins: Coll<Admin>,
    config: &State<Config>,
) -> Result<()> {
    let with_username = doc! {
        "username": &credentials.username
    };

    let admin = admins
        .find_one(with_username, None)
        .await?
        .filter(|admin| admin.verify_password(&credentials.password))
        .ok_or_else(|| {
            Error::Status(
                Status::Unauthorized,
                "No admin found with the provided username and password combination.".to_string(),
            )
        })?;

    let token = AuthToken::new(&admin);
    cookies.add(token.into_cookie(config));

    Ok(())
}

/// A student password login, optionally carrying a face image for the
/// second factor.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    email: String,
    password: String,
    face_image: Option<String>,
}

/// What the client gets back after any successful login.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionInfo {
    id: Id,
    name: String,
    email: String,
    has_voted: Vec<Id>,
}

impl From<&Student> for SessionInfo {
    fn from(student: &Student) -> Self {
        Self {
            id: student.id,
            name: student.name.clone(),
            email: student.email.clone(),
            has_voted: student.has_voted.iter().copied().collect(),
        }
    }
}

#[post("/auth/login", data = "<request>", format = "json")]
async fn login(
    cookies: &CookieJar<'_>,
    request: Json<LoginRequest>,
    students: Coll<Student>,
    face: &State<FaceClient>,
    config: &State<Config>,
) -> Result<Json<SessionInfo>> {
    let student = student_by_email(&request.email, &students).await?;

    if !student.verify_password(&request.password) {
        return Err(Error::Status(
            Status::Unauthorized,
            "Invalid credentials".to_string(),
        ));
    }

    // The face factor is a capability flag on the student record, decided
    // once here rather than scattered across call sites.
    if student.face_registered {
        let face_image = request.face_image.as_deref().ok_or_else(|| {
            Error::Status(
                Status::BadRequest,
                "A face image is required for this account".to_string(),
            )
        })?;
        let decision = face.verify(face_image, &student.face_embeddings).await?;
        if !decision.matched {
            return Err(Error::Status(
                Status::Unauthorized,
                format!(
                    "Face verification failed (confidence {:.2}%)",
                    decision.confidence * 100.0
                ),
            ));
        }
        info!(
            "Face verification passed for {} (confidence {:.2}%)",
            student.email,
            decision.confidence * 100.0
        );
    }

    let token = AuthToken::new(&student);
    cookies.add(token.into_cookie(config));

    Ok(Json(SessionInfo::from(&student)))
}

#[derive(Debug, Deserialize)]
struct OtpRequest {
    email: String,
}

#[post("/auth/otp/request", data = "<request>", format = "json")]
async fn request_otp(
    cookies: &CookieJar<'_>,
    request: Json<OtpRequest>,
    students: Coll<Student>,
    config: &State<Config>,
) -> Result<()> {
    // Only known students get a challenge.
    let student = student_by_email(&request.email, &students).await?;

    let challenge = Challenge::new(student.email.clone(), config);
    // TODO: hand the message off to the campus mail relay once it is provisioned.
    debug!("OTP code for {}: {}", student.email, challenge.code);
    info!("Issued OTP challenge for {}", student.email);

    cookies.add_private(challenge.into_cookie(config));

    Ok(())
}

#[post("/auth/otp/verify", data = "<code>", format = "json")]
async fn verify_otp(
    code: Json<Code>,
    challenge: Challenge,
    cookies: &CookieJar<'_>,
    students: Coll<Student>,
    config: &State<Config>,
) -> Result<Json<SessionInfo>> {
    // The challenge carries its own expiry; check it before the code so a
    // stale cookie can never authenticate.
    if challenge.expired(Utc::now()) {
        cookies.remove_private(Cookie::named(CHALLENGE_COOKIE));
        return Err(Error::Status(
            Status::Unauthorized,
            "OTP expired, request a new one".to_string(),
        ));
    }
    if challenge.code != *code {
        return Err(Error::Status(
            Status::Unauthorized,
            "Incorrect OTP code".to_string(),
        ));
    }

    let student = student_by_email(&challenge.email, &students).await?;

    cookies.remove_private(Cookie::named(CHALLENGE_COOKIE));
    let token = AuthToken::new(&student);
    cookies.add(token.into_cookie(config));

    Ok(Json(SessionInfo::from(&student)))
}

#[derive(Debug, Deserialize)]
struct ResetRequest {
    email: String,
}

#[post("/auth/reset/request", data = "<request>", format = "json")]
async fn request_password_reset(
    request: Json<ResetRequest>,
    students: Coll<Student>,
    config: &State<Config>,
) -> Result<()> {
    let student = student_by_email(&request.email, &students).await?;

    let token = reset_token();
    let expires = Utc::now() + config.reset_ttl();
    students
        .update_one(
            student.id.as_doc(),
            doc! { "$set": {
                "reset_token": &token,
                "reset_token_expires": mongodb::bson::DateTime::from_chrono(expires),
            }},
            None,
        )
        .await?;

    // TODO: hand the message off to the campus mail relay once it is provisioned.
    debug!("Password reset token for {}: {token}", student.email);
    info!("Issued password reset token for {}", student.email);

    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetConfirm {
    email: String,
    token: String,
    new_password: String,
}

#[post("/auth/reset/confirm", data = "<request>", format = "json")]
async fn confirm_password_reset(
    request: Json<ResetConfirm>,
    students: Coll<Student>,
) -> Result<()> {
    let student = student_by_email(&request.email, &students).await?;

    let valid = student.reset_token.as_deref() == Some(request.token.as_str())
        && student
            .reset_token_expires
            .map(|expires| Utc::now() < expires)
            .unwrap_or(false);
    if !valid {
        return Err(Error::Status(
            Status::Unauthorized,
            "Invalid or expired reset token".to_string(),
        ));
    }

    let salt: [u8; 16] = rand::random();
    let password_hash = argon2::hash_encoded(
        request.new_password.as_bytes(),
        &salt,
        &argon2::Config::default(),
    )
    .unwrap(); // Infallible with the default config.

    students
        .update_one(
            student.id.as_doc(),
            doc! {
                "$set": { "password_hash": password_hash },
                "$unset": { "reset_token": "", "reset_token_expires": "" },
            },
            None,
        )
        .await?;

    info!("Password reset for {}", student.email);

    Ok(())
}

#[post("/auth/logout")]
fn logout(cookies: &CookieJar<'_>) -> Result<()> {
    cookies.remove(Cookie::named(AUTH_TOKEN_COOKIE));
    Ok(())
}

/// Look up a student by email.
async fn student_by_email(email: &str, students: &Coll<Student>) -> Result<Student> {
    students
        .find_one(doc! { "email": email }, None)
        .await?
        .ok_or_else(|| {
            Error::Status(
                Status::NotFound,
                format!("No student found with email {email:?}"),
            )
        })
}

/// A fresh random reset token, hex-encoded.
fn reset_token() -> String {
    let bytes: [u8; 16] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
