use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::mongodb::Id;

/// Core student data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentCore {
    pub name: String,
    /// University roll number, unique across students.
    pub roll_no: String,
    /// Email address, unique across students.
    pub email: String,
    /// Argon2-encoded password hash.
    pub password_hash: String,
    /// IDs of the elections this student has voted in.
    /// Mutated only by the vote recorder.
    #[serde(default)]
    pub has_voted: HashSet<Id>,
    /// Source images the face embeddings were generated from.
    #[serde(default)]
    pub image_urls: Vec<String>,
    /// Face embeddings from the external face service.
    #[serde(default)]
    pub face_embeddings: Vec<Vec<f64>>,
    /// Whether the face factor is required at login. Read once when the
    /// student signs in; login never inspects the embeddings directly.
    #[serde(default)]
    pub face_registered: bool,
    #[serde(default, with = "opt_bson_datetime")]
    pub embedding_updated_at: Option<DateTime<Utc>>,
    /// Outstanding password reset token, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_token: Option<String>,
    #[serde(default, with = "opt_bson_datetime")]
    pub reset_token_expires: Option<DateTime<Utc>>,
}

impl StudentCore {
    /// Create a student with no face factor and an empty voting history.
    pub fn new(name: String, roll_no: String, email: String, password_hash: String) -> Self {
        Self {
            name,
            roll_no,
            email,
            password_hash,
            has_voted: HashSet::new(),
            image_urls: Vec::new(),
            face_embeddings: Vec::new(),
            face_registered: false,
            embedding_updated_at: None,
            reset_token: None,
            reset_token_expires: None,
        }
    }

    /// Check a candidate password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_bytes()).unwrap_or(false)
    }

    /// Attach face data produced by the face service.
    pub fn register_face(&mut self, image_url: String, embedding: Vec<f64>, at: DateTime<Utc>) {
        self.image_urls.push(image_url);
        self.face_embeddings.push(embedding);
        self.face_registered = true;
        self.embedding_updated_at = Some(at);
    }
}

/// A student without an ID, ready for insertion.
pub type NewStudent = StudentCore;

/// A student from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub student: StudentCore,
}

impl Deref for Student {
    type Target = StudentCore;

    fn deref(&self) -> &Self::Target {
        &self.student
    }
}

impl DerefMut for Student {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.student
    }
}

/// `Option<DateTime<Utc>>` as an optional BSON datetime.
mod opt_bson_datetime {
    use chrono::{DateTime, Utc};
    use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct Wrapper(#[serde(with = "chrono_datetime_as_bson_datetime")] DateTime<Utc>);

    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.map(Wrapper).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
    }
}

/// Example data for tests.
#[cfg(test)]
mod examples {
    use super::*;

    impl Student {
        pub fn example() -> Self {
            Self {
                id: Id::new(),
                student: StudentCore::new(
                    "Tunde Bakare".to_string(),
                    "CS-1042".to_string(),
                    "tunde@campus.edu".to_string(),
                    // "correct horse battery staple"
                    "$argon2i$v=19$m=4096,t=3,p=1$c29tZXNhbHQ$L1J6Ld1bWLt9sYUMz1bunnFYfw+/sDh9Bz6Pe/tEXJY"
                        .to_string(),
                ),
            }
        }
    }
}
