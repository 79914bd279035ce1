use std::ops::Deref;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::mongodb::{Coll, Id};

/// Core admin user data, as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCore {
    pub username: String,
    /// Argon2-encoded password hash.
    pub password_hash: String,
}

impl AdminCore {
    /// Create an admin, hashing the given password.
    pub fn new(username: String, password: &str) -> Self {
        let salt: [u8; 16] = rand::thread_rng().gen();
        let password_hash =
            argon2::hash_encoded(password.as_bytes(), &salt, &argon2::Config::default())
                .unwrap(); // Infallible with the default config.
        Self {
            username,
            password_hash,
        }
    }

    /// Check a candidate password against the stored hash.
    pub fn verify_password(&self, password: &str) -> bool {
        argon2::verify_encoded(&self.password_hash, password.as_bytes()).unwrap_or(false)
    }
}

/// An admin without an ID, ready for insertion.
pub type NewAdmin = AdminCore;

/// An admin user from the database, with its unique ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: Id,
    #[serde(flatten)]
    pub admin: AdminCore,
}

impl Deref for Admin {
    type Target = AdminCore;

    fn deref(&self) -> &Self::Target {
        &self.admin
    }
}

/// Login credentials for an admin.
#[derive(Debug, Serialize, Deserialize)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

/// Ensure at least one admin account exists, inserting the configured
/// default if the collection is empty. Idempotent.
pub async fn ensure_admin_exists(
    admins: &Coll<NewAdmin>,
    default_username: &str,
    default_password: &str,
) -> Result<()> {
    let count = admins.count_documents(None, None).await?;
    if count == 0 {
        warn!("No admin accounts found, creating the default admin");
        let admin = NewAdmin::new(default_username.to_string(), default_password);
        admins.insert_one(admin, None).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_round_trips_through_the_hash() {
        let admin = AdminCore::new("returning-officer".to_string(), "hunter2");
        assert!(admin.verify_password("hunter2"));
        assert!(!admin.verify_password("hunter3"));
        // The raw password never appears in the stored form.
        assert!(!admin.password_hash.contains("hunter2"));
    }
}
