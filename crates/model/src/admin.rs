use mongodb::bson::oid::ObjectId;
use rand::Rng as _;
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

pub const DEFAULT_USERNAME: &str = "admin";
pub const DEFAULT_PASSWORD: &str = "admin123";

const SALT_LEN: usize = 16;

/// The single privileged account. Stored hash format is `salt_hex$digest_hex`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Admin {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    pub password_hash: String,
}

impl Admin {
    pub fn new(username: &str, password: &str) -> Admin {
        Admin {
            id: ObjectId::new(),
            username: username.to_string(),
            password_hash: hash_password(password),
        }
    }

    pub fn verify_password(&self, password: &str) -> bool {
        let Some((salt, digest)) = self.password_hash.split_once('$') else {
            return false;
        };
        let Ok(salt) = hex::decode(salt) else {
            return false;
        };
        hex::encode(digest_with_salt(&salt, password)) == digest
    }
}

fn hash_password(password: &str) -> String {
    let mut salt = [0u8; SALT_LEN];
    rand::thread_rng().fill(&mut salt);
    format!(
        "{}${}",
        hex::encode(salt),
        hex::encode(digest_with_salt(&salt, password))
    )
}

fn digest_with_salt(salt: &[u8], password: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(password.as_bytes());
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_accepts_the_right_password() {
        let admin = Admin::new("admin", "admin123");
        assert!(admin.verify_password("admin123"));
        assert!(!admin.verify_password("admin124"));
        assert!(!admin.verify_password(""));
    }

    #[test]
    fn hashes_are_salted() {
        let a = Admin::new("admin", "admin123");
        let b = Admin::new("admin", "admin123");
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[test]
    fn malformed_hash_never_verifies() {
        let mut admin = Admin::new("admin", "admin123");
        admin.password_hash = "not-a-hash".to_string();
        assert!(!admin.verify_password("admin123"));
    }
}
