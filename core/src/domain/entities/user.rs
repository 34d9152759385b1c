//! User entity representing a registered account.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User entity representing a registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    /// Login email, stored normalized
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// bcrypt hash of the password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Creates a new User instance
    pub fn new(email: String, first_name: String, last_name: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            first_name,
            last_name,
            password_hash,
            created_at: Utc::now(),
        }
    }

    /// Name shown to other people
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new(
            "ann@example.com".to_string(),
            "Ann".to_string(),
            "Lee".to_string(),
            "$2b$04$hash".to_string(),
        );

        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.display_name(), "Ann Lee");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("a@b.io".to_string(), "A".to_string(), String::new(), "secret-hash".to_string());
        let json = serde_json::to_string(&user).unwrap();

        assert!(!json.contains("secret-hash"));
        assert_eq!(user.display_name(), "A");
    }
}
