use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::generate_id;

/// A registered subscriber. Owned by the auth subsystem; the monitor only
/// reads name and email to address notifications.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

impl Member {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        Self {
            id: generate_id(),
            name,
            email,
            password_hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_creation() {
        let member = Member::new(
            "Asha".to_string(),
            "asha@example.com".to_string(),
            "pbkdf2$fake".to_string(),
        );

        assert_eq!(member.name, "Asha");
        assert_eq!(member.email, "asha@example.com");
        assert_eq!(member.id.len(), 32);
    }
}
