use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LEN: usize = 6;

/// Registered account
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    /// PHC-formatted Argon2 hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Body of `/auth/register` and `/auth/login`
#[derive(Clone, Deserialize, PartialEq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Checks the email shape and password length, and normalizes the email
    ///
    /// Emails are trimmed and lowercased so that lookups are case-insensitive.
    pub fn validated(self) -> AppResult<Self> {
        let email = self.email.trim().to_lowercase();
        if !is_plausible_email(&email) || self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput("invalid_body".to_string()));
        }
        Ok(Self {
            email,
            password: self.password,
        })
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty() && !tld.ends_with('.'))
}

/// Public view of the caller returned by `/me`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
}

/// Bearer token handed out on registration and login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthToken {
    pub token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(email: &str, password: &str) -> Credentials {
        Credentials {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_validated_normalizes_email() {
        let valid = creds("  Alice@Example.COM ", "secret1").validated().unwrap();
        assert_eq!(valid.email, "alice@example.com");
        assert_eq!(valid.password, "secret1");
    }

    #[test]
    fn test_validated_rejects_bad_input() {
        for (email, password) in [
            ("alice@example.com", "short"),
            ("alice", "secret1"),
            ("@example.com", "secret1"),
            ("alice@localhost", "secret1"),
            ("alice@@example.com", "secret1"),
            ("al ice@example.com", "secret1"),
            ("alice@example.", "secret1"),
        ] {
            let result = creds(email, password).validated();
            assert!(
                matches!(result, Err(AppError::InvalidInput(ref msg)) if msg == "invalid_body"),
                "{email} / {password} should be rejected"
            );
        }
    }

    #[test]
    fn test_password_hash_is_never_serialized() {
        let user = User {
            id: "u1".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["email"], "alice@example.com");
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let debug = format!("{:?}", creds("alice@example.com", "hunter22"));
        assert!(!debug.contains("hunter22"));
    }
}
