use serde::{Deserialize, Serialize};

use crate::auth::repo_types::{NewUser, User};
use crate::validation::{present, Checks, Field, FieldError};

/// Request body for user registration.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewUser, Vec<FieldError>> {
        let mut checks = Checks::default();
        let username = checks.require(Field::Username, self.username);
        let email = checks.require(Field::Email, self.email);
        let password = checks.require(Field::Password, self.password);
        checks.finish()?;
        Ok(NewUser {
            username,
            email,
            password,
        })
    }
}

/// Request body for login.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl LoginRequest {
    /// Both fields or nothing; login reports a single combined message.
    pub fn credentials(self) -> Option<(String, String)> {
        Some((present(self.username)?, present(self.password)?))
    }
}

/// Public part of the user returned to the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<User> for PublicUser {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            email: u.email,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_reports_every_missing_field() {
        let errors = RegisterRequest::default().validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::Missing(Field::Username),
                FieldError::Missing(Field::Email),
                FieldError::Missing(Field::Password),
            ]
        );
    }

    #[test]
    fn login_needs_both_fields() {
        let req = LoginRequest {
            username: Some("admin".into()),
            password: Some(String::new()),
        };
        assert!(req.credentials().is_none());
    }

    #[test]
    fn public_user_never_carries_the_password() {
        let user = User {
            id: 1,
            username: "admin".into(),
            email: "admin@bookstore.com".into(),
            password: "admin123".into(),
        };
        let json = serde_json::to_string(&PublicUser::from(user)).unwrap();
        assert!(json.contains("admin@bookstore.com"));
        assert!(!json.contains("admin123"));
    }
}
