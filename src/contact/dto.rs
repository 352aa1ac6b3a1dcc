use serde::{Deserialize, Serialize};

use crate::contact::repo::NewContactMessage;
use crate::validation::{Checks, Field, FieldError};

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

impl ContactRequest {
    pub fn validate(self) -> Result<NewContactMessage, Vec<FieldError>> {
        let mut checks = Checks::default();
        let name = checks.require(Field::Name, self.name);
        let email = checks.require(Field::Email, self.email);
        let message = checks.require(Field::Message, self.message);
        checks.finish()?;
        Ok(NewContactMessage {
            name,
            email,
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_fields_are_reported() {
        let errors = ContactRequest {
            name: Some("Ann".into()),
            email: None,
            message: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            errors,
            vec![FieldError::Missing(Field::Email), FieldError::Missing(Field::Message)]
        );
    }
}
