use std::fmt;

/// Request fields that can be reported as missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Username,
    Email,
    Password,
    Title,
    Price,
    Name,
    Message,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Username => "Username",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::Title => "Title",
            Field::Price => "Price",
            Field::Name => "Name",
            Field::Message => "Message",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Missing(Field),
}

/// Absent, null and empty strings all count as missing.
pub fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Collects every missing-field error of one request, in field order.
///
/// `require` hands back an empty string for a missing field; the value is
/// only meaningful once `finish` returned `Ok`.
#[derive(Debug, Default)]
pub struct Checks {
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn require(&mut self, field: Field, value: Option<String>) -> String {
        match present(value) {
            Some(v) => v,
            None => {
                self.errors.push(FieldError::Missing(field));
                String::new()
            }
        }
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}
