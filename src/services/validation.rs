use thiserror::Error;

pub const MAX_EMAIL_LEN: usize = 254;
pub const MAX_PASSWORD_BYTES: usize = 1024;
pub const MAX_FIELD_LEN: usize = 256;

/// A single rejected input field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Trim and lower-case. Uniqueness and lookups use this form.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Expects an already normalized address
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::new("email", "This field is required"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ValidationError::new("email", "Email address is too long"));
    }
    if email.chars().any(char::is_whitespace) {
        return Err(ValidationError::new("email", "Email address must not contain spaces"));
    }

    let mut parts = email.split('@');
    let (local, domain) = match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => (local, domain),
        _ => return Err(ValidationError::new("email", "Email address must contain a single '@'")),
    };
    let domain_ok = domain.contains('.') && domain.split('.').all(|label| !label.is_empty());
    if local.is_empty() || !domain_ok {
        return Err(ValidationError::new("email", "Invalid email address"));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new("password", "This field is required"));
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password", "Password is too long"));
    }
    Ok(())
}

/// Trimmed, required, bounded free-form text
pub fn clean_text_field(field: &'static str, raw: &str) -> Result<String, ValidationError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(ValidationError::new(field, "This field is required"));
    }
    if value.chars().count() > MAX_FIELD_LEN {
        return Err(ValidationError::new(
            field,
            format!("Must be at most {} characters", MAX_FIELD_LEN),
        ));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_email() {
        assert_eq!(normalize_email("  A@X.com "), "a@x.com");
    }

    #[test]
    fn accepts_plain_addresses() {
        assert!(validate_email("a@x.com").is_ok());
        assert!(validate_email("first.last+tag@mail.example.org").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        for bad in ["", "ax.com", "a@@x.com", "@x.com", "a@x", "a@.com", "a@x.", "a b@x.com"] {
            assert!(validate_email(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn password_must_be_present_and_bounded() {
        assert!(validate_password("pw1").is_ok());
        assert_eq!(validate_password("").unwrap_err().field, "password");
        assert!(validate_password(&"x".repeat(MAX_PASSWORD_BYTES + 1)).is_err());
    }

    #[test]
    fn text_fields_are_trimmed_and_required() {
        assert_eq!(clean_text_field("name", "  Bob ").unwrap(), "Bob");
        assert_eq!(clean_text_field("phone", "   ").unwrap_err().field, "phone");
        assert!(clean_text_field("name", &"n".repeat(MAX_FIELD_LEN + 1)).is_err());
    }
}
