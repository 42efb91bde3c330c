//! User account entity.

use serde::{Deserialize, Serialize};

use super::AccountStatus;
use crate::domain::foundation::{Timestamp, UserId, ValidationError};

/// A registered account.
///
/// `subscription_status` and `billing_customer_id` are owned by billing
/// reconciliation. Registration always starts at `Free` with no billing
/// reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub company_name: Option<String>,
    pub subscription_status: AccountStatus,
    pub billing_customer_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    /// Builds a new account from registration input.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the email or display name is unusable.
    pub fn register(
        email: &str,
        password_hash: String,
        display_name: &str,
        company_name: Option<String>,
        now: Timestamp,
    ) -> Result<Self, ValidationError> {
        let email = normalize_email(email)?;

        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ValidationError::empty_field("display_name"));
        }

        let company_name = company_name
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        Ok(Self {
            id: UserId::new(),
            email,
            password_hash,
            display_name: display_name.to_string(),
            company_name,
            subscription_status: AccountStatus::Free,
            billing_customer_id: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Returns true if a billing customer has already been bound.
    pub fn has_billing_customer(&self) -> bool {
        self.billing_customer_id.is_some()
    }
}

/// Trims and lower-cases an email address.
///
/// Emails are stored in this form so lookups are case-insensitive.
pub fn normalize_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::empty_field("email"));
    }

    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            Ok(email.to_lowercase())
        }
        _ => Err(ValidationError::invalid_format("email", "missing @ symbol")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(email: &str) -> Result<User, ValidationError> {
        User::register(
            email,
            "hash".to_string(),
            "Alice",
            Some("  Acme  ".to_string()),
            Timestamp::now(),
        )
    }

    #[test]
    fn register_starts_free_without_billing_reference() {
        let user = register("a@x.com").unwrap();
        assert_eq!(user.subscription_status, AccountStatus::Free);
        assert!(!user.has_billing_customer());
        assert_eq!(user.company_name.as_deref(), Some("Acme"));
    }

    #[test]
    fn register_lowercases_email() {
        let user = register("  Alice@Example.COM ").unwrap();
        assert_eq!(user.email, "alice@example.com");
    }

    #[test]
    fn register_rejects_bad_email() {
        assert!(matches!(register(""), Err(ValidationError::EmptyField { .. })));
        assert!(matches!(
            register("not-an-email"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(register("@x.com").is_err());
    }

    #[test]
    fn register_rejects_blank_display_name() {
        let result = User::register("a@x.com", "h".into(), "   ", None, Timestamp::now());
        assert!(matches!(result, Err(ValidationError::EmptyField { field }) if field == "display_name"));
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = register("a@x.com").unwrap();
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
    }
}
