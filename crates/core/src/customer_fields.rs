//! Customer authentication field catalog and validation.
//!
//! Providers configure which customer-identifying fields a proxy must supply
//! with each request. Field keys are lowerCamelCase identifiers; the keys of
//! a request's customerInfo map must stay within the provider's configured
//! set, checked at creation time rather than by the data model.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Customer's full name as held by the provider.
pub const FIELD_CUSTOMER_NAME: &str = "customerName";

/// Email address on the customer's account.
pub const FIELD_CUSTOMER_EMAIL: &str = "customerEmail";

/// Provider-side account identifier.
pub const FIELD_ACCOUNT_NUMBER: &str = "accountNumber";

/// Last four digits of the card on file.
pub const FIELD_LAST_FOUR_CC: &str = "lastFourCCDigits";

/// The built-in authentication fields a provider can require. New tenants
/// start with name and email.
pub const KNOWN_AUTH_FIELDS: &[&str] = &[
    FIELD_CUSTOMER_NAME,
    FIELD_CUSTOMER_EMAIL,
    FIELD_ACCOUNT_NUMBER,
    FIELD_LAST_FOUR_CC,
];

/// Default required set for a newly created provider tenant.
pub const DEFAULT_REQUIRED_FIELDS: &[&str] = &[FIELD_CUSTOMER_NAME, FIELD_CUSTOMER_EMAIL];

static FIELD_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-zA-Z0-9]*$").expect("valid regex"));

/// Validate a single field key: lowerCamelCase identifier, since keys become
/// change-entry field paths (`customerInfo.<key>`).
pub fn validate_field_key(key: &str) -> Result<(), CoreError> {
    if FIELD_KEY_RE.is_match(key) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid customer field key '{key}'. Keys are lowerCamelCase identifiers"
        )))
    }
}

/// Validate a provider's required-field configuration.
pub fn validate_required_fields(fields: &[String]) -> Result<(), CoreError> {
    for key in fields {
        validate_field_key(key)?;
    }
    Ok(())
}

/// Check submitted customerInfo keys against the provider's configured set.
pub fn validate_customer_info<'a>(
    keys: impl Iterator<Item = &'a String>,
    allowed: &[String],
) -> Result<(), CoreError> {
    for key in keys {
        validate_field_key(key)?;
        if !allowed.iter().any(|f| f == key) {
            return Err(CoreError::Validation(format!(
                "Customer field '{key}' is not required by this provider. Allowed: {}",
                allowed.join(", ")
            )));
        }
    }
    Ok(())
}
