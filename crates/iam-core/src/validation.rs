//! Request validation
//!
//! Runs before any store access. Every failure is an
//! [`AccountError::InvalidInput`].

use crate::error::{AccountError, AccountResult};
use crate::provisioner::KeyRequest;

const MAX_ACCOUNT_NAME_LEN: usize = 64;
const MAX_EMAIL_LEN: usize = 256;
const ACCESS_KEY_ID_LEN: std::ops::RangeInclusive<usize> = 4..=128;
const SECRET_KEY_LEN: std::ops::RangeInclusive<usize> = 8..=128;

fn invalid(message: impl Into<String>) -> AccountError {
    AccountError::InvalidInput(message.into())
}

/// Account names are 1 to 64 characters from `[A-Za-z0-9_+=,.@-]`
pub fn validate_account_name(name: &str) -> AccountResult<()> {
    if name.is_empty() || name.len() > MAX_ACCOUNT_NAME_LEN {
        return Err(invalid(format!("account name must be 1 to {MAX_ACCOUNT_NAME_LEN} characters")));
    }

    if let Some(c) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || "_+=,.@-".contains(*c))) {
        return Err(invalid(format!("account name contains invalid character {c:?}")));
    }

    Ok(())
}

pub fn validate_email(email: &str) -> AccountResult<()> {
    if email.is_empty() || email.len() > MAX_EMAIL_LEN {
        return Err(invalid(format!("email must be 1 to {MAX_EMAIL_LEN} characters")));
    }

    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(invalid("email must have the form local@domain")),
    }
}

/// Turn the optional caller-supplied key pair into a [`KeyRequest`].
///
/// Both halves must be given together.
pub fn validate_key_pair(access_key_id: Option<&str>, secret_key: Option<&str>) -> AccountResult<KeyRequest> {
    match (access_key_id, secret_key) {
        (None, None) => Ok(KeyRequest::Generated),
        (Some(id), Some(secret)) => {
            if !ACCESS_KEY_ID_LEN.contains(&id.len()) || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(invalid("access key id must be 4 to 128 alphanumeric characters"));
            }
            if !SECRET_KEY_LEN.contains(&secret.len())
                || !secret.chars().all(|c| c.is_ascii_graphic())
            {
                return Err(invalid("secret key must be 8 to 128 printable characters without whitespace"));
            }
            Ok(KeyRequest::Supplied { access_key_id: id.to_string(), secret_key: secret.to_string() })
        },
        (Some(_), None) => Err(invalid("access key id supplied without a secret key")),
        (None, Some(_)) => Err(invalid("secret key supplied without an access key id")),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    // =========================================================================
    // Account names
    // =========================================================================

    #[test]
    fn test_valid_account_names() {
        let longest = "n".repeat(64);
        for name in ["s3test", "a", "team.prod@corp", "x+y=z,w-v_u", longest.as_str()] {
            assert!(validate_account_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_account_names() {
        let too_long = "n".repeat(65);
        for name in ["", "has space", "slash/name", "ünïcode", too_long.as_str()] {
            assert!(
                matches!(validate_account_name(name), Err(AccountError::InvalidInput(_))),
                "{name:?} should be rejected"
            );
        }
    }

    // =========================================================================
    // Emails
    // =========================================================================

    #[test]
    fn test_email_rules() {
        assert!(validate_email("testuser@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("a@b@c").is_err());
        assert!(validate_email(&format!("{}@x.io", "a".repeat(256))).is_err());
    }

    // =========================================================================
    // Key pairs
    // =========================================================================

    #[test]
    fn test_key_pair_generated_when_absent() {
        assert_eq!(validate_key_pair(None, None).unwrap(), KeyRequest::Generated);
    }

    #[test]
    fn test_key_pair_supplied() {
        let request = validate_key_pair(Some("AKIASIASCustom"), Some("htuspscae/123/custom")).unwrap();
        assert_eq!(
            request,
            KeyRequest::Supplied {
                access_key_id: "AKIASIASCustom".to_string(),
                secret_key: "htuspscae/123/custom".to_string(),
            }
        );
    }

    #[test]
    fn test_key_pair_requires_both_halves() {
        assert!(validate_key_pair(Some("AKIASIASCustom"), None).is_err());
        assert!(validate_key_pair(None, Some("htuspscae/123/custom")).is_err());
    }

    #[test]
    fn test_key_pair_rejects_bad_values() {
        assert!(validate_key_pair(Some("AK"), Some("htuspscae/123")).is_err());
        assert!(validate_key_pair(Some("AKIA-DASH"), Some("htuspscae/123")).is_err());
        assert!(validate_key_pair(Some("AKIASIAS"), Some("short")).is_err());
        assert!(validate_key_pair(Some("AKIASIAS"), Some("has white space")).is_err());
    }
}
