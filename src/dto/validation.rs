//! Validation helpers for DTOs.

use validator::ValidationError;

/// Maximum accepted length for submitter display names.
const SUBMITTER_NAME_MAX: usize = 80;

/// Validates that a submitter display name is non-blank and reasonably sized.
pub fn validate_submitter_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        let mut err = ValidationError::new("submitter_name_blank");
        err.message = Some("Submitter name must not be blank".into());
        return Err(err);
    }

    if name.chars().count() > SUBMITTER_NAME_MAX {
        let mut err = ValidationError::new("submitter_name_length");
        err.message = Some(
            format!("Submitter name must be at most {SUBMITTER_NAME_MAX} characters").into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_submitter_name_valid() {
        assert!(validate_submitter_name("Sister Allred").is_ok());
        assert!(validate_submitter_name("J").is_ok());
    }

    #[test]
    fn test_validate_submitter_name_blank() {
        assert!(validate_submitter_name("").is_err());
        assert!(validate_submitter_name("   ").is_err());
        assert!(validate_submitter_name("\t\n").is_err());
    }

    #[test]
    fn test_validate_submitter_name_too_long() {
        assert!(validate_submitter_name(&"x".repeat(81)).is_err());
        assert!(validate_submitter_name(&"x".repeat(80)).is_ok());
    }
}
