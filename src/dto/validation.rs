//! Validation helpers for DTOs.

use validator::ValidationError;

/// Longest accepted player or team name, in characters.
pub const MAX_NAME_CHARS: usize = 64;

/// Validates a display name: 1 to 64 characters once trimmed, no control
/// characters.
///
/// # Examples
///
/// ```ignore
/// validate_display_name("Ana")     // Ok
/// validate_display_name("   ")     // Err - blank
/// validate_display_name("Ana\nB")  // Err - control character
/// ```
pub fn validate_display_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        let mut err = ValidationError::new("name_blank");
        err.message = Some("Name must not be blank".into());
        return Err(err);
    }

    let chars = trimmed.chars().count();
    if chars > MAX_NAME_CHARS {
        let mut err = ValidationError::new("name_length");
        err.message =
            Some(format!("Name must be at most {MAX_NAME_CHARS} characters (got {chars})").into());
        return Err(err);
    }

    if trimmed.chars().any(char::is_control) {
        let mut err = ValidationError::new("name_format");
        err.message = Some("Name must not contain control characters".into());
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_display_name_valid() {
        assert!(validate_display_name("Ana").is_ok());
        assert!(validate_display_name("  Zoé Martin ").is_ok());
        assert!(validate_display_name(&"x".repeat(MAX_NAME_CHARS)).is_ok());
    }

    #[test]
    fn test_validate_display_name_invalid_length() {
        assert!(validate_display_name("").is_err());
        assert!(validate_display_name("   ").is_err());
        assert!(validate_display_name(&"x".repeat(MAX_NAME_CHARS + 1)).is_err());
    }

    #[test]
    fn test_validate_display_name_invalid_format() {
        assert!(validate_display_name("Ana\nB").is_err());
        assert!(validate_display_name("tab\there").is_err());
    }
}
