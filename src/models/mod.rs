// src/models/mod.rs

use validator::ValidationError;

pub mod course;
pub mod order;
pub mod progress;
pub mod session;
pub mod task;
pub mod user;

/// Rejects values that are empty once trimmed. Length checks alone let
/// whitespace-only input through, and handlers trim before storing.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("not_blank").with_message("Must not be blank.".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_are_rejected() {
        assert!(not_blank("").is_err());
        assert!(not_blank("   ").is_err());
        assert!(not_blank("\t\n").is_err());
        assert!(not_blank(" ok ").is_ok());
    }
}
