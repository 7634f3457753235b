//! Domain errors

use std::collections::BTreeMap;

use thiserror::Error;

/// Field name → messages, the shape returned to clients on HTTP 422.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error on {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Validation errors")]
    ValidationErrors(FieldErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    /// Well-formed input the current state refuses, e.g. a wrong current password.
    #[error("{0}")]
    Rejected(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn duplicate(field: &str) -> Self {
        Self::validation(field, format!("The {} has already been taken.", field))
    }

    pub fn not_found(entity: &str) -> Self {
        DomainError::NotFound(format!("{} not found", entity))
    }

    /// Field-level detail for 422 responses, `None` for every other kind.
    pub fn field_errors(&self) -> Option<FieldErrors> {
        match self {
            DomainError::Validation { field, message } => {
                let mut errors = FieldErrors::new();
                errors.insert(field.clone(), vec![message.clone()]);
                Some(errors)
            }
            DomainError::ValidationErrors(errors) => Some(errors.clone()),
            _ => None,
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        for (field, list) in errors.field_errors() {
            let messages = list
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("The {} field is invalid.", field))
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }
        DomainError::ValidationErrors(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "The name field is required."))]
        name: String,
    }

    #[test]
    fn test_validator_errors_become_field_map() {
        let err: DomainError = Sample { name: String::new() }.validate().unwrap_err().into();
        let fields = err.field_errors().unwrap();
        assert_eq!(fields["name"], vec!["The name field is required.".to_string()]);
    }

    #[test]
    fn test_duplicate_is_a_validation_error() {
        let err = DomainError::duplicate("name");
        assert!(matches!(err, DomainError::Validation { ref field, .. } if field == "name"));
        assert!(DomainError::not_found("Role").field_errors().is_none());
    }
}
