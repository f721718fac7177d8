//! Constraint tables evaluated into `validator` errors.
//!
//! Entities describe their rules as plain data through [`Constrained`]; the
//! evaluation lives here so the entity itself never rejects a value.

use std::borrow::Cow;

use validator::{ValidateLength, ValidateRange, ValidationError, ValidationErrors};

use crate::upload::UploadedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Text must contain a non-whitespace character; references and files
    /// must be present.
    NotBlank,
    /// Text may hold at most this many characters.
    MaxLength(usize),
    /// An attached file may weigh at most this many bytes.
    MaxFileSize(u64),
}

#[derive(Debug, Clone, Copy)]
pub enum FieldValue<'a> {
    Text(&'a str),
    OptionalText(Option<&'a str>),
    Reference(bool),
    File(Option<&'a UploadedFile>),
}

#[derive(Debug, Clone, Copy)]
pub struct FieldConstraints {
    pub field: &'static str,
    pub constraints: &'static [Constraint],
}

pub trait Constrained {
    fn constraints() -> &'static [FieldConstraints];

    fn field_value(&self, field: &str) -> Option<FieldValue<'_>>;
}

pub fn validate_constraints<T: Constrained>(entity: &T) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let mut failed = false;

    for rule in T::constraints() {
        let Some(value) = entity.field_value(rule.field) else {
            tracing::warn!(field = rule.field, "Constraint declared for unknown field");
            continue;
        };

        for constraint in rule.constraints {
            if let Some(error) = constraint.check(value) {
                errors.add(rule.field, error);
                failed = true;
            }
        }
    }

    if failed {
        Err(errors)
    } else {
        Ok(())
    }
}

impl Constraint {
    pub fn check(&self, value: FieldValue<'_>) -> Option<ValidationError> {
        match (self, value) {
            (Constraint::NotBlank, FieldValue::Text(text))
            | (Constraint::NotBlank, FieldValue::OptionalText(Some(text))) => {
                text.trim().is_empty().then(not_blank)
            }
            (Constraint::NotBlank, FieldValue::OptionalText(None)) => Some(not_blank()),
            (Constraint::NotBlank, FieldValue::Reference(present)) => (!present).then(not_blank),
            (Constraint::NotBlank, FieldValue::File(file)) => file.is_none().then(not_blank),

            (Constraint::MaxLength(max), FieldValue::Text(text))
            | (Constraint::MaxLength(max), FieldValue::OptionalText(Some(text))) => {
                let max_chars = u64::try_from(*max).unwrap_or(u64::MAX);
                (!text.validate_length(None, Some(max_chars), None)).then(|| {
                    let mut error = ValidationError::new("max_length");
                    error.add_param(Cow::from("max"), max);
                    error.message = Some(Cow::from(format!(
                        "This value is too long. It should have {} characters or less.",
                        max
                    )));
                    error
                })
            }

            (Constraint::MaxFileSize(max), FieldValue::File(Some(file))) => {
                (!file.size().validate_range(None, Some(*max), None, None)).then(|| {
                    let mut error = ValidationError::new("max_file_size");
                    error.add_param(Cow::from("max"), max);
                    error.add_param(Cow::from("size"), &file.size());
                    error.message = Some(Cow::from(format!(
                        "The file is too large ({} bytes). Allowed maximum size is {} bytes.",
                        file.size(),
                        max
                    )));
                    error
                })
            }

            _ => None,
        }
    }
}

fn not_blank() -> ValidationError {
    let mut error = ValidationError::new("not_blank");
    error.message = Some(Cow::from("This value should not be blank."));
    error
}
