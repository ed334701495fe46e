use crate::models::FieldError;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;

pub const TITLE_FIELD: &str = "title";
pub const DESCRIPTION_FIELD: &str = "description";

/// Pre-flight check mirroring the backend rules. The backend stays authoritative.
///
/// Lengths are counted in characters, after trimming. An empty description is
/// treated as absent.
pub fn validate_draft(title: &str, description: Option<&str>) -> Result<(), Vec<FieldError>> {
    let mut errors = Vec::new();

    let title = title.trim();
    if title.is_empty() {
        errors.push(FieldError::new(TITLE_FIELD, "Title is required"));
    } else if title.chars().count() > TITLE_MAX_CHARS {
        errors.push(FieldError::new(
            TITLE_FIELD,
            format!("Title must be at most {TITLE_MAX_CHARS} characters"),
        ));
    }

    let description = description.map(str::trim).unwrap_or_default();
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.push(FieldError::new(
            DESCRIPTION_FIELD,
            format!("Description must be at most {DESCRIPTION_MAX_CHARS} characters"),
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
