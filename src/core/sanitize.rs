use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    #[error("must not be empty")]
    Empty,
    #[error("must be at least {min} characters")]
    TooShort { min: usize },
    #[error("must not exceed {max} characters")]
    TooLong { max: usize },
}

/// Trim, strip every `<` and `>`, then enforce bounds (in chars) on what remains.
pub fn sanitize(raw: &str, min_len: usize, max_len: usize) -> Result<String, SanitizeError> {
    let cleaned: String = raw.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect();
    let len = cleaned.chars().count();
    if len == 0 {
        return Err(SanitizeError::Empty);
    }
    if len < min_len {
        return Err(SanitizeError::TooShort { min: min_len });
    }
    if len > max_len {
        return Err(SanitizeError::TooLong { max: max_len });
    }
    Ok(cleaned)
}
