pub mod engagement;
pub mod posts;
pub mod social;
pub mod users;

use crate::infra::store::{StoreError, StoreResult};

/// Rejects a required text value that is empty.
pub(crate) fn require_text(field: &str, value: &str) -> StoreResult<()> {
    if value.is_empty() {
        return Err(StoreError::Invalid(format!("{} cannot be empty", field)));
    }
    Ok(())
}

/// Rejects text longer than its column allows, counted in characters.
pub(crate) fn require_max_len(field: &str, value: &str, max: usize) -> StoreResult<()> {
    if value.chars().count() > max {
        return Err(StoreError::Invalid(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}
