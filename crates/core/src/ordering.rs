//! Ordering of builder blocks (landing sections, components, form questions).
//!
//! Blocks carry an integer `order_index`. A reorder request must name every
//! existing block exactly once; the repository then rewrites all indices
//! inside a single transaction.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::types::DbId;

/// Validate that `requested` is a permutation of `existing`.
pub fn validate_reorder(existing: &[DbId], requested: &[DbId]) -> Result<(), CoreError> {
    let mut seen = HashSet::with_capacity(requested.len());
    for id in requested {
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!(
                "Duplicate id {id} in reorder request"
            )));
        }
    }

    let existing: HashSet<DbId> = existing.iter().copied().collect();
    if let Some(unknown) = requested.iter().find(|id| !existing.contains(id)) {
        return Err(CoreError::Validation(format!(
            "Id {unknown} does not belong to this container"
        )));
    }
    if seen.len() != existing.len() {
        return Err(CoreError::Validation(format!(
            "Reorder request must list all {} items, got {}",
            existing.len(),
            seen.len()
        )));
    }
    Ok(())
}
