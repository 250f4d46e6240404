//! kintone REST API endpoints, grouped by resource.
//!
//! Every operation checks its own arguments before touching the network;
//! a failed check is a [`KintoneError::Validation`] and sends nothing.

pub mod apps;
pub mod comments;
pub mod files;
pub mod records;
pub mod statuses;

pub use apps::{AppsApi, AppsQuery};
pub use comments::{CommentsApi, CommentsQuery};
pub use files::FilesApi;
pub use records::{RecordsApi, RecordsQuery};
pub use statuses::StatusesApi;

use crate::error::{KintoneError, KintoneResult};
use crate::models::Id;

/// Largest batch accepted by the bulk record and status endpoints.
pub const MAX_BATCH_RECORDS: usize = 100;

pub(crate) fn ensure_id(name: &str, value: Id) -> KintoneResult<()> {
    if value == 0 {
        return Err(KintoneError::validation(format!(
            "{} must be a positive integer",
            name
        )));
    }
    Ok(())
}

pub(crate) fn ensure_range(name: &str, value: u32, min: u32, max: u32) -> KintoneResult<()> {
    if value < min || value > max {
        return Err(KintoneError::validation(format!(
            "{} must be between {} and {}, got {}",
            name, min, max, value
        )));
    }
    Ok(())
}

pub(crate) fn ensure_not_blank(name: &str, value: &str) -> KintoneResult<()> {
    if value.trim().is_empty() {
        return Err(KintoneError::validation(format!("{} must not be empty", name)));
    }
    Ok(())
}

pub(crate) fn ensure_batch<T>(what: &str, items: &[T]) -> KintoneResult<()> {
    if items.is_empty() {
        return Err(KintoneError::validation(format!("at least one {} is required", what)));
    }
    if items.len() > MAX_BATCH_RECORDS {
        return Err(KintoneError::validation(format!(
            "cannot send more than {} {}s at once, got {}",
            MAX_BATCH_RECORDS,
            what,
            items.len()
        )));
    }
    Ok(())
}
