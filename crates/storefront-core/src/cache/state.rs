// ── Query state as seen by subscribers ──

use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::key::{QueryData, QueryValue};
use crate::error::CoreError;

/// Loading, data, or error. Exactly one at a time.
#[derive(Debug)]
pub enum QueryStatus<T> {
    /// No result yet.
    Loading,
    Ready(Arc<T>),
    Failed(CoreError),
}

impl<T> Clone for QueryStatus<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Loading => Self::Loading,
            Self::Ready(data) => Self::Ready(Arc::clone(data)),
            Self::Failed(err) => Self::Failed(err.clone()),
        }
    }
}

/// Snapshot of one cache entry.
///
/// During a background refetch `status` keeps the previous result and
/// `is_fetching` is `true`.
#[derive(Debug)]
pub struct QueryState<T> {
    pub status: QueryStatus<T>,
    pub is_fetching: bool,
    /// When the last fetch completed, successfully or not.
    pub updated_at: Option<DateTime<Utc>>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            status: self.status.clone(),
            is_fetching: self.is_fetching,
            updated_at: self.updated_at,
        }
    }
}

impl<T> QueryState<T> {
    pub fn data(&self) -> Option<&Arc<T>> {
        match &self.status {
            QueryStatus::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match &self.status {
            QueryStatus::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.status, QueryStatus::Loading)
    }

    /// A result is present and no fetch is running.
    pub fn is_settled(&self) -> bool {
        !self.is_fetching && !self.is_loading()
    }
}

impl<T: QueryData> QueryState<T> {
    pub(crate) fn project(entry: &EntryState) -> Self {
        let status = match &entry.status {
            EntryStatus::Loading => QueryStatus::Loading,
            EntryStatus::Ready(value) => T::from_value(value).map_or_else(
                || QueryStatus::Failed(CoreError::Internal("cached value has the wrong shape".into())),
                QueryStatus::Ready,
            ),
            EntryStatus::Failed(err) => QueryStatus::Failed(err.clone()),
        };
        Self {
            status,
            is_fetching: entry.is_fetching,
            updated_at: entry.updated_at,
        }
    }
}

// ── Untyped entry state (what the cache stores) ─────────────────────

#[derive(Debug, Clone)]
pub(crate) enum EntryStatus {
    Loading,
    Ready(QueryValue),
    Failed(CoreError),
}

#[derive(Debug, Clone)]
pub(crate) struct EntryState {
    pub(crate) status: EntryStatus,
    pub(crate) is_fetching: bool,
    pub(crate) updated_at: Option<DateTime<Utc>>,
}

impl EntryState {
    pub(crate) fn loading() -> Self {
        Self {
            status: EntryStatus::Loading,
            is_fetching: false,
            updated_at: None,
        }
    }

    pub(crate) fn has_data(&self) -> bool {
        matches!(self.status, EntryStatus::Ready(_))
    }
}
