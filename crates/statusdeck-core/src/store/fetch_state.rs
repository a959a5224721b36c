use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::CoreError;

/// Observable state of one fetched resource.
pub enum FetchState<T> {
    /// Nothing fetched yet.
    Loading,
    /// The last attempt failed and there is no prior data.
    Failed(CoreError),
    /// Fresh data.
    Ready {
        data: Arc<T>,
        fetched_at: DateTime<Utc>,
    },
    /// Prior data kept; the latest attempt failed.
    Stale {
        data: Arc<T>,
        fetched_at: DateTime<Utc>,
        error: CoreError,
    },
}

impl<T> FetchState<T> {
    /// Fold one fetch outcome into the state.
    pub fn apply(&mut self, result: Result<Arc<T>, CoreError>) {
        let previous = std::mem::replace(self, Self::Loading);
        *self = match (result, previous) {
            (Ok(data), _) => Self::Ready {
                data,
                fetched_at: Utc::now(),
            },
            (Err(error), Self::Ready { data, fetched_at } | Self::Stale { data, fetched_at, .. }) => {
                Self::Stale {
                    data,
                    fetched_at,
                    error,
                }
            }
            (Err(error), Self::Loading | Self::Failed(_)) => Self::Failed(error),
        };
    }

    pub fn data(&self) -> Option<&Arc<T>> {
        match self {
            Self::Ready { data, .. } | Self::Stale { data, .. } => Some(data),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&CoreError> {
        match self {
            Self::Failed(error) | Self::Stale { error, .. } => Some(error),
            Self::Loading | Self::Ready { .. } => None,
        }
    }

    /// When the data on hand was fetched (local clock).
    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Ready { fetched_at, .. } | Self::Stale { fetched_at, .. } => Some(*fetched_at),
            Self::Loading | Self::Failed(_) => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale { .. })
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Loading
    }
}

impl<T> Clone for FetchState<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Loading => Self::Loading,
            Self::Failed(error) => Self::Failed(error.clone()),
            Self::Ready { data, fetched_at } => Self::Ready {
                data: Arc::clone(data),
                fetched_at: *fetched_at,
            },
            Self::Stale {
                data,
                fetched_at,
                error,
            } => Self::Stale {
                data: Arc::clone(data),
                fetched_at: *fetched_at,
                error: error.clone(),
            },
        }
    }
}

impl<T> fmt::Debug for FetchState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("Loading"),
            Self::Failed(error) => f.debug_tuple("Failed").field(error).finish(),
            Self::Ready { fetched_at, .. } => {
                f.debug_struct("Ready").field("fetched_at", fetched_at).finish_non_exhaustive()
            }
            Self::Stale {
                fetched_at, error, ..
            } => f
                .debug_struct("Stale")
                .field("fetched_at", fetched_at)
                .field("error", error)
                .finish_non_exhaustive(),
        }
    }
}
