//! Per-screen data controllers.
//!
//! Every data screen follows the same pattern: mount or change of its
//! dependency key issues one fetch, the result starts as pending and is
//! replaced by the outcome of the most recently issued fetch only.

pub mod forms;
pub mod groups;
pub mod tasks;

use std::fmt::Debug;

use async_trait::async_trait;
use tracing::debug;

use crate::api::ApiGateway;
use crate::error::AppError;

pub use forms::{GroupForm, Submission, TaskForm};
pub use groups::{AllGroups, GroupDetailsScreen, GroupsList};
pub use tasks::{TaskDetailsScreen, TasksList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteResult<T> {
    Pending,
    Error(String),
    Ready(T),
}

impl<T> RemoteResult<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, RemoteResult::Pending)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            RemoteResult::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RemoteResult::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl<T> From<Result<T, AppError>> for RemoteResult<T> {
    fn from(outcome: Result<T, AppError>) -> Self {
        match outcome {
            Ok(data) => RemoteResult::Ready(data),
            Err(err) => RemoteResult::Error(err.to_string()),
        }
    }
}

/// Handle for one issued fetch. Only the latest ticket may settle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub key: K,
    serial: u64,
}

/// Result slot that discards completions of superseded fetches.
#[derive(Debug)]
pub struct Loader<K, T> {
    key: Option<K>,
    serial: u64,
    result: RemoteResult<T>,
}

impl<K, T> Default for Loader<K, T> {
    fn default() -> Self {
        Self {
            key: None,
            serial: 0,
            result: RemoteResult::Pending,
        }
    }
}

impl<K: Clone + PartialEq, T> Loader<K, T> {
    pub fn issue(&mut self, key: K) -> Ticket<K> {
        self.serial += 1;
        self.key = Some(key.clone());
        self.result = RemoteResult::Pending;
        Ticket {
            key,
            serial: self.serial,
        }
    }

    /// Applies `outcome` if `ticket` is still current. Returns whether it was.
    pub fn settle(&mut self, ticket: &Ticket<K>, outcome: Result<T, AppError>) -> bool {
        let current = ticket.serial == self.serial && self.key.as_ref() == Some(&ticket.key);
        if current {
            self.result = outcome.into();
        }
        current
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn result(&self) -> &RemoteResult<T> {
        &self.result
    }
}

/// The remote call behind one screen.
#[async_trait]
pub trait Fetch: Clone + Send + Sync + 'static {
    type Key: Clone + PartialEq + Debug + Send + Sync + 'static;
    type Output: Send + 'static;

    const NAME: &'static str;

    async fn fetch(&self, api: &dyn ApiGateway, key: &Self::Key) -> Result<Self::Output, AppError>;
}

pub struct ScreenController<F: Fetch> {
    fetcher: F,
    loader: Loader<F::Key, F::Output>,
    mounted: bool,
}

impl<F: Fetch> ScreenController<F> {
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            loader: Loader::default(),
            mounted: false,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Called when the screen appears. Always fetches.
    pub fn mount(&mut self, key: F::Key) -> Ticket<F::Key> {
        debug!("{} mounted with {:?}", F::NAME, key);
        self.mounted = true;
        self.loader.issue(key)
    }

    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Fetches only when `key` differs from the current dependency key.
    pub fn update_key(&mut self, key: F::Key) -> Option<Ticket<F::Key>> {
        if self.loader.key() == Some(&key) {
            return None;
        }
        debug!("{} key changed to {:?}", F::NAME, key);
        Some(self.loader.issue(key))
    }

    /// User-triggered refetch with the current key.
    pub fn retry(&mut self) -> Option<Ticket<F::Key>> {
        let key = self.loader.key()?.clone();
        debug!("{} retry with {:?}", F::NAME, key);
        Some(self.loader.issue(key))
    }

    pub fn settle(&mut self, ticket: &Ticket<F::Key>, outcome: Result<F::Output, AppError>) -> bool {
        let applied = self.loader.settle(ticket, outcome);
        if !applied {
            debug!("{} dropped stale result for {:?}", F::NAME, ticket.key);
        }
        applied
    }

    pub fn result(&self) -> &RemoteResult<F::Output> {
        self.loader.result()
    }

    pub fn key(&self) -> Option<&F::Key> {
        self.loader.key()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn later_ticket_wins_regardless_of_arrival_order() {
        let mut loader: Loader<String, &str> = Loader::default();
        let a = loader.issue("A".to_string());
        let b = loader.issue("B".to_string());

        assert!(loader.settle(&b, Ok("details of B")));
        assert!(!loader.settle(&a, Ok("details of A")));
        assert_eq!(loader.result(), &RemoteResult::Ready("details of B"));
    }

    #[test]
    fn stale_error_does_not_overwrite_pending() {
        let mut loader: Loader<u8, ()> = Loader::default();
        let first = loader.issue(1);
        let _second = loader.issue(2);

        assert!(!loader.settle(&first, Err(AppError::Transport("reset".to_string()))));
        assert!(loader.result().is_pending());
    }

    #[test]
    fn retry_supersedes_previous_fetch_with_same_key() {
        let mut loader: Loader<(), u32> = Loader::default();
        let first = loader.issue(());
        let again = loader.issue(());

        assert!(!loader.settle(&first, Ok(1)));
        assert!(loader.settle(&again, Ok(2)));
        assert_eq!(loader.result().data(), Some(&2));
    }

    #[test]
    fn errors_keep_the_normalized_message() {
        let mut loader: Loader<(), u32> = Loader::default();
        let ticket = loader.issue(());
        let err = AppError::Api {
            status: 404,
            message: "not found".to_string(),
        };
        loader.settle(&ticket, Err(err));
        assert_eq!(loader.result().error(), Some("API Error (404): not found"));
    }
}
