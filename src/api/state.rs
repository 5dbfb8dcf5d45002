//! Application state for the API server.

use std::sync::Arc;

use super::notifier::ChangeNotifier;
use crate::db::Database;

/// Shared application state: the database and the change notifier.
///
/// Generic over `D: Database` so handlers never name a concrete backend.
pub struct AppState<D: Database> {
    db: Arc<D>,
    notifier: ChangeNotifier,
}

// Manual Clone impl - only the Arc needs cloning, not D
impl<D: Database> Clone for AppState<D> {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            notifier: self.notifier.clone(),
        }
    }
}

impl<D: Database> AppState<D> {
    pub fn new(db: D, notifier: ChangeNotifier) -> Self {
        Self {
            db: Arc::new(db),
            notifier,
        }
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &D {
        &self.db
    }

    /// Get a reference to the change notifier.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}
