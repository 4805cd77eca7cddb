use crate::catalog::Movie;
use crate::storage::{Storage, StorageError};
use std::collections::HashSet;
use std::sync::Arc;

/// Storage slot holding the JSON array of saved movies.
pub const WATCHLIST_SLOT: &str = "filmflux_watchlist";

/// The user's saved movies, mirrored to a storage slot on every mutation.
///
/// Entries are snapshots taken when the movie was added. Ids are unique and
/// the id set in memory always matches the one last written to storage: a
/// mutation whose write fails is rolled back before the error is returned.
pub struct WatchlistStore {
    storage: Arc<dyn Storage>,
    entries: Vec<Movie>,
    ids: HashSet<u64>,
}

impl WatchlistStore {
    /// Load the persisted watchlist. Missing or unreadable data yields an
    /// empty list; the condition is logged and never reported to the caller.
    pub fn initialize(storage: Arc<dyn Storage>) -> Self {
        let loaded = match storage.read(WATCHLIST_SLOT) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Movie>>(&raw) {
                Ok(movies) => movies,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to parse saved watchlist, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                tracing::debug!("No saved watchlist, starting empty");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read saved watchlist, starting empty");
                Vec::new()
            }
        };

        let mut ids = HashSet::with_capacity(loaded.len());
        let mut entries = Vec::with_capacity(loaded.len());
        for movie in loaded {
            if ids.insert(movie.id) {
                entries.push(movie);
            } else {
                tracing::warn!(movie_id = movie.id, "Dropping duplicate watchlist entry");
            }
        }

        tracing::info!(count = entries.len(), "Watchlist loaded");
        Self {
            storage,
            entries,
            ids,
        }
    }

    pub fn entries(&self) -> &[Movie] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.contains(&id)
    }

    /// Append `movie` unless its id is already saved. Returns whether it was added.
    pub fn add(&mut self, movie: Movie) -> Result<bool, StorageError> {
        let id = movie.id;
        if !self.ids.insert(id) {
            return Ok(false);
        }
        self.entries.push(movie);

        if let Err(e) = self.persist() {
            self.entries.pop();
            self.ids.remove(&id);
            return Err(e);
        }
        tracing::info!(movie_id = id, "Added to watchlist");
        Ok(true)
    }

    /// Remove the entry with `id` if present. Returns whether anything was removed.
    pub fn remove(&mut self, id: u64) -> Result<bool, StorageError> {
        let Some(index) = self.entries.iter().position(|m| m.id == id) else {
            return Ok(false);
        };
        let removed = self.entries.remove(index);
        self.ids.remove(&id);

        if let Err(e) = self.persist() {
            self.entries.insert(index, removed);
            self.ids.insert(id);
            return Err(e);
        }
        tracing::info!(movie_id = id, "Removed from watchlist");
        Ok(true)
    }

    /// Remove `movie` when saved, add it otherwise. Returns the new membership.
    pub fn toggle(&mut self, movie: &Movie) -> Result<bool, StorageError> {
        if self.contains(movie.id) {
            self.remove(movie.id)?;
            Ok(false)
        } else {
            self.add(movie.clone())?;
            Ok(true)
        }
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&mut self) -> Result<usize, StorageError> {
        if self.entries.is_empty() {
            return Ok(0);
        }
        let previous = std::mem::take(&mut self.entries);
        if let Err(e) = self.persist() {
            self.entries = previous;
            return Err(e);
        }
        self.ids.clear();
        tracing::info!(count = previous.len(), "Watchlist cleared");
        Ok(previous.len())
    }

    /// "1 movie saved" / "N movies saved".
    pub fn saved_label(&self) -> String {
        match self.entries.len() {
            1 => "1 movie saved".to_string(),
            n => format!("{n} movies saved"),
        }
    }

    fn persist(&self) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&self.entries)?;
        self.storage.write(WATCHLIST_SLOT, &raw)
    }
}
