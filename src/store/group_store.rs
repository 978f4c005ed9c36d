//! Whole-aggregate load and save of a [`Group`].

use super::{KeyValueStore, StoreError};
use crate::group::Group;
use crate::rejection::{Refusal, Rejection};
use tracing::{debug, info, instrument, warn};

/// Loads and saves one group under one key of a [`KeyValueStore`].
///
/// Saves replace the whole document; the last writer wins.
#[derive(Debug, Clone)]
pub struct GroupStore<S> {
    backend: S,
    key: String,
}

impl<S: KeyValueStore> GroupStore<S> {
    /// Store for the group `group_id`.
    pub fn new(backend: S, group_id: &str) -> Self {
        Self {
            backend,
            key: Self::key_for(group_id),
        }
    }

    /// Storage key used for a group id.
    pub fn key_for(group_id: &str) -> String {
        format!("group-{}", group_id)
    }

    /// Storage key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backend in use.
    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Loads the group, `None` if nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the document cannot be read, does not
    /// parse, or holds a session that breaks a data-model invariant.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn load(&self) -> Result<Option<Group>, StoreError> {
        let Some(raw) = self.backend.get(&self.key)? else {
            debug!("No stored group");
            return Ok(None);
        };
        let group: Group = serde_json::from_str(&raw)?;
        if let Err(violations) = group.check_invariants() {
            let detail: Vec<String> = violations.iter().map(|v| v.to_string()).collect();
            warn!(count = violations.len(), "Stored group violates invariants");
            return Err(StoreError::new(format!(
                "Stored group {} is invalid: {}",
                group.id(),
                detail.join("; ")
            )));
        }
        debug!(games = group.games().len(), "Group loaded");
        Ok(Some(group))
    }

    /// Loads the group, or creates and saves an empty one.
    #[instrument(skip(self, name), fields(key = %self.key))]
    pub fn load_or_init(&mut self, group_id: &str, name: &str) -> Result<Group, StoreError> {
        if let Some(group) = self.load()? {
            return Ok(group);
        }
        let group = Group::new(group_id, name);
        self.save(&group)?;
        info!(group_id, "Initialised new group");
        Ok(group)
    }

    /// Writes the whole group.
    #[instrument(skip(self, group), fields(key = %self.key, games = group.games().len()))]
    pub fn save(&mut self, group: &Group) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(group)?;
        self.backend.set(&self.key, &json)?;
        debug!(bytes = json.len(), "Group saved");
        Ok(())
    }

    /// Persists the outcome of one group operation.
    ///
    /// A successor group is saved and returned. A refusal that carries an
    /// amended group saves that group, then hands back the rejection; a bare
    /// refusal leaves the stored document alone.
    ///
    /// # Errors
    ///
    /// The outer error is a failed save. The inner one is the operation's
    /// own rejection.
    #[instrument(skip_all, fields(key = %self.key))]
    pub fn commit(
        &mut self,
        result: Result<Group, Refusal<Group>>,
    ) -> Result<Result<Group, Rejection>, StoreError> {
        match result {
            Ok(group) => {
                self.save(&group)?;
                info!("Group saved");
                Ok(Ok(group))
            }
            Err(refusal) => {
                let (reason, amended) = refusal.into_parts();
                if let Some(group) = amended {
                    self.save(&group)?;
                    info!(code = reason.code(), "Saved amended group despite rejection");
                }
                Ok(Err(reason))
            }
        }
    }

    /// Deletes the stored group.
    #[instrument(skip(self), fields(key = %self.key))]
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove(&self.key)
    }
}
