use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

use super::kv_store::KeyValueStore;
use crate::error::StorageError;

pub const DEFAULT_NAMESPACE: &str = "ai-chat:";

/// Typed JSON documents on top of a [`KeyValueStore`], under a key namespace.
///
/// Writes never fail from the caller's point of view and reads degrade to
/// `None`: a broken blob must not stop the client from starting.
pub struct PersistentStore<S> {
    backend: S,
    namespace: String,
}

impl<S: KeyValueStore> PersistentStore<S> {
    pub fn new(backend: S, namespace: impl Into<String>) -> Self {
        Self {
            backend,
            namespace: namespace.into(),
        }
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.namespace, key)
    }

    pub fn try_save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), StorageError> {
        let json = serde_json::to_string(value)?;
        let key = self.namespaced(key);
        self.backend.set(&key, &json)
    }

    /// Fire-and-forget write. Returns whether it landed.
    pub fn save<T: Serialize>(&mut self, key: &str, value: &T) -> bool {
        match self.try_save(key, value) {
            Ok(()) => {
                log::debug!("Persisted document `{key}`");
                true
            }
            Err(err) => {
                log::error!("Failed to persist document `{key}`: {err}");
                false
            }
        }
    }

    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.backend.get(&self.namespaced(key)) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                log::info!("No persisted document `{key}`; starting empty");
                return None;
            }
            Err(err) => {
                log::warn!("Failed to read document `{key}` ({err}); starting empty");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Corrupt document `{key}` ({err}); falling back to defaults");
                None
            }
        }
    }
}

/// A domain store whose allow-listed fields survive restarts.
pub trait Persisted {
    /// Document name in the store.
    const KEY: &'static str;
    type Document: Serialize + DeserializeOwned;

    fn snapshot(&self) -> Self::Document;
    fn restore(&mut self, document: Self::Document);
    /// Bumped by every mutation.
    fn revision(&self) -> u64;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlushPolicy {
    /// Write a document as soon as its store changes
    #[default]
    EveryMutation,
    /// Write only on an explicit flush (process exit)
    OnExit,
}

/// Decides when domain snapshots reach the [`PersistentStore`].
pub struct Persistence<S> {
    store: PersistentStore<S>,
    policy: FlushPolicy,
    flushed: HashMap<&'static str, u64>,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: PersistentStore<S>, policy: FlushPolicy) -> Self {
        Self {
            store,
            policy,
            flushed: HashMap::new(),
        }
    }

    /// Restore `target` from its document, if one was saved and parses.
    pub fn hydrate<P: Persisted>(&mut self, target: &mut P) {
        if let Some(document) = self.store.load::<P::Document>(P::KEY) {
            target.restore(document);
        }
        self.flushed.insert(P::KEY, target.revision());
    }

    /// Called after mutations; writes only under [`FlushPolicy::EveryMutation`].
    pub fn sync<P: Persisted>(&mut self, source: &P) {
        if self.policy == FlushPolicy::EveryMutation {
            self.write_if_changed(source);
        }
    }

    /// Writes `source` if it changed since the last write, regardless of policy.
    pub fn flush<P: Persisted>(&mut self, source: &P) {
        self.write_if_changed(source);
    }

    fn write_if_changed<P: Persisted>(&mut self, source: &P) {
        let revision = source.revision();
        if self.flushed.get(P::KEY) == Some(&revision) {
            return;
        }
        if self.store.save(P::KEY, &source.snapshot()) {
            self.flushed.insert(P::KEY, revision);
        }
    }
}
