//! Key/value state shared by the steps of one workflow.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Cheaply cloneable handle to a workflow's JSON state map.
///
/// Every clone points at the same map. A step that panics while holding the
/// lock does not make the map unusable for the steps and compensations that
/// follow.
#[derive(Clone, Debug, Default)]
pub struct SharedState {
    inner: Arc<RwLock<HashMap<String, Value>>>,
}

impl SharedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    /// Read `key` and deserialize it, `None` if absent or of another shape.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| serde_json::from_value(v).ok())
    }

    /// Store `value`, returning the previous value of `key`.
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.write().insert(key.into(), value.into())
    }

    /// Serialize and store `value`.
    pub fn set_as<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<Option<Value>, serde_json::Error> {
        let value = serde_json::to_value(value)?;
        Ok(self.set(key, value))
    }

    pub fn remove(&self, key: &str) -> Option<Value> {
        self.write().remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Apply `f` to the map under a single write lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut HashMap<String, Value>) -> R) -> R {
        f(&mut self.write())
    }

    /// Copy of the whole map.
    pub fn snapshot(&self) -> HashMap<String, Value> {
        self.read().clone()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, Value>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, Value>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
