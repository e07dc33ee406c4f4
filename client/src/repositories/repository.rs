//! Repository trait and the JSON collection it is built on
//!
//! Every stored collection is a JSON array under a single key. Reads never
//! fail: a missing key, an unreadable backend or a corrupt document all come
//! back as an empty collection and are logged.

use std::{marker::PhantomData, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{error::StorageError, storage::KeyValueStore};

/// Typed access to records kept in a [`KeyValueStore`].
pub trait Repository<T> {
    /// Identifier type for a record.
    type Id: ?Sized;

    /// All records in stored order.
    fn find_all(&self) -> Vec<T>;

    /// A single record by ID.
    fn find_by_id(&self, id: &Self::Id) -> Option<T>;

    /// Append a new record.
    fn create(&self, item: T) -> Result<T, StorageError>;

    /// Replace the record with the same ID. Returns false if there was none.
    fn update(&self, item: T) -> Result<bool, StorageError>;

    /// Remove a record by ID. Returns false if there was none.
    fn delete(&self, id: &Self::Id) -> Result<bool, StorageError>;
}

pub struct JsonCollection<T> {
    store: Arc<dyn KeyValueStore>,
    key: &'static str,
    _record: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonCollection<T> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            key: self.key,
            _record: PhantomData,
        }
    }
}

impl<T> JsonCollection<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn KeyValueStore>, key: &'static str) -> Self {
        Self {
            store,
            key,
            _record: PhantomData,
        }
    }

    fn raw(&self) -> Option<String> {
        match self.store.get_item(self.key) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key = self.key, error = %err, "failed to read stored collection");
                None
            }
        }
    }

    /// Decode the whole array; anything malformed yields an empty collection.
    pub fn load(&self) -> Vec<T> {
        let Some(raw) = self.raw() else {
            return Vec::new();
        };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => items,
            Err(err) => {
                tracing::warn!(key = self.key, error = %err, "stored collection is corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Decode element by element, dropping the ones that don't fit `T`.
    pub fn load_lenient(&self) -> Vec<T> {
        let Some(raw) = self.raw() else {
            return Vec::new();
        };
        let values = match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(values) => values,
            Err(err) => {
                tracing::warn!(key = self.key, error = %err, "stored collection is corrupt, treating as empty");
                return Vec::new();
            }
        };
        let total = values.len();
        let items: Vec<T> = values
            .into_iter()
            .filter_map(|value| serde_json::from_value(value).ok())
            .collect();
        if items.len() != total {
            tracing::debug!(
                key = self.key,
                dropped = total - items.len(),
                "skipped undecodable records"
            );
        }
        items
    }

    /// Number of elements in the stored array, decodable or not.
    pub fn stored_len(&self) -> usize {
        self.raw()
            .and_then(|raw| serde_json::from_str::<Vec<Value>>(&raw).ok())
            .map_or(0, |values| values.len())
    }

    pub fn save(&self, items: &[T]) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(items).map_err(|source| StorageError::Encode {
            key: self.key.to_string(),
            source,
        })?;
        self.store.set_item(self.key, &encoded)
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.store.remove_item(self.key)
    }
}
