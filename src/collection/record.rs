//! Record trait: how a collection member is identified and built from raw JSON

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::hash::Hash;

use super::error::{CollectionError, CollectionResult};

/// A single structured entity held by a collection.
///
/// The identity attribute deduplicates members. Records without an id are
/// treated as new, locally created entries and are only told apart by their
/// client id.
pub trait Record: Serialize + DeserializeOwned + Clone + PartialEq + Send + Sync + 'static {
    /// Type of the identity attribute
    type Id: Clone + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static;

    /// Identity attribute, `None` for records not yet persisted
    fn id(&self) -> Option<Self::Id>;

    /// Build a record from one element of a fetched response
    fn from_raw(raw: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(raw)
    }

    /// Raw JSON form, as sent back to the server
    fn try_to_raw(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Raw JSON form; a record that cannot be serialized is logged and
    /// rendered as `null`
    fn to_raw(&self) -> serde_json::Value {
        self.try_to_raw().unwrap_or_else(|e| {
            tracing::warn!("Failed to serialize {}: {}", std::any::type_name::<Self>(), e);
            serde_json::Value::Null
        })
    }
}

/// Build every element of `raw` into `R`, reporting the first failing index.
pub fn build_records<R: Record>(raw: Vec<serde_json::Value>) -> CollectionResult<Vec<R>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, value)| {
            R::from_raw(value).map_err(|e| CollectionError::Decode {
                index,
                message: e.to_string(),
            })
        })
        .collect()
}
