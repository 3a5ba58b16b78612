//! HTTP-backed collection: a `RecordList` bound to a resource URL

use std::any::TypeId;
use std::marker::PhantomData;

use reqwest::Url;
use tokio::sync::{broadcast, RwLock};

use super::error::{CollectionError, CollectionResult};
use super::events::{ClientId, CollectionEvent};
use super::list::{RecordList, SetOptions, SetSummary};
use super::record::{build_records, Record};
use super::source::RecordSource;

/// How a fetch applies the fetched data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Smart update: add new, merge known, remove missing
    #[default]
    Merge,
    /// Replace everything and announce a single reset
    Reset,
}

/// Resolve a resource path against a base URL.
///
/// When `scope` is given it is appended as one percent-encoded path segment.
pub fn resolve_url(base: &Url, resource_path: &str, scope: Option<&str>) -> CollectionResult<Url> {
    let mut url = base
        .join(resource_path)
        .map_err(|e| CollectionError::InvalidUrl(format!("{}{}: {}", base, resource_path, e)))?;

    if let Some(segment) = scope {
        if segment.is_empty() {
            return Err(CollectionError::InvalidUrl("empty scope segment".into()));
        }
        url.path_segments_mut()
            .map_err(|_| CollectionError::InvalidUrl(format!("{} cannot carry a path", base)))?
            .pop_if_empty()
            .push(segment);
    }

    Ok(url)
}

/// A collection of `R` records fetched from a REST resource through `S`.
pub struct RemoteCollection<R: Record, S: RecordSource> {
    resource_path: &'static str,
    url: Url,
    source: S,
    list: RwLock<RecordList<R>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record, S: RecordSource> RemoteCollection<R, S> {
    /// Create an empty collection bound to `resource_path` under `base`
    pub fn new(
        source: S,
        base: &Url,
        resource_path: &'static str,
        scope: Option<&str>,
        event_capacity: usize,
    ) -> CollectionResult<Self> {
        let url = resolve_url(base, resource_path, scope)?;
        Ok(Self {
            resource_path,
            url,
            source,
            list: RwLock::new(RecordList::new(event_capacity)),
            _record: PhantomData,
        })
    }

    /// The literal resource path this collection was declared with
    pub fn resource_path(&self) -> &'static str {
        self.resource_path
    }

    /// Fully resolved URL used by `fetch`
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Type of the records this collection builds
    pub fn record_type(&self) -> TypeId {
        TypeId::of::<R>()
    }

    pub fn record_type_name(&self) -> &'static str {
        std::any::type_name::<R>()
    }

    /// Fetch the resource and apply it.
    ///
    /// On failure an `Error` event is emitted and the contents are left as
    /// they were.
    pub async fn fetch(&self, mode: FetchMode) -> CollectionResult<SetSummary> {
        self.list.read().await.emit(CollectionEvent::Request {
            url: self.url.to_string(),
        });

        let fetched = match self.source.fetch_raw(&self.url).await {
            Ok(raw) => build_records::<R>(raw),
            Err(e) => Err(e),
        };

        let mut list = self.list.write().await;
        let records = match fetched {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Fetch of {} failed: {}", self.url, e);
                list.emit(CollectionEvent::Error {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let summary = match mode {
            FetchMode::Merge => list.set(records, SetOptions::default()),
            FetchMode::Reset => {
                list.reset(records);
                SetSummary {
                    added: list.len(),
                    ..Default::default()
                }
            }
        };

        let len = list.len();
        list.emit(CollectionEvent::Synced { len });
        tracing::info!("Synced {} records from {}", len, self.url);
        Ok(summary)
    }

    /// Add a record locally
    pub async fn add(&self, record: R) -> ClientId {
        self.list.write().await.add(record)
    }

    /// Remove a record locally by id
    pub async fn remove(&self, id: &R::Id) -> Option<R> {
        self.list.write().await.remove(id)
    }

    /// Remove a record locally by client id
    pub async fn remove_cid(&self, cid: ClientId) -> Option<R> {
        self.list.write().await.remove_cid(cid)
    }

    /// Apply a smart update with explicit options
    pub async fn set(&self, records: Vec<R>, options: SetOptions) -> SetSummary {
        self.list.write().await.set(records, options)
    }

    pub async fn reset(&self, records: Vec<R>) {
        self.list.write().await.reset(records)
    }

    pub async fn get(&self, id: &R::Id) -> Option<R> {
        self.list.read().await.get(id).cloned()
    }

    pub async fn records(&self) -> Vec<R> {
        self.list.read().await.records()
    }

    pub async fn filter<F>(&self, predicate: F) -> Vec<R>
    where
        F: FnMut(&R) -> bool,
    {
        self.list.read().await.filter(predicate)
    }

    pub async fn len(&self) -> usize {
        self.list.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.list.read().await.is_empty()
    }

    pub async fn to_json(&self) -> serde_json::Value {
        self.list.read().await.to_json()
    }

    /// Subscribe to change notifications
    pub async fn subscribe(&self) -> broadcast::Receiver<CollectionEvent<R>> {
        self.list.read().await.subscribe()
    }
}
