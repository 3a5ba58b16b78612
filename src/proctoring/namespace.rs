//! Shared handles of the proctoring dashboard
//!
//! Dashboard components receive a `ProctoringNamespace` (or a clone of the
//! handle they need) instead of looking the collection up in global state.

use std::sync::Arc;

use crate::collection::{CollectionResult, RecordSource};

use super::collection::{exam_collection, ExamCollection};

/// Registry of the collections shared by dashboard components
pub struct ProctoringNamespace<S: RecordSource> {
    exam_collection: Option<Arc<ExamCollection<S>>>,
}

impl<S: RecordSource> ProctoringNamespace<S> {
    pub fn new() -> Self {
        Self {
            exam_collection: None,
        }
    }

    /// Register `collection`, returning the handle it replaced
    pub fn register_exam_collection(
        &mut self,
        collection: Arc<ExamCollection<S>>,
    ) -> Option<Arc<ExamCollection<S>>> {
        if self.exam_collection.is_some() {
            tracing::debug!("Replacing registered exam collection");
        }
        self.exam_collection.replace(collection)
    }

    /// The registered exam collection, if any
    pub fn exam_collection(&self) -> Option<Arc<ExamCollection<S>>> {
        self.exam_collection.clone()
    }
}

impl<S: RecordSource> Default for ProctoringNamespace<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Build an exam collection and register it in `namespace`.
///
/// Installing again overwrites the previous registration.
pub fn install_exam_collection<S: RecordSource>(
    namespace: &mut ProctoringNamespace<S>,
    source: S,
    base_url: &reqwest::Url,
    course_id: Option<&str>,
    event_capacity: usize,
) -> CollectionResult<Arc<ExamCollection<S>>> {
    let collection = Arc::new(exam_collection(source, base_url, course_id, event_capacity)?);
    namespace.register_exam_collection(Arc::clone(&collection));
    Ok(collection)
}
