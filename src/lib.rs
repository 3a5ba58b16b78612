//! Proctoring Dashboard
//!
//! Typed client for the proctored exam list shown on the edX instructor
//! dashboard.
//!
//! ## Layout
//!
//! - **collection**: generic REST-backed collections (ordered records,
//!   smart merge, change events, HTTP fetch)
//! - **proctoring**: the proctored exam record, the exam collection bound to
//!   `/api/edx_proctoring/v1/proctored_exam/exam/course_id/` and the
//!   namespace dashboard components share it through
//! - **core**: client configuration
//!
//! ## Example
//!
//! ```no_run
//! use proctoring_dashboard::collection::FetchMode;
//! use proctoring_dashboard::proctoring::exam_collection_from_config;
//! use proctoring_dashboard::DashboardConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DashboardConfig::default();
//! let exams = exam_collection_from_config(&config, Some("course-v1:edX+DemoX+Demo_Course"))?;
//! exams.fetch(FetchMode::Merge).await?;
//! for exam in exams.records().await {
//!     println!("{}", exam);
//! }
//! # Ok(())
//! # }
//! ```

pub mod collection;
pub mod core;
pub mod proctoring;

// Re-exports
pub use collection::{
    CollectionError, CollectionEvent, CollectionResult, FetchMode, HttpSource, Record,
    RecordSource, RemoteCollection,
};
pub use crate::core::config::DashboardConfig;
pub use proctoring::{
    install_exam_collection, ExamCollection, ProctoredExam, ProctoringNamespace,
    EXAM_RESOURCE_PATH,
};
