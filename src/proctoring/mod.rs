//! Instructor dashboard proctoring data
//!
//! Binds the proctored exam record type to its REST resource and provides
//! the namespace through which dashboard components share it.

pub mod collection;
pub mod exam;
pub mod namespace;

pub use collection::{exam_collection, exam_collection_from_config, ExamCollection, EXAM_RESOURCE_PATH};
pub use exam::{ExamKind, ProctoredExam};
pub use namespace::{install_exam_collection, ProctoringNamespace};
