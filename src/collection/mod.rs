//! Typed REST-backed collections
//!
//! - **Record**: identity and raw JSON conversion of a member type
//! - **RecordList**: ordered, deduplicated in-memory members with change events
//! - **RecordSource**: fetch seam, `HttpSource` for REST endpoints
//! - **RemoteCollection**: a list bound to a resource URL with `fetch`

pub mod error;
pub mod events;
pub mod list;
pub mod record;
pub mod remote;
pub mod source;

pub use error::{CollectionError, CollectionResult};
pub use events::{ClientId, CollectionEvent};
pub use list::{RecordList, SetOptions, SetSummary};
pub use record::Record;
pub use remote::{resolve_url, FetchMode, RemoteCollection};
pub use source::{HttpSource, RecordSource};
