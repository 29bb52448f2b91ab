//! Cinedex Core
//!
//! Domain types, capability traits, and error handling shared by every
//! Cinedex crate.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `CatalogRecord`, `ArchivedRecord`, `RecordId`, probe results
//! - **Capability Traits**: `MediaProbe` and `ThumbnailRenderer`, the two
//!   operations the external media tool is allowed to provide
//! - **Error Handling**: unified `CinedexError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use cinedex_core::types::{format_duration, RecordId};
//! use std::path::Path;
//!
//! let id = RecordId::derive(
//!     Path::new("/videos/clip.mp4"),
//!     Path::new("/thumbs/thumbnail_0.webp"),
//!     1_700_000_000.0,
//! );
//! assert_eq!(id.as_str().len(), 128);
//! assert_eq!(format_duration(120.0), "02:00");
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{CinedexError, Result};
pub use traits::{MediaProbe, ThumbnailRenderer};
pub use types::{
    ArchivedRecord, CatalogRecord, CreateArchivedRecord, Disposition, FormatInfo, ProbeResult,
    RecordId, RecordUpdate, RecordView, StreamInfo, StreamSelector,
};
