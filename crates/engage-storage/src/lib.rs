//! Object storage for uploaded media.
//!
//! Defines the [`ObjectStorage`] trait (non-overwriting `put` with byte-level
//! progress reporting) and a local filesystem backend. Keys follow the format
//! `media/{uuid}.{ext}`; see [`keys`].

pub mod keys;
pub mod local;
pub mod progress;
pub mod traits;

pub use keys::generate_object_key;
pub use local::LocalStorage;
pub use progress::{watch_progress, ProgressSink, ProgressTracker, WatchProgress};
pub use traits::{ObjectStorage, StorageError, StorageResult};
