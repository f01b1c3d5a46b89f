//! Upload coordination: key generation → store → register record.

pub mod coordinator;

pub use coordinator::UploadCoordinator;
