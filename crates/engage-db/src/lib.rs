//! Post persistence.
//!
//! The [`PostStore`] trait is the persistence collaborator for post records:
//! insert at upload time (placeholder platform), attribute update at wizard
//! completion. A Postgres implementation is provided behind the `postgres`
//! feature; [`MemoryPostStore`] backs tests.

pub mod memory;
pub mod store;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use memory::MemoryPostStore;
pub use store::PostStore;

#[cfg(feature = "postgres")]
pub use postgres::PgPostRepository;
