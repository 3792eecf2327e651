//! # docman-storage
//!
//! Content addressing and payload storage for Docman.
//!
//! - [`digest`] computes SHA-256 content digests.
//! - [`providers`] implements [`StorageProvider`](docman_core::traits::StorageProvider)
//!   for the local filesystem.
//! - [`blob`] keys payloads by digest on top of a provider.

pub mod blob;
pub mod digest;
pub mod providers;

pub use blob::{BlobStore, StoredBlob};
pub use digest::{ContentDigest, Sha256Hasher};
pub use providers::local::LocalStorageProvider;
