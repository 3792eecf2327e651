//! File versions and the file registry.

pub mod registry;
pub mod version;

pub use registry::{Download, FileRegistry, UploadOutcome};
pub use version::VersionStore;
