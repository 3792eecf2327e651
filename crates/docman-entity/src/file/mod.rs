//! File and version domain entities.

pub mod model;
pub mod summary;
pub mod version;

pub use model::{CreateFile, File};
pub use summary::{FileSummary, ListScope};
pub use version::{FileVersion, NewFileVersion, VersionSelector};
