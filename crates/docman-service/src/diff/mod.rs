//! Line deltas between two versions of a file.

pub mod delta;
pub mod engine;
pub mod lcs;

pub use delta::{Delta, DeltaBody, DiffStats, Hunk, HunkKind};
pub use engine::DiffEngine;
