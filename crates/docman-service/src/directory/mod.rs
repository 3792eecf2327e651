//! Directory hierarchy.

pub mod tree;

pub use tree::DirectoryTree;
