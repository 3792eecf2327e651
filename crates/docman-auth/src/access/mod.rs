//! File access policy.

pub mod controller;

pub use controller::{AccessController, VisibilityPolicy};
