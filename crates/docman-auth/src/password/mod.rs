//! Password hashing and signup policy.

pub mod hasher;
pub mod policy;

pub use hasher::PasswordHasher;
pub use policy::PasswordPolicy;
