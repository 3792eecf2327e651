//! # docman-auth
//!
//! Authentication and authorization for Docman.
//!
//! ## Modules
//!
//! - `password`: Argon2id hashing and the signup password policy
//! - `jwt`: session token encoding and validation
//! - `session`: signup, login, token authentication and logout
//! - `access`: the file visibility policy consumed by the services
//! - `context`: the per-request caller identity

pub mod access;
pub mod context;
pub mod jwt;
pub mod password;
pub mod session;

pub use access::{AccessController, VisibilityPolicy};
pub use context::RequestContext;
pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::{PasswordHasher, PasswordPolicy};
pub use session::{LoginResult, SessionManager, SignupRequest};
