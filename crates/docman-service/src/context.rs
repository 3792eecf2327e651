//! Caller identity passed into every service call.

pub use docman_auth::context::RequestContext;
