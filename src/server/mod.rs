//! Capability HTTP front end
//!
//! Every request that does not hit a fixed route is looked up in the
//! capability registry by (method, path). Unknown paths answer 404.

mod routes;
mod http;

pub use routes::{dispatch_caps, issue_caps, revoke_caps, security_headers};
pub use http::{CapsServer, ServerHandle, ServerState};
