//! Feature flags
//!
//! Remotely controlled booleans with local defaults.

mod http;
mod service;
mod source;

pub use http::HttpRemoteConfig;
pub use service::*;
pub use source::*;
