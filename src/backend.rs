//! Client for the NLU and command services
//!
//! Both services sit behind one base address and speak JSON over HTTP.

mod error;
mod http;
mod types;

pub use error::{BackendError, BackendErrorKind};
pub use http::{BackendClient, BackendConfig, DEFAULT_BACKEND_URL};
pub use types::*;
