//! Blocking HTTP transport for the tfsnippet cache.
//!
//! [`HttpClient`] is the seam: the cache talks to it through [`Fetcher`],
//! which streams the body into any writer, checks the status and the
//! advertised length, and reports [`Progress`].

pub mod data;
pub mod error;
pub mod fetcher;
pub mod http;

pub use data::{FetchOptions, FetchPhase, Progress, ProgressCallback};
pub use error::{BoxError, FetchError, Result};
pub use fetcher::Fetcher;
#[cfg(feature = "reqwest")]
pub use http::ReqwestClient;
pub use http::{HttpClient, HttpResponse};
