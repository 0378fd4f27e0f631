use std::fmt;
use std::io::Read;

use crate::error::Result;

/// A response whose body has not been read yet.
pub struct HttpResponse {
    pub status: u16,
    /// Value of the `Content-Length` header, when present.
    pub content_length: Option<u64>,
    pub body: Box<dyn Read + Send>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

/// Blocking HTTP client abstraction.
///
/// Implementations follow redirects and apply their own timeouts. A non-2xx
/// status is not an error at this level; [`Fetcher`](crate::Fetcher) decides
/// what to do with it.
pub trait HttpClient: Send + Sync {
    fn get(&self, url: &str) -> Result<HttpResponse>;
}

impl<C: HttpClient + ?Sized> HttpClient for &C {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        (**self).get(url)
    }
}

impl<C: HttpClient + ?Sized> HttpClient for Box<C> {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        (**self).get(url)
    }
}

impl<C: HttpClient + ?Sized> HttpClient for std::sync::Arc<C> {
    fn get(&self, url: &str) -> Result<HttpResponse> {
        (**self).get(url)
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use std::time::Duration;

    use super::*;
    use crate::error::FetchError;

    /// Production client backed by `reqwest::blocking`.
    #[derive(Clone, Debug)]
    pub struct ReqwestClient {
        client: reqwest::blocking::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Result<Self> {
            Self::build(reqwest::blocking::Client::builder())
        }

        pub fn with_timeout(timeout: Duration) -> Result<Self> {
            Self::build(reqwest::blocking::Client::builder().timeout(timeout))
        }

        fn build(builder: reqwest::blocking::ClientBuilder) -> Result<Self> {
            let client = builder.build().map_err(|e| FetchError::Client(Box::new(e)))?;
            Ok(Self { client })
        }
    }

    impl HttpClient for ReqwestClient {
        fn get(&self, url: &str) -> Result<HttpResponse> {
            let response = self.client.get(url).send().map_err(|e| {
                if e.is_builder() {
                    FetchError::InvalidUrl(url.to_string())
                } else {
                    FetchError::Request {
                        url: url.to_string(),
                        source: Box::new(e),
                    }
                }
            })?;

            Ok(HttpResponse {
                status: response.status().as_u16(),
                content_length: response.content_length(),
                body: Box::new(response),
            })
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
