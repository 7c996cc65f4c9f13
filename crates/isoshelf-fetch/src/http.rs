use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use futures_util::Stream;

pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = T> + Send + 'a>>;

/// An open response: the advertised length and the body chunks.
pub struct Body<E> {
    pub content_length: Option<u64>,
    pub chunks:         BoxStream<'static, std::result::Result<Bytes, E>>,
}

/// Asynchronous HTTP client abstraction.
///
/// Implementations follow redirects themselves and must report non-success
/// statuses as errors.
pub trait HttpClient: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Issue a GET and return the body as a stream once headers arrive.
    fn stream(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<Body<Self::Error>, Self::Error>> + Send;

    /// GET a small text document in full.
    fn get_text(&self, url: &str) -> impl Future<Output = std::result::Result<String, Self::Error>> + Send;
}

#[cfg(feature = "reqwest")]
mod reqwest_impl {
    use futures_util::StreamExt;

    use super::*;
    use crate::Timeouts;

    /// Production client backed by `reqwest`.
    #[derive(Debug, Clone)]
    pub struct ReqwestClient {
        client:  reqwest::Client,
        request: std::time::Duration,
    }

    impl ReqwestClient {
        pub fn new(timeouts: &Timeouts, user_agent: &str) -> std::result::Result<Self, reqwest::Error> {
            let client = reqwest::Client::builder()
                .connect_timeout(timeouts.connect)
                .user_agent(user_agent)
                .build()?;
            Ok(Self {
                client,
                request: timeouts.request,
            })
        }
    }

    impl HttpClient for ReqwestClient {
        type Error = reqwest::Error;

        async fn stream(&self, url: &str) -> std::result::Result<Body<Self::Error>, Self::Error> {
            let response = self.client.get(url).send().await?.error_for_status()?;
            let content_length = response.content_length();
            let chunks = response.bytes_stream().map(|chunk| chunk.map(Bytes::from));
            Ok(Body {
                content_length,
                chunks: Box::pin(chunks),
            })
        }

        async fn get_text(&self, url: &str) -> std::result::Result<String, Self::Error> {
            self.client
                .get(url)
                .timeout(self.request)
                .send()
                .await?
                .error_for_status()?
                .text()
                .await
        }
    }
}

#[cfg(feature = "reqwest")]
pub use reqwest_impl::ReqwestClient;
