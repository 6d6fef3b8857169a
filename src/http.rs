//! Transport primitives for OAuth token exchanges.
//!
//! [`TokenHttpClient`] is the crate's only dependency on an HTTP stack. Callers
//! provide an implementation (typically behind `Arc<T>`) and the broker issues a
//! single form-encoded POST per completion call, receiving the raw status and
//! body back as a [`TokenHttpResponse`] for downstream parsing.

// self
use crate::_prelude::*;

/// Boxed future returned by [`TokenHttpClient::post_form`].
pub type HttpFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + 'a + Send>>;

/// Raw token endpoint response captured by a transport.
#[derive(Clone, Debug)]
pub struct TokenHttpResponse {
	/// HTTP status code returned by the token endpoint.
	pub status: u16,
	/// Raw response body bytes.
	pub body: Vec<u8>,
}

/// Abstraction over HTTP transports capable of executing token exchanges.
///
/// Implementations must be `Send + Sync + 'static` so they can be shared across
/// broker instances without additional wrappers, and the futures they return
/// must be `Send` so broker operations can hop executors freely.
pub trait TokenHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Concrete error emitted by the underlying transport.
	type TransportError: 'static + Send + Sync + StdError;

	/// Issues a single form-encoded POST to the token endpoint.
	fn post_form(
		&self,
		endpoint: Url,
		form: Vec<(String, String)>,
	) -> HttpFuture<'_, TokenHttpResponse, Self::TransportError>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// Token requests should not follow redirects, matching OAuth 2.0 guidance that token
/// endpoints return results directly instead of delegating to another URI. Configure
/// any custom [`ReqwestClient`] to disable redirect following before wrapping it.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl TokenHttpClient for ReqwestHttpClient {
	type TransportError = ReqwestError;

	fn post_form(
		&self,
		endpoint: Url,
		form: Vec<(String, String)>,
	) -> HttpFuture<'_, TokenHttpResponse, Self::TransportError> {
		let client = self.0.clone();

		Box::pin(async move {
			let response = client.post(endpoint).form(&form).send().await?;
			let status = response.status().as_u16();
			let body = response.bytes().await?.to_vec();

			Ok(TokenHttpResponse { status, body })
		})
	}
}
