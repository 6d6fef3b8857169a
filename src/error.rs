//! Crate-level error types shared across flows, providers, and stores.

// self
use crate::{
	_prelude::*,
	auth::{DefinitionId, WorkspaceId},
};

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Validation problem in stored configuration, caller input, or a provider response.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, interruption).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// No OAuth parameter row matches the requested scope.
	#[error("No OAuth parameter is configured for workspace `{workspace}` and definition `{definition}`.")]
	ParameterNotFound {
		/// Workspace the lookup was scoped to.
		workspace: WorkspaceId,
		/// Connector definition the lookup was scoped to.
		definition: DefinitionId,
	},
}

/// Validation failures raised while reading stored configuration or provider responses.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// Stored configuration blob could not be deserialized.
	#[error("OAuth parameter configuration is malformed.")]
	MalformedCredentials {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Configuration blob lacks a `client_id`.
	#[error("OAuth parameter configuration is missing `client_id`.")]
	MissingClientId,
	/// Configuration blob lacks a `client_secret`.
	#[error("OAuth parameter configuration is missing `client_secret`.")]
	MissingClientSecret,
	/// Provider callback query did not include an authorization code.
	#[error("Authorization callback query is missing the `code` parameter.")]
	MissingAuthorizationCode,
	/// Redirect URL cannot be parsed.
	#[error("Redirect URL is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Token endpoint responded with malformed JSON.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO, cancellation).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the token endpoint.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the token endpoint.")]
	Io(#[from] std::io::Error),
	/// A blocking call was cooperatively cancelled before completing.
	#[error("Token endpoint call was interrupted.")]
	Interrupted,
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
