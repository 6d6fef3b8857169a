//! High-level consent and code-exchange operations.

pub mod state;

mod common;
mod complete;
mod consent;

pub use state::*;

// self
use crate::{
	_prelude::*,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::MetricsEmitter,
	provider::ProviderProfile,
	store::ParamStore,
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Broker specialized for the crate's default reqwest transport stack.
pub type ReqwestBroker = Broker<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Coordinates consent and code-exchange operations against a single provider profile.
///
/// The broker owns the HTTP client, parameter store, provider profile, state
/// generator, and metrics emitter so the per-operation code can focus on the
/// grant itself. No session state is held between the consent and completion
/// calls; each operation independently re-resolves configuration and performs
/// at most one outbound request.
#[derive(Clone)]
pub struct Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound token request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Parameter store per-workspace credentials are resolved from.
	pub store: Arc<dyn ParamStore>,
	/// Provider profile defining endpoints, scope, and token request extras.
	pub profile: ProviderProfile,
	/// Generator minting the consent `state` token.
	pub state_generator: Arc<dyn StateTokenGenerator>,
	/// Emitter recording flow counters and latency samples.
	pub metrics: MetricsEmitter,
}
impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a broker that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		store: Arc<dyn ParamStore>,
		profile: ProviderProfile,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			store,
			profile,
			state_generator: Arc::new(RandomStateGenerator),
			metrics: MetricsEmitter::disabled(),
		}
	}

	/// Replaces the state token generator (defaults to [`RandomStateGenerator`]).
	pub fn with_state_generator(mut self, generator: Arc<dyn StateTokenGenerator>) -> Self {
		self.state_generator = generator;

		self
	}

	/// Replaces the metrics emitter (defaults to a disabled emitter).
	pub fn with_metrics(mut self, metrics: MetricsEmitter) -> Self {
		self.metrics = metrics;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Broker<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a new broker for the provided store and provider profile.
	///
	/// The broker provisions its own reqwest-backed transport so callers do not
	/// need to pass HTTP handles explicitly.
	pub fn new(store: Arc<dyn ParamStore>, profile: ProviderProfile) -> Self {
		Self::with_http_client(
			store,
			profile,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("profile", &self.profile)
			.field("metrics", &self.metrics)
			.finish()
	}
}
