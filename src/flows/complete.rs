//! Authorization-code completion: exchanging the callback code for tokens.

// std
use std::time::Instant;
// self
use crate::{
	_prelude::*,
	auth::{DefinitionId, WorkspaceId},
	error::ConfigError,
	flows::{Broker, common},
	http::TokenHttpClient,
	oauth::{self, CompletedOAuth, TransportErrorMapper},
	obs::{self, BrokerMetric, FlowKind, FlowOutcome, FlowSpan},
	store::ConnectorSide,
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Exchanges the authorization code returned by a source connector consent.
	///
	/// The call re-resolves the stored credentials, issues one POST to the
	/// provider token endpoint, and returns the flattened token payload wrapped
	/// under `credentials` without validating or persisting it.
	pub async fn complete_source_oauth(
		&self,
		workspace: &WorkspaceId,
		definition: &DefinitionId,
		query_params: &HashMap<String, String>,
		redirect_url: &str,
	) -> Result<CompletedOAuth> {
		self.complete_oauth(ConnectorSide::Source, workspace, definition, query_params, redirect_url)
			.await
	}

	/// Exchanges the authorization code returned by a destination connector consent.
	pub async fn complete_destination_oauth(
		&self,
		workspace: &WorkspaceId,
		definition: &DefinitionId,
		query_params: &HashMap<String, String>,
		redirect_url: &str,
	) -> Result<CompletedOAuth> {
		self.complete_oauth(
			ConnectorSide::Destination,
			workspace,
			definition,
			query_params,
			redirect_url,
		)
		.await
	}

	async fn complete_oauth(
		&self,
		side: ConnectorSide,
		workspace: &WorkspaceId,
		definition: &DefinitionId,
		query_params: &HashMap<String, String>,
		redirect_url: &str,
	) -> Result<CompletedOAuth> {
		const KIND: FlowKind = FlowKind::CompleteOAuth;

		let span = FlowSpan::new(KIND, side.as_str());

		obs::record_flow_outcome(&self.metrics, KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				Url::parse(redirect_url)
					.map_err(|source| ConfigError::InvalidRedirect { source })?;

				let code =
					query_params.get("code").ok_or(ConfigError::MissingAuthorizationCode)?;
				let param = common::resolve_parameter(
					self.store.as_ref(),
					&self.metrics,
					side,
					workspace,
					definition,
				)
				.await?;
				let credentials = common::extract_credentials(&param)?;
				let client_secret = credentials.require_secret()?;
				let form = oauth::authorization_code_form(
					&self.profile,
					&credentials.client_id,
					client_secret,
					code,
					redirect_url,
				);
				let started = Instant::now();
				let response = self
					.http_client
					.post_form(self.profile.token_endpoint.clone(), form)
					.await
					.map_err(|err| self.transport_mapper.map_transport_error(err))?;

				self.metrics
					.record_duration(BrokerMetric::TokenExchangeElapsed, elapsed_since(started));

				let credentials = oauth::flatten_token_response(&response)?;

				Ok(CompletedOAuth { credentials })
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(&self.metrics, KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(&self.metrics, KIND, FlowOutcome::Failure),
		}

		result
	}
}

fn elapsed_since(started: Instant) -> Duration {
	Duration::try_from(started.elapsed()).unwrap_or(Duration::ZERO)
}
