//! Consent URL construction for the authorization-code grant.

// self
use crate::{
	_prelude::*,
	auth::{DefinitionId, WorkspaceId},
	error::ConfigError,
	flows::{Broker, common},
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
	store::ConnectorSide,
};

impl<C, M> Broker<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the provider consent URL for a source connector.
	///
	/// The stored `client_id` for the workspace + definition scope is embedded
	/// together with a fresh state token. The caller-supplied redirect string is
	/// form-urlencoded verbatim, so the provider receives exactly the value that
	/// was registered with it.
	pub async fn source_consent_url(
		&self,
		workspace: &WorkspaceId,
		definition: &DefinitionId,
		redirect_url: &str,
	) -> Result<Url> {
		self.consent_url(ConnectorSide::Source, workspace, definition, redirect_url).await
	}

	/// Builds the provider consent URL for a destination connector.
	pub async fn destination_consent_url(
		&self,
		workspace: &WorkspaceId,
		definition: &DefinitionId,
		redirect_url: &str,
	) -> Result<Url> {
		self.consent_url(ConnectorSide::Destination, workspace, definition, redirect_url).await
	}

	async fn consent_url(
		&self,
		side: ConnectorSide,
		workspace: &WorkspaceId,
		definition: &DefinitionId,
		redirect_url: &str,
	) -> Result<Url> {
		const KIND: FlowKind = FlowKind::ConsentUrl;

		let span = FlowSpan::new(KIND, side.as_str());

		obs::record_flow_outcome(&self.metrics, KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				Url::parse(redirect_url)
					.map_err(|source| ConfigError::InvalidRedirect { source })?;

				let param = common::resolve_parameter(
					self.store.as_ref(),
					&self.metrics,
					side,
					workspace,
					definition,
				)
				.await?;
				let credentials = common::extract_credentials(&param)?;
				let mut url = self.profile.authorization_endpoint.clone();
				let mut pairs = url.query_pairs_mut();

				// Query order is part of the provider contract; append pairs in the
				// exact sequence providers and downstream assertions expect.
				pairs.append_pair("client_id", &credentials.client_id);
				pairs.append_pair("redirect_uri", redirect_url);
				pairs.append_pair("state", &self.state_generator.generate());
				pairs.append_pair("response_type", "code");
				pairs.append_pair("scope", &self.profile.scope);

				drop(pairs);

				Ok(url)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(&self.metrics, KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(&self.metrics, KIND, FlowOutcome::Failure),
		}

		result
	}
}
