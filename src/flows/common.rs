//! Shared parameter resolution and credential extraction for flows.

// self
use crate::{
	_prelude::*,
	auth::{DefinitionId, WorkspaceId},
	error::ConfigError,
	obs::{BrokerMetric, MetricsEmitter},
	store::{ConnectorSide, OAuthParameter, ParamStore},
};

/// Client credentials extracted from a stored configuration blob.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ClientCredentials {
	pub(crate) client_id: String,
	pub(crate) client_secret: Option<String>,
}
impl ClientCredentials {
	/// Returns the secret, failing with the validation condition completion requires.
	pub(crate) fn require_secret(&self) -> Result<&str> {
		self.client_secret.as_deref().ok_or_else(|| ConfigError::MissingClientSecret.into())
	}
}

#[derive(Debug, Deserialize)]
struct RawConfiguration {
	client_id: Option<String>,
	client_secret: Option<String>,
	credentials: Option<RawCredentials>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCredentials {
	client_id: Option<String>,
	client_secret: Option<String>,
}

/// Resolves the single parameter row scoped to the workspace + definition pair.
///
/// The store lists every row visible for the side and the broker filters
/// client-side; the first listed match wins when several rows share a scope.
/// A miss fails with [`Error::ParameterNotFound`], never an empty result.
pub(crate) async fn resolve_parameter(
	store: &dyn ParamStore,
	metrics: &MetricsEmitter,
	side: ConnectorSide,
	workspace: &WorkspaceId,
	definition: &DefinitionId,
) -> Result<OAuthParameter> {
	let rows = store.list(side).await?;

	metrics.gauge(BrokerMetric::VisibleParameterRows, rows.len() as f64);

	rows.into_iter().find(|row| row.matches(workspace, definition)).ok_or_else(|| {
		Error::ParameterNotFound { workspace: workspace.clone(), definition: definition.clone() }
	})
}

/// Extracts client credentials from a stored configuration blob.
///
/// `client_id`/`client_secret` may live at the top level or nested under a
/// `credentials` object; the nested layout wins when both are present.
pub(crate) fn extract_credentials(param: &OAuthParameter) -> Result<ClientCredentials> {
	let raw: RawConfiguration = serde_path_to_error::deserialize(param.configuration.clone())
		.map_err(|source| ConfigError::MalformedCredentials { source })?;
	let nested = raw.credentials.unwrap_or_default();
	let client_id = nested.client_id.or(raw.client_id).ok_or(ConfigError::MissingClientId)?;
	let client_secret = nested.client_secret.or(raw.client_secret);

	Ok(ClientCredentials { client_id, client_secret })
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{auth::ParameterId, store::MemoryStore};

	fn make_param(configuration: serde_json::Value) -> OAuthParameter {
		OAuthParameter {
			parameter_id: ParameterId::new("param-1").expect("Parameter fixture should be valid."),
			workspace_id: WorkspaceId::new("workspace-1")
				.expect("Workspace fixture should be valid."),
			definition_id: DefinitionId::new("definition-1")
				.expect("Definition fixture should be valid."),
			side: ConnectorSide::Source,
			configuration,
		}
	}

	#[test]
	fn extraction_reads_nested_credentials_first() {
		let param = make_param(serde_json::json!({
			"client_id": "outer-id",
			"credentials": { "client_id": "inner-id", "client_secret": "inner-secret" },
		}));
		let credentials =
			extract_credentials(&param).expect("Nested credentials should extract successfully.");

		assert_eq!(credentials.client_id, "inner-id");
		assert_eq!(credentials.client_secret.as_deref(), Some("inner-secret"));
	}

	#[test]
	fn extraction_falls_back_to_the_top_level_layout() {
		let param = make_param(serde_json::json!({
			"client_id": "flat-id",
			"client_secret": "flat-secret",
		}));
		let credentials =
			extract_credentials(&param).expect("Top-level credentials should extract successfully.");

		assert_eq!(credentials.client_id, "flat-id");
		assert_eq!(credentials.require_secret().expect("Secret should be present."), "flat-secret");
	}

	#[test]
	fn extraction_surfaces_validation_conditions() {
		let missing_id = make_param(serde_json::json!({ "credentials": {} }));

		assert!(matches!(
			extract_credentials(&missing_id),
			Err(Error::Config(ConfigError::MissingClientId))
		));

		let malformed = make_param(serde_json::json!("not an object"));

		assert!(matches!(
			extract_credentials(&malformed),
			Err(Error::Config(ConfigError::MalformedCredentials { .. }))
		));

		let missing_secret = make_param(serde_json::json!({ "client_id": "id-only" }));
		let credentials = extract_credentials(&missing_secret)
			.expect("A lone client_id is enough for consent URLs.");

		assert!(matches!(
			credentials.require_secret(),
			Err(Error::Config(ConfigError::MissingClientSecret))
		));
	}

	#[tokio::test]
	async fn resolution_finds_the_scoped_row_or_fails_explicitly() {
		let store = MemoryStore::default();
		let param = make_param(serde_json::json!({ "client_id": "id" }));

		store.save(param.clone()).await.expect("Seeding the store should succeed.");

		let metrics = MetricsEmitter::disabled();
		let resolved = resolve_parameter(
			&store,
			&metrics,
			ConnectorSide::Source,
			&param.workspace_id,
			&param.definition_id,
		)
		.await
		.expect("A matching row should resolve.");

		assert_eq!(resolved.parameter_id, param.parameter_id);

		let unknown =
			WorkspaceId::new("workspace-unknown").expect("Workspace fixture should be valid.");
		let err = resolve_parameter(
			&store,
			&metrics,
			ConnectorSide::Source,
			&unknown,
			&param.definition_id,
		)
		.await
		.expect_err("A missing row should fail explicitly.");

		assert!(matches!(err, Error::ParameterNotFound { .. }));
	}
}
