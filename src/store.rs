//! Storage contracts and built-in backends for OAuth parameter rows.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{DefinitionId, ParameterId, WorkspaceId},
};

/// Boxed future returned by [`ParamStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Connector side an OAuth parameter row applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectorSide {
	/// Source connectors (data is read from the provider).
	Source,
	/// Destination connectors (data is written to the provider).
	Destination,
}
impl ConnectorSide {
	/// Returns a stable label suitable for logs and span fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ConnectorSide::Source => "source",
			ConnectorSide::Destination => "destination",
		}
	}
}
impl Display for ConnectorSide {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Per-workspace OAuth client configuration for one connector definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OAuthParameter {
	/// Unique row identifier; [`ParamStore::save`] replaces rows sharing it.
	pub parameter_id: ParameterId,
	/// Workspace the credentials belong to.
	pub workspace_id: WorkspaceId,
	/// Connector definition the credentials belong to.
	pub definition_id: DefinitionId,
	/// Side of the connector the row configures.
	pub side: ConnectorSide,
	/// Opaque JSON blob holding `client_id`/`client_secret`.
	pub configuration: serde_json::Value,
}
impl OAuthParameter {
	/// Checks whether the row is scoped to the provided workspace + definition pair.
	pub fn matches(&self, workspace: &WorkspaceId, definition: &DefinitionId) -> bool {
		&self.workspace_id == workspace && &self.definition_id == definition
	}
}

/// Storage backend contract for OAuth parameter rows.
///
/// The store exposes every row visible for a connector side; scoping by
/// workspace + definition happens client-side in the flows.
pub trait ParamStore
where
	Self: Send + Sync,
{
	/// Persists a row, replacing any existing row with the same `parameter_id`.
	fn save(&self, param: OAuthParameter) -> StoreFuture<'_, ()>;

	/// Lists every row visible for the provided connector side, in stable order.
	fn list(&self, side: ConnectorSide) -> StoreFuture<'_, Vec<OAuthParameter>>;
}

/// Error type produced by [`ParamStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;
	use crate::error::Error;

	#[test]
	fn store_error_converts_into_broker_error_with_source() {
		let store_error = StoreError::Backend { message: "parameter table unreachable".into() };
		let broker_error: Error = store_error.clone().into();

		assert!(matches!(broker_error, Error::Storage(_)));
		assert!(broker_error.to_string().contains("parameter table unreachable"));

		let source = StdError::source(&broker_error)
			.expect("Broker error should expose the original store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn parameter_matching_scopes_by_workspace_and_definition() {
		let row = OAuthParameter {
			parameter_id: ParameterId::new("param-1").expect("Parameter fixture should be valid."),
			workspace_id: WorkspaceId::new("workspace-1")
				.expect("Workspace fixture should be valid."),
			definition_id: DefinitionId::new("definition-1")
				.expect("Definition fixture should be valid."),
			side: ConnectorSide::Source,
			configuration: serde_json::json!({ "client_id": "id" }),
		};
		let workspace = row.workspace_id.clone();
		let definition = row.definition_id.clone();
		let other_workspace =
			WorkspaceId::new("workspace-2").expect("Workspace fixture should be valid.");

		assert!(row.matches(&workspace, &definition));
		assert!(!row.matches(&other_workspace, &definition));
	}

	#[test]
	fn connector_side_serializes_to_snake_case() {
		let payload = serde_json::to_string(&ConnectorSide::Destination)
			.expect("ConnectorSide should serialize to JSON.");

		assert_eq!(payload, "\"destination\"");

		let round_trip: ConnectorSide = serde_json::from_str(&payload)
			.expect("Serialized side should deserialize from JSON.");

		assert_eq!(round_trip, ConnectorSide::Destination);
	}
}
