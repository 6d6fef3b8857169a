//! Simple file-backed [`ParamStore`] for lightweight single-node deployments.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::ParameterId,
	store::{ConnectorSide, OAuthParameter, ParamStore, StoreError, StoreFuture},
};

/// Persists parameter rows to a JSON file after each mutation.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<ParameterId, OAuthParameter>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing rows.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = if path.exists() { Self::load_snapshot(&path)? } else { HashMap::new() };

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<ParameterId, OAuthParameter>, StoreError> {
		let metadata = path.metadata().map_err(|e| StoreError::Backend {
			message: format!("Failed to inspect {}: {e}", path.display()),
		})?;

		if metadata.len() == 0 {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;
		let rows: Vec<OAuthParameter> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(rows.into_iter().map(|row| (row.parameter_id.clone(), row)).collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}
		Ok(())
	}

	fn persist_locked(
		&self,
		rows: &HashMap<ParameterId, OAuthParameter>,
	) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let mut snapshot: Vec<&OAuthParameter> = rows.values().collect();

		snapshot.sort_by(|a, b| a.parameter_id.cmp(&b.parameter_id));

		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize parameter snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})?;

		Ok(())
	}
}
impl ParamStore for FileStore {
	fn save(&self, param: OAuthParameter) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			guard.insert(param.parameter_id.clone(), param);

			self.persist_locked(&guard)
		})
	}

	fn list(&self, side: ConnectorSide) -> StoreFuture<'_, Vec<OAuthParameter>> {
		Box::pin(async move {
			let mut rows: Vec<OAuthParameter> =
				self.inner.read().values().filter(|row| row.side == side).cloned().collect();

			rows.sort_by(|a, b| a.parameter_id.cmp(&b.parameter_id));

			Ok(rows)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::{DefinitionId, WorkspaceId};

	fn store_path(label: &str) -> PathBuf {
		std::env::temp_dir()
			.join(format!("connector-oauth-broker-{label}-{}.json", std::process::id()))
	}

	fn make_param(parameter: &str, side: ConnectorSide) -> OAuthParameter {
		OAuthParameter {
			parameter_id: ParameterId::new(parameter)
				.expect("Parameter fixture should be valid."),
			workspace_id: WorkspaceId::new("workspace-1")
				.expect("Workspace fixture should be valid."),
			definition_id: DefinitionId::new("definition-1")
				.expect("Definition fixture should be valid."),
			side,
			configuration: serde_json::json!({ "client_id": "id", "client_secret": "secret" }),
		}
	}

	#[tokio::test]
	async fn rows_survive_reopen() {
		let path = store_path("reopen");

		let _ = fs::remove_file(&path);

		{
			let store = FileStore::open(&path).expect("Store should open on a fresh path.");

			store
				.save(make_param("param-b", ConnectorSide::Source))
				.await
				.expect("Save should succeed.");
			store
				.save(make_param("param-a", ConnectorSide::Source))
				.await
				.expect("Save should succeed.");
		}

		let reopened = FileStore::open(&path).expect("Store should reopen an existing snapshot.");
		let rows = reopened.list(ConnectorSide::Source).await.expect("List should succeed.");

		assert_eq!(rows.len(), 2);
		assert_eq!(rows[0].parameter_id.as_str(), "param-a");
		assert_eq!(rows[1].parameter_id.as_str(), "param-b");

		let _ = fs::remove_file(&path);
	}

	#[tokio::test]
	async fn save_replaces_rows_by_parameter_id() {
		let path = store_path("replace");

		let _ = fs::remove_file(&path);

		let store = FileStore::open(&path).expect("Store should open on a fresh path.");
		let mut updated = make_param("param-1", ConnectorSide::Destination);

		store.save(updated.clone()).await.expect("First save should succeed.");

		updated.configuration = serde_json::json!({ "client_id": "rotated" });

		store.save(updated).await.expect("Replacing save should succeed.");

		let rows = store.list(ConnectorSide::Destination).await.expect("List should succeed.");

		assert_eq!(rows.len(), 1);
		assert_eq!(rows[0].configuration["client_id"], "rotated");

		let _ = fs::remove_file(&path);
	}
}
