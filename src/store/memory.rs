//! Thread-safe in-memory [`ParamStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::ParameterId,
	store::{ConnectorSide, OAuthParameter, ParamStore, StoreError, StoreFuture},
};

type ParamMap = Arc<RwLock<HashMap<ParameterId, OAuthParameter>>>;

/// Thread-safe storage backend that keeps parameter rows in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(ParamMap);
impl MemoryStore {
	fn save_now(map: ParamMap, param: OAuthParameter) -> Result<(), StoreError> {
		map.write().insert(param.parameter_id.clone(), param);

		Ok(())
	}

	// Rows are sorted by parameter id so lookups see a stable "first match".
	fn list_now(map: ParamMap, side: ConnectorSide) -> Vec<OAuthParameter> {
		let mut rows: Vec<OAuthParameter> =
			map.read().values().filter(|row| row.side == side).cloned().collect();

		rows.sort_by(|a, b| a.parameter_id.cmp(&b.parameter_id));

		rows
	}
}
impl ParamStore for MemoryStore {
	fn save(&self, param: OAuthParameter) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::save_now(map, param) })
	}

	fn list(&self, side: ConnectorSide) -> StoreFuture<'_, Vec<OAuthParameter>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::list_now(map, side)) })
	}
}
