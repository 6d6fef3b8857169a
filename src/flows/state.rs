//! Consent state token generation.

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::_prelude::*;

const STATE_LEN: usize = 32;

/// Capability for minting the opaque `state` value embedded in consent URLs.
///
/// The token round-trips through the provider redirect for CSRF protection, so
/// production generators must be unpredictable. Inject a deterministic
/// implementation only in controlled harnesses.
pub trait StateTokenGenerator
where
	Self: Send + Sync,
{
	/// Returns a fresh opaque state token.
	fn generate(&self) -> String;
}

/// Default generator producing 32 random alphanumeric characters.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomStateGenerator;
impl StateTokenGenerator for RandomStateGenerator {
	fn generate(&self) -> String {
		rand::rng().sample_iter(Alphanumeric).take(STATE_LEN).map(char::from).collect()
	}
}

/// Generator returning a fixed token, for deterministic harnesses.
#[derive(Clone, Debug)]
pub struct ConstantStateGenerator(String);
impl ConstantStateGenerator {
	/// Creates a generator that always returns `token`.
	pub fn new(token: impl Into<String>) -> Self {
		Self(token.into())
	}
}
impl StateTokenGenerator for ConstantStateGenerator {
	fn generate(&self) -> String {
		self.0.clone()
	}
}
