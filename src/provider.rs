//! Provider profiles consumed by broker flows.
//!
//! Each OAuth provider is described by an immutable [`ProviderProfile`] carrying its
//! endpoints, fixed consent scope, and extra token-request parameters. Dispatch
//! between providers is data-driven (one profile value per provider), so adding a
//! provider never requires new flow code.

// crates.io
use url::Host;
// self
use crate::{_prelude::*, auth::ProviderId};

/// Errors raised while constructing or validating provider profiles.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum ProviderProfileError {
	/// Authorization endpoint is required for consent URL construction.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Token endpoint is mandatory for the code exchange.
	#[error("Missing token endpoint.")]
	MissingTokenEndpoint,
	/// A consent scope must be declared.
	#[error("Profile must declare a non-empty consent scope.")]
	EmptyScope,
	/// Endpoints must use HTTPS outside of loopback hosts.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Immutable provider constants consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderProfile {
	/// Profile identifier.
	pub id: ProviderId,
	/// Authorization endpoint the consent URL is built from.
	pub authorization_endpoint: Url,
	/// Token endpoint used for the code exchange.
	pub token_endpoint: Url,
	/// Fixed scope requested during consent.
	pub scope: String,
	/// Provider-specific extra parameters appended to every token request.
	pub extra_token_params: Vec<(String, String)>,
}
impl ProviderProfile {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderProfileBuilder {
		ProviderProfileBuilder::new(id)
	}

	/// Profile for GitLab connectors using the read-only API scope.
	pub fn gitlab() -> Self {
		Self {
			id: ProviderId::new("gitlab").expect("GitLab provider identifier is a valid constant."),
			authorization_endpoint: Url::parse("https://gitlab.com/oauth/authorize")
				.expect("GitLab authorization endpoint is a valid constant."),
			token_endpoint: Url::parse("https://gitlab.com/oauth/token")
				.expect("GitLab token endpoint is a valid constant."),
			scope: "read_api".into(),
			extra_token_params: Vec::new(),
		}
	}

	fn validate(&self) -> Result<(), ProviderProfileError> {
		if self.scope.is_empty() {
			return Err(ProviderProfileError::EmptyScope);
		}

		validate_endpoint("authorization", &self.authorization_endpoint)?;
		validate_endpoint("token", &self.token_endpoint)?;

		Ok(())
	}
}

/// Builder for [`ProviderProfile`] values.
#[derive(Debug)]
pub struct ProviderProfileBuilder {
	/// Identifier for the profile being constructed.
	pub id: ProviderId,
	/// Optional authorization endpoint (required at build time).
	pub authorization_endpoint: Option<Url>,
	/// Optional token endpoint (required at build time).
	pub token_endpoint: Option<Url>,
	/// Consent scope requested during authorization.
	pub scope: String,
	/// Extra parameters appended to every token request.
	pub extra_token_params: Vec<(String, String)>,
}
impl ProviderProfileBuilder {
	/// Creates a new builder seeded with the provided identifier.
	pub fn new(id: ProviderId) -> Self {
		Self {
			id,
			authorization_endpoint: None,
			token_endpoint: None,
			scope: String::new(),
			extra_token_params: Vec::new(),
		}
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the fixed consent scope.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Appends one extra token-request parameter.
	pub fn extra_token_param(
		mut self,
		key: impl Into<String>,
		value: impl Into<String>,
	) -> Self {
		self.extra_token_params.push((key.into(), value.into()));

		self
	}

	/// Consumes the builder and validates the resulting profile.
	pub fn build(self) -> Result<ProviderProfile, ProviderProfileError> {
		let authorization_endpoint = self
			.authorization_endpoint
			.ok_or(ProviderProfileError::MissingAuthorizationEndpoint)?;
		let token_endpoint =
			self.token_endpoint.ok_or(ProviderProfileError::MissingTokenEndpoint)?;
		let profile = ProviderProfile {
			id: self.id,
			authorization_endpoint,
			token_endpoint,
			scope: self.scope,
			extra_token_params: self.extra_token_params,
		};

		profile.validate()?;

		Ok(profile)
	}
}

// Loopback hosts are exempt so harnesses can point profiles at local mock servers.
fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderProfileError> {
	if url.scheme() == "https" || is_loopback(url) {
		Ok(())
	} else {
		Err(ProviderProfileError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	}
}

fn is_loopback(url: &Url) -> bool {
	match url.host() {
		Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
		Some(Host::Ipv4(ip)) => ip.is_loopback(),
		Some(Host::Ipv6(ip)) => ip.is_loopback(),
		None => false,
	}
}
