//! Token exchange plumbing shared by broker flows.
//!
//! The module builds the fixed per-provider token request form, flattens provider
//! JSON responses into string maps, and maps transport failures into the crate
//! error taxonomy.

// self
use crate::{_prelude::*, error::ConfigError, http::TokenHttpResponse, provider::ProviderProfile};
#[cfg(feature = "reqwest")] use crate::error::TransportError;

/// Flat string map produced by flattening a token endpoint response.
pub type TokenMap = BTreeMap<String, String>;

/// Completed exchange payload handed back to callers.
///
/// Serializes to `{"credentials": {...}}` with the provider token payload
/// passed through unmodified.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedOAuth {
	/// Flattened token payload exactly as returned by the provider.
	pub credentials: TokenMap,
}

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts a transport-specific error into a crate error.
	fn map_transport_error(&self, error: E) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(&self, error: ReqwestError) -> Error {
		if source_io_kind(&error) == Some(std::io::ErrorKind::Interrupted) {
			return TransportError::Interrupted.into();
		}

		TransportError::network(error).into()
	}
}

/// Builds the authorization-code token request form for a provider profile.
///
/// The field set is fixed per provider: the standard grant parameters followed
/// by any profile-declared extras.
pub(crate) fn authorization_code_form(
	profile: &ProviderProfile,
	client_id: &str,
	client_secret: &str,
	code: &str,
	redirect_url: &str,
) -> Vec<(String, String)> {
	let mut form = vec![
		("client_id".to_owned(), client_id.to_owned()),
		("client_secret".to_owned(), client_secret.to_owned()),
		("code".to_owned(), code.to_owned()),
		("grant_type".to_owned(), "authorization_code".to_owned()),
		("redirect_uri".to_owned(), redirect_url.to_owned()),
	];

	for (key, value) in &profile.extra_token_params {
		form.push((key.clone(), value.clone()));
	}

	form
}

/// Flattens a token endpoint response body into a string map.
///
/// JSON strings pass through verbatim; every other value keeps its JSON
/// rendering. The body is parsed regardless of HTTP status, so provider error
/// payloads surface to the caller the same way token payloads do.
pub(crate) fn flatten_token_response(response: &TokenHttpResponse) -> Result<TokenMap> {
	let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
	let parsed: BTreeMap<String, serde_json::Value> =
		serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
			ConfigError::TokenResponseParse { source, status: Some(response.status) }
		})?;

	Ok(parsed
		.into_iter()
		.map(|(key, value)| match value {
			serde_json::Value::String(text) => (key, text),
			other => (key, other.to_string()),
		})
		.collect())
}

#[cfg(feature = "reqwest")]
fn source_io_kind(err: &(dyn StdError + 'static)) -> Option<std::io::ErrorKind> {
	let mut current: Option<&(dyn StdError + 'static)> = Some(err);

	while let Some(inner) = current {
		if let Some(io_err) = inner.downcast_ref::<std::io::Error>() {
			return Some(io_err.kind());
		}

		current = inner.source();
	}

	None
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::ProviderId;

	fn response(body: &str) -> TokenHttpResponse {
		TokenHttpResponse { status: 200, body: body.as_bytes().to_vec() }
	}

	#[test]
	fn form_carries_the_fixed_grant_fields_then_extras() {
		let profile = ProviderProfile::builder(
			ProviderId::new("extras").expect("Provider fixture should be valid."),
		)
		.authorization_endpoint(
			Url::parse("https://example.com/auth").expect("Auth URL fixture should parse."),
		)
		.token_endpoint(
			Url::parse("https://example.com/token").expect("Token URL fixture should parse."),
		)
		.scope("read")
		.extra_token_param("audience", "api")
		.build()
		.expect("Profile fixture should build.");
		let form = authorization_code_form(&profile, "id", "secret", "code-1", "https://cb");

		assert_eq!(
			form,
			vec![
				("client_id".to_owned(), "id".to_owned()),
				("client_secret".to_owned(), "secret".to_owned()),
				("code".to_owned(), "code-1".to_owned()),
				("grant_type".to_owned(), "authorization_code".to_owned()),
				("redirect_uri".to_owned(), "https://cb".to_owned()),
				("audience".to_owned(), "api".to_owned()),
			]
		);
	}

	#[test]
	fn flattening_passes_strings_through_and_renders_the_rest() {
		let flattened = flatten_token_response(&response(
			"{\"access_token\":\"abc\",\"expires_in\":7200,\"scopes\":[\"read\"]}",
		))
		.expect("Well-formed body should flatten successfully.");

		assert_eq!(flattened.get("access_token"), Some(&"abc".to_owned()));
		assert_eq!(flattened.get("expires_in"), Some(&"7200".to_owned()));
		assert_eq!(flattened.get("scopes"), Some(&"[\"read\"]".to_owned()));
	}

	#[test]
	fn flattening_rejects_malformed_bodies_with_the_status() {
		let err = flatten_token_response(&TokenHttpResponse {
			status: 502,
			body: b"<html>bad gateway</html>".to_vec(),
		})
		.expect_err("Non-JSON bodies should fail.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::TokenResponseParse { status: Some(502), .. })
		));
	}
}
