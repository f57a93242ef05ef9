use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

pub type Claims = serde_json::Map<String, serde_json::Value>;

///
/// Provider endpoints, discovered once at startup
///
#[derive(Clone, Debug)]
pub struct ProviderConfig {
	pub issuer: String,
	pub client_id: String,
	pub client_secret: String,
	pub authorization_endpoint: Url,
	pub token_endpoint: Url,
	pub userinfo_endpoint: Option<Url>,
	pub end_session_endpoint: Option<Url>,
	pub jwks_uri: Option<Url>,
}

///
/// Response of the token endpoint
///
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
	pub access_token: String,
	#[serde(default = "default_token_type")]
	pub token_type: String,
	pub expires_in: Option<u64>,
	pub id_token: Option<String>,
	/// Some providers already send the userinfo with the tokens
	pub userinfo: Option<Claims>,
}

fn default_token_type() -> String {
	String::from("Bearer")
}

///
/// The token set kept in the session
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenSet {
	pub access_token: String,
	pub id_token: Option<String>,
	pub token_type: String,
	/// Unix timestamp, in seconds
	pub expires_at: Option<u64>,
	pub userinfo: Option<Claims>,
}

impl TokenSet {
	pub fn new(response: TokenResponse, userinfo: Option<Claims>) -> Self {
		Self {
			expires_at: response
				.expires_in
				.map(|expires_in| now().saturating_add(expires_in)),
			access_token: response.access_token,
			id_token: response.id_token,
			token_type: response.token_type,
			userinfo,
		}
	}
}

///
/// Parameters of a new authorization request
///
pub struct AuthorizationRequest<'a> {
	pub state: &'a str,
	pub nonce: &'a str,
	pub code_challenge: &'a str,
}

///
/// Roles grouped by where the provider declared them
///
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RoleSet {
	pub scope: String,
	pub roles: Vec<String>,
}

#[async_trait::async_trait]
pub trait Provider: Send + Sync {
	///
	/// The discovered provider configuration
	///
	fn config(&self) -> &ProviderConfig;
	///
	/// Get the authorization url
	///
	fn authorization_url(&self, request: &AuthorizationRequest<'_>) -> String;
	///
	/// Perform a grant_type: authorization_code request
	///
	async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenResponse, Error>;
	///
	/// Check the id_token signature and claims, returning its claims
	///
	fn verify_id_token(&self, id_token: &str, nonce: &str) -> Result<Claims, Error>;
	///
	/// Fetch the userinfo endpoint using the access token
	///
	async fn userinfo(&self, access_token: &str) -> Result<Claims, Error>;
	///
	/// Url to send the browser to when logging out
	///
	fn end_session_url(&self, id_token_hint: Option<&str>) -> String;
	///
	/// Role claims found on the given claims, display only
	///
	fn roles(&self, claims: &Claims) -> Vec<RoleSet>;
}

///
/// Current unix timestamp in seconds
///
pub fn now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or(0)
}

///
/// Read an array of strings claim
///
pub(super) fn string_list(value: Option<&serde_json::Value>) -> Vec<String> {
	value
		.and_then(|v| v.as_array())
		.map(|list| {
			list.iter()
				.filter_map(|v| v.as_str().map(String::from))
				.collect()
		})
		.unwrap_or_default()
}
