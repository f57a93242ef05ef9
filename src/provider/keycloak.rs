use super::base::{
	string_list, AuthorizationRequest, Claims, Provider, ProviderConfig, RoleSet, TokenResponse,
};
use super::oidc::ProviderOIDC;
use crate::error::Error;

pub struct ProviderKeycloak {
	oidc: ProviderOIDC,
}

impl ProviderKeycloak {
	///
	/// Create a new keycloak provider on top of a discovered OIDC provider
	///
	pub fn new(oidc: ProviderOIDC) -> Self {
		Self { oidc }
	}
}

#[async_trait::async_trait]
impl Provider for ProviderKeycloak {
	fn config(&self) -> &ProviderConfig {
		self.oidc.config()
	}

	fn authorization_url(&self, request: &AuthorizationRequest<'_>) -> String {
		self.oidc.authorization_url(request)
	}

	async fn exchange_code(&self, code: &str, code_verifier: &str) -> Result<TokenResponse, Error> {
		self.oidc.exchange_code(code, code_verifier).await
	}

	fn verify_id_token(&self, id_token: &str, nonce: &str) -> Result<Claims, Error> {
		self.oidc.verify_id_token(id_token, nonce)
	}

	async fn userinfo(&self, access_token: &str) -> Result<Claims, Error> {
		self.oidc.userinfo(access_token).await
	}

	///
	/// Older realms do not advertise the end session endpoint
	///
	fn end_session_url(&self, id_token_hint: Option<&str>) -> String {
		let config = self.oidc.config();
		if config.end_session_endpoint.is_some() {
			return self.oidc.end_session_url(id_token_hint);
		}
		let fallback = format!(
			"{}/protocol/openid-connect/logout",
			config.issuer.trim_end_matches('/')
		);
		match url::Url::parse(&fallback) {
			Ok(endpoint) => self.oidc.logout_url(&endpoint, id_token_hint),
			Err(_) => self.oidc.end_session_url(id_token_hint),
		}
	}

	///
	/// Keycloak puts the roles under `realm_access` and `resource_access.<client>`
	///
	fn roles(&self, claims: &Claims) -> Vec<RoleSet> {
		let mut sets = self.oidc.roles(claims);

		let realm = string_list(claims.get("realm_access").and_then(|v| v.get("roles")));
		if !realm.is_empty() {
			sets.push(RoleSet {
				scope: String::from("realm"),
				roles: realm,
			});
		}

		if let Some(resources) = claims.get("resource_access").and_then(|v| v.as_object()) {
			for (client, access) in resources {
				let roles = string_list(access.get("roles"));
				if !roles.is_empty() {
					sets.push(RoleSet {
						scope: client.clone(),
						roles,
					});
				}
			}
		}
		sets
	}
}
