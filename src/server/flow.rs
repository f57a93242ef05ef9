use super::state::State;
use crate::error::Error;
use crate::provider::{now, AuthorizationRequest, Claims, Provider, TokenResponse, TokenSet};
use crate::util::pkce;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use serde::{Deserialize, Serialize};

/// Seconds the user has to complete the login on the provider
const PENDING_FLOW_MAX_AGE: u64 = 10 * 60;

///
/// A login started on `/login` and not yet completed
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingFlow {
	pub state: String,
	pub nonce: String,
	pub code_verifier: String,
	pub created_at: u64,
}

///
/// Query string the provider sends to the callback
///
#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
	pub code: Option<String>,
	pub state: Option<String>,
	pub error: Option<String>,
	pub error_description: Option<String>,
}

impl PendingFlow {
	pub fn new(state: &State) -> Result<Self, Error> {
		Ok(Self {
			state: state.crypto.random_token(16)?,
			nonce: state.crypto.random_token(16)?,
			code_verifier: pkce::code_verifier(&state.crypto)?,
			created_at: now(),
		})
	}

	///
	/// Url of the provider authorization endpoint for this flow
	///
	pub fn authorization_url(&self, state: &State) -> String {
		let code_challenge = pkce::code_challenge(&self.code_verifier);
		state.provider.authorization_url(&AuthorizationRequest {
			state: &self.state,
			nonce: &self.nonce,
			code_challenge: &code_challenge,
		})
	}

	///
	/// Load the pending flow from the request cookie
	///
	/// Missing, undecryptable and expired flows are all treated as absent
	///
	pub fn from_request(state: &State, req: &HttpRequest) -> Option<Self> {
		let cookie = req.cookie(&state.settings.cookie.flow_name)?;
		let json = state.crypto.decrypt(cookie.value()).ok()?;
		let flow: Self = serde_json::from_str(&json).ok()?;
		if now().saturating_sub(flow.created_at) > PENDING_FLOW_MAX_AGE {
			log::debug!("Pending login expired");
			return None;
		}
		Some(flow)
	}

	pub fn cookie(&self, state: &State) -> Result<Cookie<'static>, Error> {
		let value = state.crypto.encrypt(&serde_json::to_string(self)?)?;
		Ok(Cookie::build(state.settings.cookie.flow_name.clone(), value)
			.path("/")
			.http_only(true)
			.secure(state.settings.secure_cookies())
			.same_site(SameSite::Lax)
			.max_age(time::Duration::seconds(PENDING_FLOW_MAX_AGE as i64))
			.finish())
	}

	pub fn removal_cookie(state: &State) -> Cookie<'static> {
		let mut cookie = Cookie::build(state.settings.cookie.flow_name.clone(), "")
			.path("/")
			.finish();
		cookie.make_removal();
		cookie
	}
}

///
/// Complete a login: check the state, exchange the code and resolve the claims
///
pub async fn complete(
	state: &State,
	pending: Option<&PendingFlow>,
	params: &CallbackParams,
) -> Result<TokenSet, Error> {
	let pending = pending.ok_or(Error::StateMismatch)?;
	if params.state.as_deref() != Some(pending.state.as_str()) {
		return Err(Error::StateMismatch);
	}

	if let Some(ref error) = params.error {
		return Err(Error::ProviderDenied(match params.error_description {
			Some(ref description) => format!("{}: {}", error, description),
			None => error.clone(),
		}));
	}

	let code = params
		.code
		.as_deref()
		.filter(|code| !code.is_empty())
		.ok_or(Error::MissingCode)?;

	let response = state
		.provider
		.exchange_code(code, &pending.code_verifier)
		.await?;

	let id_claims = match response.id_token {
		Some(ref id_token) => Some(state.provider.verify_id_token(id_token, &pending.nonce)?),
		None => None,
	};

	let userinfo = resolve_claims(state, &response, id_claims.as_ref()).await?;
	Ok(TokenSet::new(response, Some(userinfo)))
}

///
/// Claims from the token response, then the userinfo endpoint, then the id token
///
async fn resolve_claims(
	state: &State,
	response: &TokenResponse,
	id_claims: Option<&Claims>,
) -> Result<Claims, Error> {
	if let Some(ref userinfo) = response.userinfo {
		check_subject(userinfo, id_claims)?;
		return Ok(userinfo.clone());
	}

	match state.provider.userinfo(&response.access_token).await {
		Ok(userinfo) => {
			check_subject(&userinfo, id_claims)?;
			Ok(userinfo)
		}
		Err(e) => match id_claims {
			Some(claims) => {
				log::warn!("{}, using the id_token claims", e);
				Ok(claims.clone())
			}
			None => Err(e),
		},
	}
}

/// The userinfo must describe the same user as the id token
fn check_subject(userinfo: &Claims, id_claims: Option<&Claims>) -> Result<(), Error> {
	let expected = match id_claims.and_then(|claims| claims.get("sub")) {
		Some(sub) => sub,
		None => return Ok(()),
	};
	if userinfo.get("sub") != Some(expected) {
		return Err(Error::UserinfoFetchFailure(String::from(
			"userinfo subject does not match the id_token",
		)));
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	fn claims(value: serde_json::Value) -> Claims {
		value.as_object().cloned().unwrap()
	}

	#[test]
	fn test_check_subject() {
		let id = claims(serde_json::json!({ "sub": "u1" }));
		assert!(check_subject(&claims(serde_json::json!({ "sub": "u1" })), Some(&id)).is_ok());
		assert!(check_subject(&claims(serde_json::json!({ "sub": "u2" })), Some(&id)).is_err());
		assert!(check_subject(&claims(serde_json::json!({ "email": "x" })), Some(&id)).is_err());
		assert!(check_subject(&claims(serde_json::json!({ "sub": "u2" })), None).is_ok());
	}
}
