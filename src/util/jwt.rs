use jsonwebtoken::{DecodingKey, Validation};

pub type JsonMap = serde_json::Map<String, serde_json::Value>;

///
/// Decode the claims of a JWT without checking the signature
///
/// Only for display purposes, never trust the result for an access decision.
/// Returns `None` for opaque tokens.
///
pub fn decode_unverified(token: &str) -> Option<JsonMap> {
	let mut validation = Validation::default();
	validation.insecure_disable_signature_validation();
	validation.validate_exp = false;
	validation.validate_aud = false;
	validation.required_spec_claims.clear();
	jsonwebtoken::decode::<JsonMap>(token, &DecodingKey::from_secret(&[]), &validation)
		.ok()
		.map(|data| data.claims)
}
