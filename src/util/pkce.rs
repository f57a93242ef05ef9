use super::crypto::Crypto;
use crate::error::Error;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

/// 48 random bytes give a 64 characters verifier (RFC 7636 allows 43 to 128)
const VERIFIER_BYTES: usize = 48;

pub const CHALLENGE_METHOD: &str = "S256";

///
/// Generate a new PKCE code verifier
///
pub fn code_verifier(crypto: &Crypto) -> Result<String, Error> {
	crypto.random_token(VERIFIER_BYTES)
}

///
/// `BASE64URL(SHA256(verifier))`
///
pub fn code_challenge(verifier: &str) -> String {
	let hash = ring::digest::digest(&ring::digest::SHA256, verifier.as_bytes());
	URL_SAFE_NO_PAD.encode(hash.as_ref())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_code_verifier_format() {
		let crypto = Crypto::new("pkce");
		let verifier = code_verifier(&crypto).unwrap();
		assert_eq!(verifier.len(), 64);
		assert!(verifier
			.chars()
			.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
		assert_ne!(verifier, code_verifier(&crypto).unwrap());
	}

	#[test]
	fn test_code_challenge() {
		assert_eq!(
			code_challenge("pkce-verifier-for-tests"),
			"s_6mNaQMk1g3X4B3s--9kY7NkQEjB3dSPzGclXs25oU"
		);
	}
}
