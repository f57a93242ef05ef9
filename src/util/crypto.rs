use crate::error::Error;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM, NONCE_LEN};
use ring::rand::{SecureRandom, SystemRandom};

const VERSION: u8 = 1;
const SALT_LEN: usize = 16;
const TAG_LEN: usize = 16;
const HEADER_LEN: usize = 1 + NONCE_LEN + SALT_LEN;
const PBKDF2_ITERATIONS: u32 = 1024;

/// Crypto functions
pub struct Crypto {
	/// Secret to encrypt the data
	secret: String,
	/// Random generator
	random: SystemRandom,
}

impl Crypto {
	///
	/// Create a new crypto
	///
	pub fn new(secret: &str) -> Crypto {
		Crypto {
			secret: secret.to_string(),
			random: SystemRandom::new(),
		}
	}

	///
	/// Encrypt some data
	///
	/// Layout: version | nonce | salt | ciphertext | tag, base64url encoded
	///
	pub fn encrypt(&self, data: &str) -> Result<String, Error> {
		let data_range_start = HEADER_LEN;
		let data_range_end = data_range_start + data.len();

		let mut encrypted: Vec<u8> = vec![0; HEADER_LEN + data.len() + TAG_LEN];
		self.fill_random_bytes(&mut encrypted[1..HEADER_LEN])?;
		encrypted[data_range_start..data_range_end].copy_from_slice(data.as_bytes());
		encrypted[0] = VERSION;

		let key = self.get_derived_key(&encrypted[1 + NONCE_LEN..HEADER_LEN])?;
		let nonce = Self::get_nonce(&encrypted[1..1 + NONCE_LEN])?;
		let cipher = Self::get_cipher(&key)?;

		let tag = cipher
			.seal_in_place_separate_tag(
				nonce,
				Aad::empty(),
				&mut encrypted[data_range_start..data_range_end],
			)
			.map_err(|_| Error::CryptoError)?;
		encrypted[data_range_end..].copy_from_slice(tag.as_ref());
		Ok(URL_SAFE_NO_PAD.encode(encrypted))
	}

	///
	/// Decrypt the data
	///
	pub fn decrypt(&self, data: &str) -> Result<String, Error> {
		let mut encrypted = URL_SAFE_NO_PAD
			.decode(data)
			.map_err(|_| Error::CryptoError)?;
		if encrypted.len() < HEADER_LEN + TAG_LEN || encrypted[0] != VERSION {
			return Err(Error::CryptoError);
		}

		let key = self.get_derived_key(&encrypted[1 + NONCE_LEN..HEADER_LEN])?;
		let nonce = Self::get_nonce(&encrypted[1..1 + NONCE_LEN])?;
		let cipher = Self::get_cipher(&key)?;

		let decrypted = cipher
			.open_within(nonce, Aad::empty(), &mut encrypted, HEADER_LEN..)
			.map_err(|_| Error::CryptoError)?;
		String::from_utf8(decrypted.to_vec()).map_err(|_| Error::CryptoError)
	}

	///
	/// Random url safe token made of `size` random bytes
	///
	pub fn random_token(&self, size: usize) -> Result<String, Error> {
		random_token(&self.random, size)
	}

	/// Get a new cipher to use
	fn get_cipher(key: &[u8]) -> Result<LessSafeKey, Error> {
		let unbound_key = UnboundKey::new(&AES_256_GCM, key).map_err(|_| Error::CryptoCipherError)?;
		Ok(LessSafeKey::new(unbound_key))
	}

	/// Get a new nonce using the given bytes
	fn get_nonce(bytes: &[u8]) -> Result<Nonce, Error> {
		Nonce::try_assume_unique_for_key(bytes).map_err(|_| Error::CryptoNonceError)
	}

	///
	/// Derive the cipher key from the secret and the salt
	///
	fn get_derived_key(&self, salt: &[u8]) -> Result<[u8; 32], Error> {
		let iterations = std::num::NonZeroU32::new(PBKDF2_ITERATIONS)
			.ok_or(Error::CryptoDeriveKeyWrongSizeError)?;
		let mut key = [0u8; 32];
		ring::pbkdf2::derive(
			ring::pbkdf2::PBKDF2_HMAC_SHA512,
			iterations,
			salt,
			self.secret.as_bytes(),
			&mut key,
		);
		Ok(key)
	}

	///
	/// Fill the buffer with random data
	///
	fn fill_random_bytes(&self, v: &mut [u8]) -> Result<(), Error> {
		self.random.fill(v).map_err(|_| Error::CryptoRandomBytesError)
	}
}

///
/// Generate a random url safe token
///
pub fn random_token(random: &dyn SecureRandom, size: usize) -> Result<String, Error> {
	let mut bytes = vec![0u8; size];
	random
		.fill(&mut bytes)
		.map_err(|_| Error::CryptoRandomBytesError)?;
	Ok(URL_SAFE_NO_PAD.encode(bytes))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_encryption() {
		let c = Crypto::new("Some key to test");

		let data = "Some random data";
		let encrypted = c.encrypt(data).unwrap();
		assert_ne!(encrypted, data);
		let decrypted = c.decrypt(&encrypted).unwrap();
		assert_eq!(data, decrypted);
	}

	#[test]
	fn test_wrong_secret_fails() {
		let encrypted = Crypto::new("first").encrypt("payload").unwrap();
		assert!(Crypto::new("second").decrypt(&encrypted).is_err());
	}

	#[test]
	fn test_tampered_or_short_data_fails() {
		let c = Crypto::new("Some key to test");
		assert!(c.decrypt("").is_err());
		assert!(c.decrypt("not base64 !!").is_err());

		let encrypted = c.encrypt("payload").unwrap();
		let mut bytes = URL_SAFE_NO_PAD.decode(&encrypted).unwrap();
		let last = bytes.len() - 1;
		bytes[last] ^= 0x01;
		assert!(c.decrypt(&URL_SAFE_NO_PAD.encode(bytes)).is_err());
	}

	#[test]
	fn test_random_token() {
		let c = Crypto::new("Some key to test");
		let a = c.random_token(32).unwrap();
		let b = c.random_token(32).unwrap();
		assert_eq!(a.len(), 43);
		assert_ne!(a, b);
	}
}
