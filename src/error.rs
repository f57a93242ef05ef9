use actix_web::http::StatusCode;

#[derive(Debug)]
pub enum Error {
	CryptoError,
	CryptoCipherError,
	CryptoNonceError,
	CryptoDeriveKeyWrongSizeError,
	CryptoRandomBytesError,

	SettingsError(String),
	SettingsConfigError(config::ConfigError),
	SettingsUrlParseError(url::ParseError),
	SettingsShowHelpError,

	/// The provider metadata could not be discovered at startup
	DiscoveryFailure(String),
	/// The callback state is missing, expired or does not match the pending flow
	StateMismatch,
	/// The provider redirected back with an `error` parameter
	ProviderDenied(String),
	/// The callback has no authorization code
	MissingCode,
	TokenExchangeFailure(String),
	IdTokenInvalid(String),
	UserinfoFetchFailure(String),

	SessionStoreError(String),
	TemplateError(String),
	JsonError(serde_json::Error),
}

impl Error {
	///
	/// Errors caused by the authentication flow itself, reported back to the user
	///
	pub fn is_flow_error(&self) -> bool {
		matches!(
			self,
			Error::StateMismatch
				| Error::ProviderDenied(_)
				| Error::MissingCode
				| Error::TokenExchangeFailure(_)
				| Error::IdTokenInvalid(_)
				| Error::UserinfoFetchFailure(_)
		)
	}
}

impl std::error::Error for Error {}

impl actix_web::error::ResponseError for Error {
	fn status_code(&self) -> StatusCode {
		if self.is_flow_error() {
			StatusCode::BAD_REQUEST
		} else {
			StatusCode::INTERNAL_SERVER_ERROR
		}
	}

	fn error_response(&self) -> actix_web::HttpResponse {
		if self.is_flow_error() {
			log::warn!("Authentication failed: {}", self);
			return actix_web::HttpResponse::BadRequest()
				.content_type("text/plain; charset=utf-8")
				.body(format!("Authentication failed: {}", self));
		}
		log::error!("Uncaught error: {}", self);
		actix_web::HttpResponse::InternalServerError().finish()
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
		let message: String = match self {
			Error::CryptoError => String::from("Crypto error"),
			Error::CryptoCipherError => String::from("Error using the cipher"),
			Error::CryptoNonceError => String::from("Error creating the nonce"),
			Error::CryptoDeriveKeyWrongSizeError => String::from("Error deriving the key"),
			Error::CryptoRandomBytesError => String::from("Error generating random bytes"),

			Error::SettingsError(ref message) => format!("Settings error: {}", message),
			Error::SettingsConfigError(ref error) => format!("Config error: {}", error),
			Error::SettingsUrlParseError(ref error) => format!("Invalid url: {}", error),
			Error::SettingsShowHelpError => String::from("Help requested"),

			Error::DiscoveryFailure(ref message) => format!("Provider discovery failed: {}", message),
			Error::StateMismatch => String::from("state does not match the pending login"),
			Error::ProviderDenied(ref message) => format!("provider returned an error: {}", message),
			Error::MissingCode => String::from("authorization code is missing"),
			Error::TokenExchangeFailure(ref message) => format!("token exchange failed: {}", message),
			Error::IdTokenInvalid(ref message) => format!("invalid id_token: {}", message),
			Error::UserinfoFetchFailure(ref message) => format!("userinfo unavailable: {}", message),

			Error::SessionStoreError(ref message) => format!("Session store error: {}", message),
			Error::TemplateError(ref message) => format!("Template error: {}", message),
			Error::JsonError(ref error) => format!("JSON error: {}", error),
		};
		write!(f, "{}", message)
	}
}

impl From<config::ConfigError> for Error {
	fn from(error: config::ConfigError) -> Error {
		Error::SettingsConfigError(error)
	}
}

/// JSON serialize/deserialize error
impl From<serde_json::Error> for Error {
	fn from(error: serde_json::Error) -> Error {
		Error::JsonError(error)
	}
}

/// Converts from an URL parser error
impl From<url::ParseError> for Error {
	fn from(error: url::ParseError) -> Error {
		Error::SettingsUrlParseError(error)
	}
}

/// Template compile and render errors
impl From<handlebars::TemplateError> for Error {
	fn from(error: handlebars::TemplateError) -> Error {
		Error::TemplateError(error.to_string())
	}
}

impl From<handlebars::RenderError> for Error {
	fn from(error: handlebars::RenderError) -> Error {
		Error::TemplateError(error.to_string())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::ResponseError;

	#[test]
	fn test_flow_errors_are_bad_requests() {
		assert_eq!(Error::StateMismatch.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(
			Error::TokenExchangeFailure(String::from("timeout")).status_code(),
			StatusCode::BAD_REQUEST
		);
		assert_eq!(
			Error::CryptoError.status_code(),
			StatusCode::INTERNAL_SERVER_ERROR
		);
	}
}
