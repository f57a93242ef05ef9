mod args;
mod env;

use crate::error::Error;
use crate::util::crypto;
use args::ArgsConfig;
use config::builder::{ConfigBuilder, DefaultState};
use env::EnvironmentConfig;
use serde::Deserialize;

const ENV_SUBMATCHERS: &[&str] = &["cookie", "session", "provider"];

/// Variable names used by existing deployments, read regardless of the prefix
const ENV_ALIASES: &[(&str, &str)] = &[
	("OIDC_ISSUER", "provider.issuer"),
	("OIDC_CLIENT_ID", "provider.client_id"),
	("OIDC_CLIENT_SECRET", "provider.client_secret"),
	("FLASK_SECRET_KEY", "secret"),
];

///
/// Settings
///
#[derive(Clone, Debug, Deserialize)]
pub struct Settings {
	pub listen: String,
	/// Public URL of the application
	pub url: String,
	pub secret: String,
	pub cookie: SettingsCookie,
	pub session: SettingsSession,
	pub provider: SettingsProvider,
}

///
/// Settings for cookies
///
#[derive(Clone, Debug, Deserialize)]
pub struct SettingsCookie {
	pub session_name: String,
	pub flow_name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SettingsSession {
	pub max_age: u64,
}

///
/// Settings for the provider
///
#[derive(Clone, Debug, Deserialize)]
pub struct SettingsProvider {
	pub provider: String,
	pub issuer: String,
	pub client_id: String,
	pub client_secret: String,
	pub scope: String,
	pub timeout: u64,
	pub token_auth_method: String,
	pub callback_url: Option<String>,
	pub logout_redirect_url: Option<String>,
}

impl Settings {
	pub fn new(random: &dyn ring::rand::SecureRandom) -> Self {
		match Self::new_impl(random) {
			Ok(s) => s,
			Err(Error::SettingsShowHelpError) => {
				ArgsConfig::show_help();
				std::process::exit(0)
			}
			Err(e) => {
				log::error!("{}", e);
				ArgsConfig::show_help();
				std::process::exit(1)
			}
		}
	}

	fn new_impl(random: &dyn ring::rand::SecureRandom) -> Result<Self, Error> {
		let args = ArgsConfig::new()?;

		// The env prefix may itself come from the args
		let prefix = config::Config::builder()
			.set_default("config.env", "OIDC")?
			.add_source(args.clone())
			.build()?
			.get_string("config.env")?;

		let s = Self::defaults()?
			.add_source(EnvironmentConfig::with_prefix(&prefix, ENV_SUBMATCHERS).with_aliases(ENV_ALIASES))
			.add_source(args)
			.build()?;

		// If no secret is provided, use a random one
		let s = if s.get_string("secret").is_err() {
			log::warn!("No secret configured, sessions will not survive a restart");
			config::Config::builder()
				.add_source(s)
				.set_override("secret", crypto::random_token(random, 32)?)?
				.build()?
		} else {
			s
		};

		let settings: Self = s.try_deserialize()?;
		settings.validate()?;
		Ok(settings)
	}

	fn defaults() -> Result<ConfigBuilder<DefaultState>, Error> {
		Ok(config::Config::builder()
			.set_default("listen", "http://127.0.0.1:8088")?
			.set_default("url", "http://127.0.0.1:8088")?
			.set_default("cookie.session_name", "rp_session")?
			.set_default("cookie.flow_name", "rp_flow")?
			.set_default("session.max_age", 8 * 60 * 60_i64)?
			.set_default("provider.provider", "keycloak")?
			.set_default("provider.client_secret", "")?
			.set_default("provider.scope", "openid profile email roles")?
			.set_default("provider.timeout", 5_i64)?
			.set_default("provider.token_auth_method", "client_secret_basic")?)
	}

	fn validate(&self) -> Result<(), Error> {
		url::Url::parse(&self.url)?;
		url::Url::parse(&self.provider.issuer)?;
		if self.provider.client_id.is_empty() {
			return Err(Error::SettingsError(String::from("provider.client_id is required")));
		}
		if self.provider.timeout == 0 {
			return Err(Error::SettingsError(String::from("provider.timeout must be positive")));
		}
		Ok(())
	}

	///
	/// Url the provider sends the user back to
	///
	pub fn callback_url(&self) -> String {
		match self.provider.callback_url {
			Some(ref url) => url.clone(),
			None => format!("{}/callback", self.url.trim_end_matches('/')),
		}
	}

	///
	/// Url the provider sends the user to after the logout
	///
	pub fn logout_redirect_url(&self) -> String {
		match self.provider.logout_redirect_url {
			Some(ref url) => url.clone(),
			None => format!("{}/", self.url.trim_end_matches('/')),
		}
	}

	/// Cookies are only marked secure when the application is served over https
	pub fn secure_cookies(&self) -> bool {
		self.url.starts_with("https://")
	}
}

#[cfg(test)]
pub fn test_settings(issuer: &str) -> Settings {
	Settings {
		listen: String::from("http://127.0.0.1:8088"),
		url: String::from("http://127.0.0.1:8088"),
		secret: String::from("a secret used only by the tests"),
		cookie: SettingsCookie {
			session_name: String::from("rp_session"),
			flow_name: String::from("rp_flow"),
		},
		session: SettingsSession { max_age: 3600 },
		provider: SettingsProvider {
			provider: String::from("oidc"),
			issuer: issuer.to_string(),
			client_id: String::from("rp-client"),
			client_secret: String::from("rp-client-secret-with-enough-entropy"),
			scope: String::from("openid profile email roles"),
			timeout: 5,
			token_auth_method: String::from("client_secret_basic"),
			callback_url: None,
			logout_redirect_url: None,
		},
	}
}
