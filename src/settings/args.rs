use crate::error::Error;
use config::{Map, Source, Value};
use getopts::Options;

const OPTS: &[(&str, &str, &str, &str)] = &[
	(
		"config-env",
		"config.env",
		"Use env variables prefixed with ENV_PREFIX to configure. Ex: '--listen' becomes ENV_PREFIX_LISTEN (default OIDC)",
		"ENV_PREFIX",
	),
	(
		"listen",
		"listen",
		"Listen for the server on the given URLs (comma delimited for multiple)",
		"URLS",
	),
	(
		"url",
		"url",
		"Public URL of this application, used to build the callback and logout urls",
		"URL",
	),
	(
		"secret",
		"secret",
		"The SECRET is used to encrypt the cookies",
		"SECRET",
	),
	(
		"cookie-session-name",
		"cookie.session_name",
		"The name of the cookie used to store the session id",
		"NAME",
	),
	(
		"cookie-flow-name",
		"cookie.flow_name",
		"The name of the cookie used to store the pending login",
		"NAME",
	),
	(
		"session-max-age",
		"session.max_age",
		"Seconds a session is kept after the login",
		"SECONDS",
	),
	(
		"provider",
		"provider.provider",
		"The provider to use. 'keycloak' (default) or 'oidc'",
		"PROVIDER",
	),
	(
		"provider-issuer",
		"provider.issuer",
		"Issuer URL, the discovery document is read from ISSUER/.well-known/openid-configuration",
		"ISSUER",
	),
	(
		"provider-client-id",
		"provider.client_id",
		"Client ID of the provider",
		"CLIENT_ID",
	),
	(
		"provider-client-secret",
		"provider.client_secret",
		"Client Secret of the provider",
		"CLIENT_SECRET",
	),
	(
		"provider-scope",
		"provider.scope",
		"Scopes requested on login (space delimited)",
		"SCOPE",
	),
	(
		"provider-timeout",
		"provider.timeout",
		"Timeout in seconds for every request made to the provider",
		"SECONDS",
	),
	(
		"provider-token-auth-method",
		"provider.token_auth_method",
		"How to authenticate on the token endpoint. 'client_secret_basic' or 'client_secret_post'",
		"METHOD",
	),
	(
		"provider-callback-url",
		"provider.callback_url",
		"Url to send the user back when auth is complete",
		"URL",
	),
	(
		"provider-logout-redirect-url",
		"provider.logout_redirect_url",
		"Url to send the user after the logout",
		"URL",
	),
];

#[derive(Clone, Debug)]
pub struct ArgsConfig {
	config: Map<String, Value>,
}

impl ArgsConfig {
	pub fn new() -> Result<Self, Error> {
		let args: Vec<String> = std::env::args().skip(1).collect();
		Self::from_args(&args)
	}

	pub fn from_args(args: &[String]) -> Result<Self, Error> {
		Ok(Self {
			config: Self::collect_config(args)?,
		})
	}

	pub fn show_help() {
		let options = Self::get_options();
		let brief = "Usage: oidc-rp [options]";
		print!("{}", options.usage(brief));
	}

	fn get_options() -> Options {
		let mut opts = Options::new();
		opts.optflag("h", "help", "Show help");
		for (longname, _, desc, arg_hint) in OPTS {
			opts.optopt("", longname, desc, arg_hint);
		}
		opts
	}

	fn collect_config(args: &[String]) -> Result<Map<String, Value>, Error> {
		let uri = String::from("args");
		let opts = Self::get_options();
		let matches = opts
			.parse(args)
			.map_err(|e| Error::SettingsError(e.to_string()))?;

		if matches.opt_present("h") {
			return Err(Error::SettingsShowHelpError);
		}

		let mut m = Map::new();
		for (longname, configname, _, _) in OPTS {
			if let Some(value) = matches.opt_str(longname) {
				m.insert(configname.to_string(), Value::new(Some(&uri), value));
			}
		}
		Ok(m)
	}
}

impl Source for ArgsConfig {
	fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
		Box::new((*self).clone())
	}

	fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
		Ok(self.config.clone())
	}
}
