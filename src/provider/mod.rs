mod base;
mod keycloak;
mod oidc;
use crate::error::Error;
use crate::settings::Settings;
pub use base::*;
pub use keycloak::ProviderKeycloak;
pub use oidc::ProviderOIDC;

#[cfg(test)]
pub use oidc::testing;

///
/// Discover the configured provider
///
pub async fn create_provider(
	settings: &Settings,
	client: reqwest::Client,
) -> Result<Box<dyn Provider>, Error> {
	match settings.provider.provider.as_str() {
		"keycloak" => Ok(Box::new(ProviderKeycloak::new(
			ProviderOIDC::discover(settings, client).await?,
		))),
		"oidc" => Ok(Box::new(ProviderOIDC::discover(settings, client).await?)),
		_ => Err(Error::SettingsError(format!(
			"invalid provider '{}'",
			settings.provider.provider
		))),
	}
}
