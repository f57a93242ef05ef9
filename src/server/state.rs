use super::view::Views;
use crate::error::Error;
use crate::provider::{create_provider, Provider};
use crate::session::{MemorySessionStore, SessionStore};
use crate::settings::Settings;
use crate::util::crypto::Crypto;
use std::time::Duration;

///
/// Everything the handlers share, built once at startup
///
pub struct State {
	pub settings: Settings,
	pub crypto: Crypto,
	pub provider: Box<dyn Provider>,
	pub sessions: Box<dyn SessionStore>,
	pub views: Views,
}

impl State {
	///
	/// Discover the provider and prepare the shared state
	///
	pub async fn new(settings: Settings) -> Result<Self, Error> {
		let client = reqwest::Client::builder()
			.timeout(Duration::from_secs(settings.provider.timeout))
			.build()
			.map_err(|e| Error::SettingsError(e.to_string()))?;
		let provider = create_provider(&settings, client).await?;
		let sessions = MemorySessionStore::new(Duration::from_secs(settings.session.max_age));
		Self::with_parts(settings, provider, Box::new(sessions))
	}

	pub fn with_parts(
		settings: Settings,
		provider: Box<dyn Provider>,
		sessions: Box<dyn SessionStore>,
	) -> Result<Self, Error> {
		Ok(Self {
			crypto: Crypto::new(&settings.secret),
			views: Views::new()?,
			settings,
			provider,
			sessions,
		})
	}
}
