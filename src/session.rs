use crate::error::Error;
use crate::provider::TokenSet;
use crate::server::state::State;
use actix_web::cookie::{Cookie, SameSite};
use actix_web::HttpRequest;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Session ids are made of 32 random bytes
const SESSION_ID_BYTES: usize = 32;

///
/// Where the token sets of the logged users are kept
///
#[async_trait::async_trait]
pub trait SessionStore: Send + Sync {
	async fn get(&self, id: &str) -> Result<Option<TokenSet>, Error>;
	async fn put(&self, id: &str, token_set: TokenSet) -> Result<(), Error>;
	async fn delete(&self, id: &str) -> Result<Option<TokenSet>, Error>;
}

struct StoredSession {
	token_set: TokenSet,
	created_at: Instant,
}

///
/// In process session store, sessions are dropped after `max_age`
///
pub struct MemorySessionStore {
	sessions: RwLock<HashMap<String, StoredSession>>,
	max_age: Duration,
}

impl MemorySessionStore {
	pub fn new(max_age: Duration) -> Self {
		Self {
			sessions: RwLock::new(HashMap::new()),
			max_age,
		}
	}

	fn poisoned<T>(_: T) -> Error {
		Error::SessionStoreError(String::from("session lock poisoned"))
	}
}

#[async_trait::async_trait]
impl SessionStore for MemorySessionStore {
	async fn get(&self, id: &str) -> Result<Option<TokenSet>, Error> {
		{
			let sessions = self.sessions.read().map_err(Self::poisoned)?;
			match sessions.get(id) {
				None => return Ok(None),
				Some(session) if session.created_at.elapsed() < self.max_age => {
					return Ok(Some(session.token_set.clone()))
				}
				Some(_) => {}
			}
		}
		self.sessions.write().map_err(Self::poisoned)?.remove(id);
		Ok(None)
	}

	async fn put(&self, id: &str, token_set: TokenSet) -> Result<(), Error> {
		let mut sessions = self.sessions.write().map_err(Self::poisoned)?;
		let max_age = self.max_age;
		sessions.retain(|_, session| session.created_at.elapsed() < max_age);
		sessions.insert(
			id.to_string(),
			StoredSession {
				token_set,
				created_at: Instant::now(),
			},
		);
		Ok(())
	}

	async fn delete(&self, id: &str) -> Result<Option<TokenSet>, Error> {
		let mut sessions = self.sessions.write().map_err(Self::poisoned)?;
		Ok(sessions.remove(id).map(|session| session.token_set))
	}
}

///
/// The session of the current request
///
pub struct Session {
	pub id: String,
	pub token_set: TokenSet,
}

impl Session {
	///
	/// Store the token set under a new session id
	///
	pub async fn create(state: &State, token_set: TokenSet) -> Result<Self, Error> {
		let id = state.crypto.random_token(SESSION_ID_BYTES)?;
		state.sessions.put(&id, token_set.clone()).await?;
		Ok(Self { id, token_set })
	}

	///
	/// Load the session referenced by the request cookie, if any
	///
	pub async fn from_request(state: &State, req: &HttpRequest) -> Result<Option<Self>, Error> {
		let id = match Self::request_get_id(state, req) {
			Some(id) => id,
			None => return Ok(None),
		};
		let token_set = state.sessions.get(&id).await?;
		Ok(token_set.map(|token_set| Self { id, token_set }))
	}

	/// Get the session id from the request cookie
	fn request_get_id(state: &State, req: &HttpRequest) -> Option<String> {
		let cookie = req.cookie(&state.settings.cookie.session_name)?;
		state.crypto.decrypt(cookie.value()).ok()
	}

	///
	/// Remove the session from the store
	///
	pub async fn destroy(self, state: &State) -> Result<TokenSet, Error> {
		state.sessions.delete(&self.id).await?;
		Ok(self.token_set)
	}

	///
	/// Cookie carrying the encrypted session id
	///
	pub fn cookie(&self, state: &State) -> Result<Cookie<'static>, Error> {
		let value = state.crypto.encrypt(&self.id)?;
		Ok(Cookie::build(state.settings.cookie.session_name.clone(), value)
			.path("/")
			.http_only(true)
			.secure(state.settings.secure_cookies())
			.same_site(SameSite::Lax)
			.max_age(time::Duration::seconds(state.settings.session.max_age as i64))
			.finish())
	}

	pub fn removal_cookie(state: &State) -> Cookie<'static> {
		let mut cookie = Cookie::build(state.settings.cookie.session_name.clone(), "")
			.path("/")
			.finish();
		cookie.make_removal();
		cookie
	}
}
