use crate::error::Error;
use crate::provider::{Claims, Provider, RoleSet, TokenSet};
use crate::util::jwt;
use handlebars::Handlebars;
use serde::Serialize;

const HOME: &str = "home";
const PROFILE: &str = "profile";

#[derive(Serialize)]
struct HomeView {
	user: Option<String>,
}

#[derive(Serialize)]
struct ClaimView {
	name: String,
	value: String,
}

#[derive(Serialize)]
struct ProfileView {
	user: String,
	claims: Vec<ClaimView>,
	roles: Vec<RoleSet>,
	token_type: String,
	expires_at: Option<String>,
	has_id_token: bool,
}

///
/// Compiled page templates
///
pub struct Views {
	handlebars: Handlebars<'static>,
}

impl Views {
	pub fn new() -> Result<Self, Error> {
		let mut handlebars = Handlebars::new();
		handlebars.register_template_string(HOME, include_str!("templates/home.hbs"))?;
		handlebars.register_template_string(PROFILE, include_str!("templates/profile.hbs"))?;
		Ok(Self { handlebars })
	}

	pub fn home(&self, token_set: Option<&TokenSet>) -> Result<String, Error> {
		let user = token_set.map(|token_set| display_name(&claims_of(token_set)));
		Ok(self.handlebars.render(HOME, &HomeView { user })?)
	}

	pub fn profile(&self, provider: &dyn Provider, token_set: &TokenSet) -> Result<String, Error> {
		let claims = claims_of(token_set);
		let view = ProfileView {
			user: display_name(&claims),
			claims: claims
				.iter()
				.map(|(name, value)| ClaimView {
					name: name.clone(),
					value: match value {
						serde_json::Value::String(s) => s.clone(),
						other => other.to_string(),
					},
				})
				.collect(),
			roles: roles_of(provider, token_set),
			token_type: token_set.token_type.clone(),
			expires_at: token_set.expires_at.and_then(format_timestamp),
			has_id_token: token_set.id_token.is_some(),
		};
		Ok(self.handlebars.render(PROFILE, &view)?)
	}
}

///
/// The userinfo, or the id token claims when the provider sent none
///
fn claims_of(token_set: &TokenSet) -> Claims {
	token_set
		.userinfo
		.clone()
		.or_else(|| token_set.id_token.as_deref().and_then(jwt::decode_unverified))
		.unwrap_or_default()
}

fn display_name(claims: &Claims) -> String {
	["preferred_username", "name", "email", "sub"]
		.iter()
		.find_map(|key| claims.get(*key).and_then(|v| v.as_str()))
		.unwrap_or("unknown user")
		.to_string()
}

///
/// Roles can be in the userinfo, the id token or the access token
///
fn roles_of(provider: &dyn Provider, token_set: &TokenSet) -> Vec<RoleSet> {
	let sources = [
		token_set.userinfo.clone(),
		token_set.id_token.as_deref().and_then(jwt::decode_unverified),
		jwt::decode_unverified(&token_set.access_token),
	];

	let mut merged: Vec<RoleSet> = Vec::new();
	for claims in sources.iter().flatten() {
		for set in provider.roles(claims) {
			match merged.iter_mut().find(|m| m.scope == set.scope) {
				Some(existing) => {
					for role in set.roles {
						if !existing.roles.contains(&role) {
							existing.roles.push(role);
						}
					}
				}
				None => merged.push(set),
			}
		}
	}
	merged
}

fn format_timestamp(timestamp: u64) -> Option<String> {
	let datetime = time::OffsetDateTime::from_unix_timestamp(i64::try_from(timestamp).ok()?).ok()?;
	datetime
		.format(&time::format_description::well_known::Rfc3339)
		.ok()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_display_name() {
		let claims = serde_json::json!({ "sub": "u1", "email": "u1@x.com" });
		assert_eq!(display_name(claims.as_object().unwrap()), "u1@x.com");
		assert_eq!(display_name(&Claims::new()), "unknown user");
	}

	#[test]
	fn test_home_escapes_values() {
		let views = Views::new().unwrap();
		let token_set = TokenSet {
			access_token: String::from("AT1"),
			id_token: None,
			token_type: String::from("Bearer"),
			expires_at: None,
			userinfo: serde_json::json!({ "name": "<script>" }).as_object().cloned(),
		};
		let html = views.home(Some(&token_set)).unwrap();
		assert!(html.contains("&lt;script&gt;"));
		assert!(!html.contains("<script>"));

		let html = views.home(None).unwrap();
		assert!(html.contains("/login"));
	}

	#[test]
	fn test_format_timestamp() {
		assert_eq!(format_timestamp(0).as_deref(), Some("1970-01-01T00:00:00Z"));
		assert_eq!(format_timestamp(u64::MAX), None);
	}
}
