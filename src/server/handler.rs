use super::flow::{self, CallbackParams, PendingFlow};
use super::state::State;
use crate::error::Error;
use crate::provider::Provider;
use crate::session::Session;
use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, ResponseError};

fn html(body: String) -> HttpResponse {
	HttpResponse::Ok()
		.content_type("text/html; charset=utf-8")
		.body(body)
}

fn redirect(location: &str) -> actix_web::HttpResponseBuilder {
	let mut builder = HttpResponse::Found();
	builder.insert_header((header::LOCATION, location));
	builder
}

async fn index(req: HttpRequest, state: web::Data<State>) -> Result<HttpResponse, Error> {
	let session = Session::from_request(&state, &req).await?;
	let body = state.views.home(session.as_ref().map(|s| &s.token_set))?;
	Ok(html(body))
}

async fn login(state: web::Data<State>) -> Result<HttpResponse, Error> {
	let pending = PendingFlow::new(&state)?;
	let url = pending.authorization_url(&state);
	log::debug!("Starting a new login");
	Ok(redirect(&url).cookie(pending.cookie(&state)?).finish())
}

async fn callback(
	req: HttpRequest,
	state: web::Data<State>,
	params: web::Query<CallbackParams>,
) -> Result<HttpResponse, Error> {
	let pending = PendingFlow::from_request(&state, &req);
	let token_set = match flow::complete(&state, pending.as_ref(), &params).await {
		Ok(token_set) => token_set,
		Err(e) if e.is_flow_error() => {
			let mut response = e.error_response();
			response
				.add_cookie(&PendingFlow::removal_cookie(&state))
				.map_err(|_| Error::SettingsError(String::from("invalid cookie name")))?;
			return Ok(response);
		}
		Err(e) => return Err(e),
	};

	// A new login replaces any previous session
	if let Some(previous) = Session::from_request(&state, &req).await? {
		previous.destroy(&state).await?;
	}
	let session = Session::create(&state, token_set).await?;
	log::info!("User logged in");

	Ok(redirect("/profile")
		.cookie(session.cookie(&state)?)
		.cookie(PendingFlow::removal_cookie(&state))
		.finish())
}

async fn profile(req: HttpRequest, state: web::Data<State>) -> Result<HttpResponse, Error> {
	let session = match Session::from_request(&state, &req).await? {
		Some(session) => session,
		None => return Ok(redirect("/login").finish()),
	};
	let body = state.views.profile(&*state.provider, &session.token_set)?;
	Ok(html(body))
}

async fn logout(req: HttpRequest, state: web::Data<State>) -> Result<HttpResponse, Error> {
	let id_token = match Session::from_request(&state, &req).await? {
		Some(session) => session.destroy(&state).await?.id_token,
		None => None,
	};
	let url = state.provider.end_session_url(id_token.as_deref());
	Ok(redirect(&url).cookie(Session::removal_cookie(&state)).finish())
}

pub struct Handler {
	state: web::Data<State>,
}

impl Handler {
	pub fn new(state: web::Data<State>) -> Handler {
		Handler { state }
	}

	pub fn config(&self, cfg: &mut web::ServiceConfig) {
		cfg.app_data(self.state.clone())
			.route("/", web::get().to(index))
			.route("/login", web::get().to(login))
			.route("/callback", web::get().to(callback))
			.route("/profile", web::get().to(profile))
			.route("/logout", web::get().to(logout));
	}
}
