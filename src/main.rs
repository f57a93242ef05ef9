mod error;
mod provider;
mod server;
mod session;
mod settings;
mod util;

use actix_web::{middleware, web, App, HttpServer};
use std::io::{Error as IoError, ErrorKind};

///
/// Entrypoint
///
/// Discovers the provider and starts the server, or prints the configuration help
///
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	dotenvy::dotenv().ok();
	env_logger::init();
	let random = ring::rand::SystemRandom::new();
	let settings = settings::Settings::new(&random);
	let listen = settings.listen.clone();

	let state = match server::state::State::new(settings).await {
		Ok(state) => web::Data::new(state),
		Err(e) => {
			log::error!("{}", e);
			std::process::exit(1)
		}
	};

	let mut server = HttpServer::new(move || {
		let handler = server::handler::Handler::new(state.clone());
		App::new()
			.wrap(middleware::Logger::default())
			.configure(|cfg| handler.config(cfg))
	});

	// Check the urls to listen to
	for listen in listen.split_terminator(',') {
		let url = url::Url::parse(listen.trim()).map_err(|_| invalid_listen(listen))?;
		match url.scheme() {
			"http" => {
				let host = url.host_str().ok_or_else(|| invalid_listen(listen))?;
				let addr = format!("{}:{}", host, url.port().unwrap_or(80));
				log::info!("Listening on http://{}", addr);
				server = server.bind(addr)?;
			}
			#[cfg(unix)]
			"unix" => {
				log::info!("Listening on unix:{}", url.path());
				server = server.bind_uds(url.path())?;
			}
			_ => return Err(invalid_listen(listen)),
		}
	}
	server.run().await
}

fn invalid_listen(listen: &str) -> IoError {
	IoError::new(ErrorKind::InvalidInput, format!("Invalid listen url: {}", listen))
}
