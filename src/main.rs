use std::{env, io};

use actix_web::{web, App, HttpServer};
use log::info;

use vote_ledger::config::Config;
use vote_ledger::http::{self, AppState};
use vote_ledger::{demo, Election};

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if env::args().nth(1).as_deref() == Some("demo") {
        return demo::run().map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    }

    let config = Config::from_env().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
    let election = Election::from_config(&config).map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;
    info!(
        "election ready: {} voter(s), {} candidate(s), {} block(s)",
        election.voters().len(),
        election.candidates().len(),
        election.ledger_snapshot().len()
    );

    let state = web::Data::new(AppState::new(election));

    info!("listening on {}", config.bind);
    HttpServer::new(move || App::new().app_data(state.clone()).configure(http::configure))
        .bind(&config.bind)?
        .run()
        .await
}
