use actix_web::{middleware, web, App, HttpServer};
use bmi_face::config::{Settings, DEFAULT_CONFIG_FILE};
use bmi_face::server::{self, AppState};
use bmi_face::util::init_tracing;
use std::path::PathBuf;
use std::{env, io, process};

use tracing::{error, info};

const USAGE: &str = "usage: ./bmi-face [config file]";

fn get_args() -> Option<PathBuf> {
    let args: Vec<String> = env::args().collect();
    match args.len() {
        1 => None,
        2 if args[1] != "-h" && args[1] != "--help" => Some(PathBuf::from(&args[1])),
        _ => {
            println!("{USAGE}");
            println!("without a config file, ./{DEFAULT_CONFIG_FILE} is read if present");
            process::exit(1);
        }
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config_file = get_args();

    let settings = match Settings::load(config_file) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("invalid configuration: {e}");
            process::exit(1);
        }
    };
    init_tracing(&settings.log.filter);

    info!(
        "serving model {} on {}:{}",
        settings.model.path.display(),
        settings.server.host,
        settings.server.port
    );

    let state = web::Data::new(AppState::from_settings(&settings));
    let max_payload = settings.server.max_payload_bytes;

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_payload))
            .wrap(middleware::Logger::default())
            .configure(server::configure)
    });
    if settings.server.workers > 0 {
        server = server.workers(settings.server.workers);
    }

    server
        .bind(settings.server.bind_addr())
        .map_err(|e| {
            error!("failed to bind {}:{}: {e}", settings.server.host, settings.server.port);
            e
        })?
        .run()
        .await
}
