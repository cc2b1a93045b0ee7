use log::error;
use timetable_generator::{config::Config, server};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(2);
        }
    };

    if let Err(e) = server::run_server(config).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
