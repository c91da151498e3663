use std::net::TcpListener;

use env_logger::Env;
use harvest_reader::{
    configuration::get_configuration,
    services::NotionOAuth,
    startup::{build_content_fetcher, run},
};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let configuration = get_configuration().map_err(std::io::Error::other)?;

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    log::info!("Listening on {}", address);

    let client = reqwest::Client::new();
    let content_fetcher = build_content_fetcher(&configuration, &client);
    let notion_oauth = NotionOAuth::new(client, &configuration.notion);
    if !notion_oauth.is_configured() {
        log::error!("Notion OAuth credentials are missing, /api/notion will answer 401");
    }

    run(listener, content_fetcher, notion_oauth)?.await
}
