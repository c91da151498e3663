use std::{net::TcpListener, sync::Arc};

use actix_web::{dev::Server, middleware::Logger, web, App, HttpServer};

use crate::{
    configuration::Settings,
    routes::{default_route, notion_route, reader_route},
    services::{
        ContentFetcher, ErrorReporter, HarvestClient, LogNotifier, NotionOAuth, RenderingProxy,
        RetryPolicy, WebhookNotifier,
    },
};

pub fn build_content_fetcher(configuration: &Settings, client: &reqwest::Client) -> ContentFetcher {
    let renderer = RenderingProxy::new(
        client.clone(),
        &configuration.reader.rendering_base_url,
        &configuration.reader.wait_for_selector,
    );
    let saver = HarvestClient::new(client.clone(), &configuration.harvest.base_url);
    let reporter: Arc<dyn ErrorReporter> = match configuration.notifier.webhook_url {
        Some(ref url) if !url.is_empty() => {
            Arc::new(WebhookNotifier::new(client.clone(), url.clone()))
        }
        _ => {
            log::info!("No error notifier webhook configured, reporting to logs only");
            Arc::new(LogNotifier)
        }
    };

    ContentFetcher::new(Arc::new(renderer), Arc::new(saver), reporter).with_policy(RetryPolicy {
        max_attempts: configuration.reader.max_attempts.max(1),
        backoff_step: configuration.reader.backoff_step(),
    })
}

pub fn run(
    listener: TcpListener,
    content_fetcher: ContentFetcher,
    notion_oauth: NotionOAuth,
) -> Result<Server, std::io::Error> {
    let content_fetcher = web::Data::new(content_fetcher);
    let notion_oauth = web::Data::new(notion_oauth);

    let server = HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .service(default_route::default)
            .service(
                web::scope("/api")
                    .service(reader_route::reader)
                    .service(notion_route::notion_callback),
            )
            .app_data(content_fetcher.clone())
            .app_data(notion_oauth.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
