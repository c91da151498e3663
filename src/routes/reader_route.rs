use actix_web::{http::header, post, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::services::ContentFetcher;

#[derive(Deserialize, Default)]
struct ReaderBody {
    page_url: Option<String>,
}

#[post("/reader")]
async fn reader(
    req: HttpRequest,
    body: web::Bytes,
    content_fetcher: web::Data<ContentFetcher>,
) -> HttpResponse {
    // Always 200; failures are reported through `ok: false`.
    let body: ReaderBody = serde_json::from_slice(&body).unwrap_or_else(|e| {
        log::error!("Unreadable /api/reader body: {:?}", e);
        ReaderBody::default()
    });
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let outcome = content_fetcher
        .fetch_and_save(body.page_url.as_deref(), authorization)
        .await;

    HttpResponse::Ok().json(outcome)
}
