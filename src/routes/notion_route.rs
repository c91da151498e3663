use actix_web::{get, http::header, web, HttpResponse};
use serde::Deserialize;

use crate::services::{NotionOAuth, TokenExchange};

const ACCOUNTS_PATH: &str = "/user/accounts";
const SELECT_DATABASE_PATH: &str = "/databases/select";

#[derive(Deserialize)]
struct NotionCallbackQuery {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

fn redirect(location: String) -> HttpResponse {
    HttpResponse::TemporaryRedirect()
        .insert_header((header::LOCATION, location))
        .finish()
}

fn select_database_with_error(message: &str) -> HttpResponse {
    redirect(format!(
        "{}?error={}",
        SELECT_DATABASE_PATH,
        urlencoding::encode(message)
    ))
}

#[get("/notion")]
async fn notion_callback(
    query: web::Query<NotionCallbackQuery>,
    notion_oauth: web::Data<NotionOAuth>,
) -> HttpResponse {
    if let Some(ref error) = query.error {
        log::error!("Notion authorization was declined: {}", error);
        return redirect(ACCOUNTS_PATH.to_string());
    }

    let (code, state) = match (&query.code, &query.state) {
        (Some(code), Some(state)) if notion_oauth.is_configured() => (code, state),
        _ => {
            return HttpResponse::Unauthorized()
                .json(serde_json::json!({ "ok": false, "error": "Invalid code" }))
        }
    };

    match notion_oauth.exchange_code(code, state).await {
        Ok(TokenExchange::Granted) => redirect(SELECT_DATABASE_PATH.to_string()),
        Ok(TokenExchange::MissingAccessToken) => {
            select_database_with_error("access_token not found")
        }
        Err(e) => {
            log::error!("Notion auth failed: {:?}", e);
            let message = e.to_string();
            match message.is_empty() {
                true => select_database_with_error("Notion auth failed"),
                false => select_database_with_error(&message),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{http::StatusCode, test, App};
    use base64::{engine::general_purpose::STANDARD, Engine as _};

    use super::*;
    use crate::configuration::NotionSettings;

    fn notion_oauth(api_base_url: String, client_id: &str) -> web::Data<NotionOAuth> {
        web::Data::new(NotionOAuth::new(
            reqwest::Client::new(),
            &NotionSettings {
                api_base_url,
                client_id: client_id.to_string(),
                client_secret: "secret".to_string(),
                redirect_uri: "https://app.example.com/api/notion".to_string(),
            },
        ))
    }

    fn location(res: &actix_web::dev::ServiceResponse) -> String {
        res.headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string()
    }

    #[actix_web::test]
    async fn declined_authorization_goes_back_to_accounts() {
        let app = test::init_service(
            App::new()
                .app_data(notion_oauth("http://127.0.0.1:9".to_string(), "id"))
                .service(web::scope("/api").service(notion_callback)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/api/notion?error=access_denied")
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&res), "/user/accounts");
    }

    #[actix_web::test]
    async fn missing_code_or_credentials_is_unauthorized() {
        let app = test::init_service(
            App::new()
                .app_data(notion_oauth("http://127.0.0.1:9".to_string(), ""))
                .service(web::scope("/api").service(notion_callback)),
        )
        .await;

        for uri in ["/api/notion?state=abc", "/api/notion?code=abc&state=abc"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let res = test::call_service(&app, req).await;
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

            let body: serde_json::Value = test::read_body_json(res).await;
            assert_eq!(body, serde_json::json!({ "ok": false, "error": "Invalid code" }));
        }
    }

    #[actix_web::test]
    async fn granted_token_redirects_to_database_selection() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/oauth/token")
            .with_body(r#"{"access_token":"tok"}"#)
            .create_async()
            .await;

        let app = test::init_service(
            App::new()
                .app_data(notion_oauth(server.url(), "id"))
                .service(web::scope("/api").service(notion_callback)),
        )
        .await;

        let state = urlencoding::encode(&STANDARD.encode("{}")).into_owned();
        let req = test::TestRequest::get()
            .uri(&format!("/api/notion?code=abc&state={}", state))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(location(&res), "/databases/select");
    }

    #[actix_web::test]
    async fn missing_token_redirects_with_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/oauth/token")
            .with_body(r#"{}"#)
            .create_async()
            .await;

        let app = test::init_service(
            App::new()
                .app_data(notion_oauth(server.url(), "id"))
                .service(web::scope("/api").service(notion_callback)),
        )
        .await;

        let state = urlencoding::encode(&STANDARD.encode("{}")).into_owned();
        let req = test::TestRequest::get()
            .uri(&format!("/api/notion?code=abc&state={}", state))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(
            location(&res),
            "/databases/select?error=access_token%20not%20found"
        );
    }
}
