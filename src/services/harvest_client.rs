use async_trait::async_trait;
use reqwest::Client;

use crate::domain::fetch::SavePageRequest;

use super::ReaderError;

#[async_trait]
pub trait PageSaver: Send + Sync {
    async fn save_parsed_page(
        &self,
        request: &SavePageRequest,
        authorization: &str,
    ) -> Result<serde_json::Value, ReaderError>;
}

pub struct HarvestClient {
    client: Client,
    url: String,
}

impl HarvestClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        HarvestClient {
            client,
            url: format!("{}/v1/save_page", base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl PageSaver for HarvestClient {
    async fn save_parsed_page(
        &self,
        request: &SavePageRequest,
        authorization: &str,
    ) -> Result<serde_json::Value, ReaderError> {
        let res = self
            .client
            .post(&self.url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .json(request)
            .send()
            .await
            .map_err(|e| ReaderError::Unclassified(e.to_string()))?;

        // Whatever the backend answers is handed back to the caller as-is.
        let body = res
            .bytes()
            .await
            .map_err(|e| ReaderError::Unclassified(e.to_string()))?;

        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn forwards_authorization_and_page() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/save_page")
            .match_header("authorization", "Bearer secret")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({
                "async_save": true,
                "page_url": "https://mp.weixin.qq.com/s/abc",
                "page_html": "<html></html>",
            })))
            .with_status(200)
            .with_body(r#"{"id":"page-1"}"#)
            .create_async()
            .await;

        let client = HarvestClient::new(Client::new(), &server.url());
        let data = client
            .save_parsed_page(
                &SavePageRequest::new(
                    "https://mp.weixin.qq.com/s/abc".to_string(),
                    "<html></html>".to_string(),
                ),
                "Bearer secret",
            )
            .await
            .unwrap();

        assert_eq!(data, serde_json::json!({ "id": "page-1" }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_json_body_is_unclassified() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/save_page")
            .with_status(500)
            .with_body("Internal Server Error")
            .create_async()
            .await;

        let client = HarvestClient::new(Client::new(), &server.url());
        let err = client
            .save_parsed_page(
                &SavePageRequest::new("u".to_string(), "h".to_string()),
                "Bearer secret",
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ReaderError::Unclassified(_)));
        assert!(!err.is_retryable());
    }
}
