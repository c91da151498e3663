use anyhow::{anyhow, Context};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::configuration::NotionSettings;

#[derive(Deserialize, Default, Debug, PartialEq)]
pub struct OAuthState {
    pub unionid: Option<String>,
}

impl OAuthState {
    /// `state` arrives URL-encoded base64 of a JSON object.
    pub fn decode(state: &str) -> anyhow::Result<OAuthState> {
        let state = urlencoding::decode(state).context("state is not valid UTF-8")?;
        let raw = STANDARD
            .decode(state.trim().as_bytes())
            .context("state is not valid base64")?;

        Ok(serde_json::from_slice(&raw)?)
    }
}

#[derive(Serialize, Debug)]
struct TokenExchangeRequest<'a> {
    code: &'a str,
    redirect_uri: &'a str,
    grant_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    unionid: Option<String>,
}

#[derive(Deserialize)]
struct TokenExchangeResponse {
    access_token: Option<serde_json::Value>,
}

pub enum TokenExchange {
    Granted,
    MissingAccessToken,
}

pub struct NotionOAuth {
    client: Client,
    url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl NotionOAuth {
    pub fn new(client: Client, settings: &NotionSettings) -> Self {
        NotionOAuth {
            client,
            url: format!(
                "{}/v1/oauth/token",
                settings.api_base_url.trim_end_matches('/')
            ),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            redirect_uri: settings.redirect_uri.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty() && !self.redirect_uri.is_empty()
    }

    fn basic_credentials(&self) -> String {
        STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret))
    }

    pub async fn exchange_code(&self, code: &str, state: &str) -> anyhow::Result<TokenExchange> {
        let state = OAuthState::decode(state)?;
        let body = TokenExchangeRequest {
            code,
            redirect_uri: &self.redirect_uri,
            grant_type: "authorization_code",
            unionid: state.unionid,
        };

        log::info!(
            "[POST]/v1/oauth/token {}",
            serde_json::to_string_pretty(&body)?
        );

        let res = self
            .client
            .post(&self.url)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Basic {}", self.basic_credentials()),
            )
            .json(&body)
            .send()
            .await?;

        let token: TokenExchangeResponse = res
            .json()
            .await
            .map_err(|e| anyhow!("Invalid token response: {}", e))?;

        match token.access_token {
            Some(serde_json::Value::Null) | None => Ok(TokenExchange::MissingAccessToken),
            Some(serde_json::Value::String(s)) if s.is_empty() => {
                Ok(TokenExchange::MissingAccessToken)
            }
            Some(_) => Ok(TokenExchange::Granted),
        }
    }
}
