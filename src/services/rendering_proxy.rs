use async_trait::async_trait;
use reqwest::Client;

use super::ReaderError;

#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn fetch_rendered_page(&self, page_url: &str) -> Result<String, ReaderError>;
}

/// Client for a rendering proxy that takes the target URL as its path,
/// e.g. `https://r.jina.ai/https://mp.weixin.qq.com/s/...`.
pub struct RenderingProxy {
    client: Client,
    base_url: String,
    wait_for_selector: String,
}

impl RenderingProxy {
    pub fn new(client: Client, base_url: &str, wait_for_selector: &str) -> Self {
        RenderingProxy {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            wait_for_selector: wait_for_selector.to_string(),
        }
    }
}

#[async_trait]
impl PageRenderer for RenderingProxy {
    async fn fetch_rendered_page(&self, page_url: &str) -> Result<String, ReaderError> {
        let res = self
            .client
            .get(format!("{}/{}", self.base_url, page_url))
            .header("X-Respond-With", "html")
            .header("X-Wait-For-Selector", &self.wait_for_selector)
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            return Err(ReaderError::Transport(format!(
                "rendering proxy answered with status {}",
                status.as_u16()
            )));
        }

        Ok(res.text().await?)
    }
}
