use serde::{Deserialize, Serialize};

use crate::services::ReaderError;

/// A validated request: both fields present, `page_url` already decoded.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchRequest {
    pub page_url: String,
    pub authorization: String,
}

impl FetchRequest {
    pub fn parse(
        page_url: Option<&str>,
        authorization: Option<&str>,
    ) -> Result<FetchRequest, ReaderError> {
        let page_url = page_url
            .filter(|u| !u.is_empty())
            .ok_or(ReaderError::Validation("page_url is required."))?;
        let authorization = authorization
            .filter(|a| !a.is_empty())
            .ok_or(ReaderError::Validation("authorization is required."))?;

        let page_url = urlencoding::decode(page_url)
            .map_err(|_| ReaderError::Validation("page_url is not a valid encoded URL."))?;

        Ok(FetchRequest {
            page_url: page_url.into_owned(),
            authorization: authorization.to_string(),
        })
    }
}

#[derive(Debug)]
pub enum AttemptOutcome {
    Success(String),
    /// `None` when the proxy answered with an empty body.
    TransientError(Option<ReaderError>),
    TerminalError(ReaderError),
}

/// One try against the rendering proxy. Only lives for the request.
#[derive(Debug)]
pub struct FetchAttempt {
    pub number: u32,
    pub outcome: AttemptOutcome,
}

#[derive(Debug, Serialize)]
pub struct SavePageRequest {
    pub async_save: bool,
    pub page_url: String,
    pub page_html: String,
}

impl SavePageRequest {
    pub fn new(page_url: String, page_html: String) -> Self {
        SavePageRequest {
            async_save: true,
            page_url,
            page_html,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchOutcome {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FetchOutcome {
    pub fn success(data: serde_json::Value) -> Self {
        FetchOutcome {
            ok: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        FetchOutcome {
            ok: false,
            data: None,
            message: Some(message.into()),
        }
    }
}

impl From<ReaderError> for FetchOutcome {
    fn from(value: ReaderError) -> Self {
        FetchOutcome::failure(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_page_url_is_checked_first() {
        let err = FetchRequest::parse(None, None).unwrap_err();
        assert_eq!(err.to_string(), "page_url is required.");

        let err = FetchRequest::parse(Some(""), Some("Bearer t")).unwrap_err();
        assert_eq!(err.to_string(), "page_url is required.");
    }

    #[test]
    fn missing_authorization_is_rejected() {
        let err = FetchRequest::parse(Some("https://mp.weixin.qq.com/s/abc"), None).unwrap_err();
        assert_eq!(err.to_string(), "authorization is required.");
    }

    #[test]
    fn page_url_is_percent_decoded() {
        let request = FetchRequest::parse(
            Some("https%3A%2F%2Fmp.weixin.qq.com%2Fs%3F__biz%3Dx%26mid%3D1+2"),
            Some("Bearer t"),
        )
        .unwrap();

        assert_eq!(request.page_url, "https://mp.weixin.qq.com/s?__biz=x&mid=1+2");
        assert_eq!(request.authorization, "Bearer t");
    }

    #[test]
    fn outcome_omits_absent_fields() {
        let failure = serde_json::to_value(FetchOutcome::failure("page is empty.")).unwrap();
        assert_eq!(
            failure,
            serde_json::json!({ "ok": false, "message": "page is empty." })
        );

        let success =
            serde_json::to_value(FetchOutcome::success(serde_json::json!({ "id": 1 }))).unwrap();
        assert_eq!(success, serde_json::json!({ "ok": true, "data": { "id": 1 } }));
    }
}
