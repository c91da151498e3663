use std::{sync::Arc, time::Duration};

use crate::domain::{
    content_signature::SignatureChecklist,
    fetch::{AttemptOutcome, FetchAttempt, FetchOutcome, FetchRequest, SavePageRequest},
};

use super::{ErrorContext, ErrorReporter, PageRenderer, PageSaver, ReaderError};

pub const READER_ROUTE: &str = "/api/reader";
const EMPTY_PAGE_MESSAGE: &str = "page is empty.";

enum FetchFailure {
    /// Every attempt failed; carries the message shown to the caller.
    Exhausted(String),
    Unexpected(ReaderError),
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32, // Should be > 0
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            backoff_step: Duration::from_millis(800),
        }
    }
}

impl RetryPolicy {
    /// Linear: attempt 2 waits 2 steps, attempt 3 waits 3 steps.
    pub fn delay_before(&self, attempt: u32) -> Duration {
        match attempt {
            0 | 1 => Duration::ZERO,
            n => self.backoff_step * n,
        }
    }
}

pub struct ContentFetcher {
    renderer: Arc<dyn PageRenderer>,
    saver: Arc<dyn PageSaver>,
    reporter: Arc<dyn ErrorReporter>,
    checklist: SignatureChecklist,
    policy: RetryPolicy,
}

impl ContentFetcher {
    pub fn new(
        renderer: Arc<dyn PageRenderer>,
        saver: Arc<dyn PageSaver>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        ContentFetcher {
            renderer,
            saver,
            reporter,
            checklist: SignatureChecklist::default(),
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_checklist(mut self, checklist: SignatureChecklist) -> Self {
        self.checklist = checklist;
        self
    }

    /// Validates, fetches with retries, then hands the page to the save
    /// endpoint. Every failure ends up as `ok: false`.
    pub async fn fetch_and_save(
        &self,
        page_url: Option<&str>,
        authorization: Option<&str>,
    ) -> FetchOutcome {
        let request = match FetchRequest::parse(page_url, authorization) {
            Ok(request) => request,
            Err(e) => return e.into(),
        };

        let page_html = match self.fetch_page(&request.page_url).await {
            Ok(page_html) => page_html,
            Err(FetchFailure::Exhausted(message)) => return FetchOutcome::failure(message),
            Err(FetchFailure::Unexpected(e)) => return self.unexpected(e, &request),
        };

        let save_request = SavePageRequest::new(request.page_url.clone(), page_html);
        match self
            .saver
            .save_parsed_page(&save_request, &request.authorization)
            .await
        {
            Ok(data) => FetchOutcome::success(data),
            Err(e) => self.unexpected(e, &request),
        }
    }

    fn unexpected(&self, error: ReaderError, request: &FetchRequest) -> FetchOutcome {
        self.reporter.report_error(
            &error,
            ErrorContext::for_route(
                READER_ROUTE,
                serde_json::json!({ "page_url": request.page_url }),
            ),
        );
        error.into()
    }

    /// Attempts run one after another, never concurrently.
    async fn fetch_page(&self, page_url: &str) -> Result<String, FetchFailure> {
        let mut last_error: Option<ReaderError> = None;

        for number in 1..=self.policy.max_attempts {
            let delay = self.policy.delay_before(number);
            if !delay.is_zero() {
                log::info!("Waiting {:?} before attempt {} for {}", delay, number, page_url);
                tokio::time::sleep(delay).await;
            }

            let attempt = self.attempt(number, page_url).await;
            match attempt.outcome {
                AttemptOutcome::Success(page_html) => {
                    log::info!("Fetched {} on attempt {}", page_url, attempt.number);
                    return Ok(page_html);
                }
                AttemptOutcome::TransientError(Some(e)) => {
                    log::error!(
                        "Attempt {} for {} failed: {}",
                        attempt.number,
                        page_url,
                        e
                    );
                    last_error = Some(e);
                }
                AttemptOutcome::TransientError(None) => {
                    log::error!(
                        "Attempt {} for {} returned an empty page",
                        attempt.number,
                        page_url
                    );
                }
                AttemptOutcome::TerminalError(e) => {
                    log::error!(
                        "Attempt {} for {} failed terminally: {}",
                        attempt.number,
                        page_url,
                        e
                    );
                    return Err(FetchFailure::Unexpected(e));
                }
            }
        }

        Err(FetchFailure::Exhausted(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| EMPTY_PAGE_MESSAGE.to_string()),
        ))
    }

    async fn attempt(&self, number: u32, page_url: &str) -> FetchAttempt {
        let outcome = match self.renderer.fetch_rendered_page(page_url).await {
            Ok(page_html) if page_html.is_empty() => AttemptOutcome::TransientError(None),
            Ok(page_html) => match self.checklist.classify(&page_html) {
                Some(kind) => {
                    AttemptOutcome::TransientError(Some(ReaderError::ContentSignature(kind)))
                }
                None => AttemptOutcome::Success(page_html),
            },
            Err(e) if e.is_retryable() => AttemptOutcome::TransientError(Some(e)),
            Err(e) => AttemptOutcome::TerminalError(e),
        };

        FetchAttempt { number, outcome }
    }
}
