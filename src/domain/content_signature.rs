use scraper::{Html, Selector};

/// Closed set of ways a rendered page can look fine at the HTTP level while
/// carrying no real content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentErrorKind {
    VerificationRequired,
    PageNotLoaded,
}

impl ContentErrorKind {
    pub fn message(&self) -> &'static str {
        match self {
            ContentErrorKind::VerificationRequired => "Weixin verification is required.",
            ContentErrorKind::PageNotLoaded => "Weixin page is not fully loaded.",
        }
    }
}

pub trait ContentSignature: Send + Sync {
    /// Returns the error kind when `page_html` carries this signature.
    fn detect(&self, page_html: &str) -> Option<ContentErrorKind>;
}

/// Upstream throttling page.
pub struct RateLimitSignature {
    pub marker: String,
}

impl Default for RateLimitSignature {
    fn default() -> Self {
        RateLimitSignature {
            marker: "Refreshing too often".to_string(),
        }
    }
}

impl ContentSignature for RateLimitSignature {
    fn detect(&self, page_html: &str) -> Option<ContentErrorKind> {
        page_html
            .contains(&self.marker)
            .then_some(ContentErrorKind::VerificationRequired)
    }
}

/// Page whose `<title>` is empty or still the platform placeholder.
pub struct PlaceholderTitleSignature {
    pub placeholder_titles: Vec<String>,
}

impl Default for PlaceholderTitleSignature {
    fn default() -> Self {
        PlaceholderTitleSignature {
            placeholder_titles: vec!["Weixin Official Accounts Platform".to_string()],
        }
    }
}

impl ContentSignature for PlaceholderTitleSignature {
    fn detect(&self, page_html: &str) -> Option<ContentErrorKind> {
        let title_selector = Selector::parse("title").ok()?;
        let document = Html::parse_document(page_html);
        let title: String = document.select(&title_selector).next()?.text().collect();
        let title = title.trim();

        match title.is_empty() || self.placeholder_titles.iter().any(|t| t == title) {
            true => Some(ContentErrorKind::PageNotLoaded),
            false => None,
        }
    }
}

/// Ordered list of signatures; the first one that matches decides the kind.
pub struct SignatureChecklist {
    signatures: Vec<Box<dyn ContentSignature>>,
}

impl Default for SignatureChecklist {
    fn default() -> Self {
        SignatureChecklist::new()
            .with(RateLimitSignature::default())
            .with(PlaceholderTitleSignature::default())
    }
}

impl SignatureChecklist {
    pub fn new() -> Self {
        SignatureChecklist { signatures: vec![] }
    }

    pub fn with(mut self, signature: impl ContentSignature + 'static) -> Self {
        self.signatures.push(Box::new(signature));
        self
    }

    pub fn classify(&self, page_html: &str) -> Option<ContentErrorKind> {
        if page_html.is_empty() {
            return None;
        }

        self.signatures.iter().find_map(|s| s.detect(page_html))
    }
}
