pub mod content_signature;
pub mod fetch;
