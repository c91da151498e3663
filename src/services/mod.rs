pub mod content_fetcher;
pub mod error;
pub mod harvest_client;
pub mod notifier;
pub mod notion_oauth;
pub mod rendering_proxy;

pub use content_fetcher::*;
pub use error::*;
pub use harvest_client::*;
pub use notifier::*;
pub use notion_oauth::*;
pub use rendering_proxy::*;
