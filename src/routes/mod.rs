pub mod default_route;
pub mod notion_route;
pub mod reader_route;
