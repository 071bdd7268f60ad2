// Presentation layer - HTTP surface over the board and detail services
pub mod app_state;
pub mod handlers;
