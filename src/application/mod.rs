// Application layer - Use cases over the location source
pub mod board_service;
pub mod board_view;
pub mod driver_detail;
pub mod location_board;
pub mod location_source;
