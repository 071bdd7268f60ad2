// Application state for HTTP handlers
use crate::application::board_service::BoardService;
use crate::application::driver_detail::DriverDetailService;
use crate::infrastructure::session::Session;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub board_service: BoardService,
    pub detail_service: DriverDetailService,
    pub session: Arc<Session>,
}
