// Board service - Runs the location board against a location source
use crate::application::board_view::BoardView;
use crate::application::location_board::{Completion, FetchTicket, LocationBoard};
use crate::application::location_source::{FetchError, LocationSource};
use crate::domain::driver::DriverId;
use crate::domain::location::DriverLocationFix;
use crate::domain::viewport::ViewportController;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

struct BoardCell {
    board: LocationBoard,
    pending: Option<JoinHandle<()>>,
}

/// Owns one board. Every state change goes through the cell lock and is then
/// published to view subscribers.
#[derive(Clone)]
pub struct BoardService {
    source: Arc<dyn LocationSource>,
    cell: Arc<Mutex<BoardCell>>,
    views: Arc<watch::Sender<BoardView>>,
}

impl BoardService {
    pub fn new(source: Arc<dyn LocationSource>, controller: ViewportController) -> Self {
        let board = LocationBoard::new(controller);
        let (views, _) = watch::channel(board.view());

        Self {
            source,
            cell: Arc::new(Mutex::new(BoardCell {
                board,
                pending: None,
            })),
            views: Arc::new(views),
        }
    }

    /// Start the initial fetch
    pub async fn mount(&self) -> BoardView {
        let mut cell = self.cell.lock().await;
        let ticket = cell.board.mount();
        self.start_fetch(&mut cell, ticket);
        self.publish(&cell.board)
    }

    /// Start a re-fetch, cancelling any fetch still in flight
    pub async fn refresh(&self) -> BoardView {
        let mut cell = self.cell.lock().await;
        if let Some(ticket) = cell.board.request_refresh() {
            self.start_fetch(&mut cell, ticket);
        }
        self.publish(&cell.board)
    }

    pub async fn select(&self, driver_id: DriverId) -> BoardView {
        let mut cell = self.cell.lock().await;
        if cell.board.select(driver_id) {
            tracing::debug!("Selected driver {}", driver_id);
        }
        self.publish(&cell.board)
    }

    pub async fn clear_selection(&self) -> BoardView {
        let mut cell = self.cell.lock().await;
        cell.board.clear_selection();
        self.publish(&cell.board)
    }

    pub async fn unmount(&self) {
        let mut cell = self.cell.lock().await;
        if let Some(handle) = cell.pending.take() {
            handle.abort();
        }
        cell.board.unmount();
        self.publish(&cell.board);
    }

    pub async fn view(&self) -> BoardView {
        self.cell.lock().await.board.view()
    }

    pub fn subscribe(&self) -> watch::Receiver<BoardView> {
        self.views.subscribe()
    }

    /// Refresh every `period` until the returned task is aborted. Ticks that
    /// land while a fetch is still in flight are skipped.
    pub fn spawn_auto_refresh(&self, period: Duration) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // First tick fires immediately; the mount already fetched
            interval.tick().await;

            loop {
                interval.tick().await;
                service.refresh_when_idle().await;
            }
        })
    }

    async fn refresh_when_idle(&self) {
        let mut cell = self.cell.lock().await;
        if cell.pending.as_ref().is_some_and(|h| !h.is_finished()) {
            tracing::debug!("Auto refresh tick skipped, fetch still in flight");
            return;
        }

        tracing::debug!("Auto refresh tick");
        if let Some(ticket) = cell.board.request_refresh() {
            self.start_fetch(&mut cell, ticket);
        }
        self.publish(&cell.board);
    }

    fn start_fetch(&self, cell: &mut BoardCell, ticket: FetchTicket) {
        if let Some(previous) = cell.pending.take() {
            previous.abort();
        }

        let service = self.clone();
        cell.pending = Some(tokio::spawn(async move {
            let result = service.source.fetch_all().await;
            service.finish(ticket, result).await;
        }));
    }

    async fn finish(
        &self,
        ticket: FetchTicket,
        result: Result<Vec<DriverLocationFix>, FetchError>,
    ) {
        let mut cell = self.cell.lock().await;
        if cell.board.complete(ticket, result) == Completion::Applied {
            cell.pending = None;
            self.publish(&cell.board);
        }
    }

    fn publish(&self, board: &LocationBoard) -> BoardView {
        let view = board.view();
        self.views.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view.clone();
                true
            }
        });
        view
    }
}
