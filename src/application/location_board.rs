// Location board - Fetch lifecycle, selection and viewport for the driver map
use crate::application::board_view::BoardView;
use crate::application::location_source::FetchError;
use crate::domain::driver::DriverId;
use crate::domain::location::DriverLocationFix;
use crate::domain::selection::SelectionSync;
use crate::domain::viewport::{Viewport, ViewportController};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoardPhase {
    /// First fetch in flight, nothing to show yet
    Loading,
    Ready,
    /// Re-fetch in flight, previous fix set still shown
    Refreshing,
    /// Last fetch failed; any previously loaded fix set is kept
    Error,
}

/// Identifies one initiated fetch. Only the most recently issued ticket may
/// be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    /// A newer fetch was initiated after this one
    Superseded,
    /// The board was unmounted before the fetch landed
    Unmounted,
}

/// Event-driven state machine behind the driver location view. It performs no
/// I/O: callers start fetches for the tickets it hands out and feed the
/// results back through [`LocationBoard::complete`].
#[derive(Debug)]
pub struct LocationBoard {
    controller: ViewportController,
    phase: BoardPhase,
    fixes: Option<Vec<DriverLocationFix>>,
    selection: SelectionSync,
    viewport: Viewport,
    last_error: Option<FetchError>,
    issued: u64,
    in_flight: Option<FetchTicket>,
    mounted: bool,
}

impl LocationBoard {
    pub fn new(controller: ViewportController) -> Self {
        Self {
            viewport: controller.default_viewport(),
            controller,
            phase: BoardPhase::Loading,
            fixes: None,
            selection: SelectionSync::new(),
            last_error: None,
            issued: 0,
            in_flight: None,
            mounted: false,
        }
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    /// Last successfully fetched fix set, empty before the first success
    pub fn fixes(&self) -> &[DriverLocationFix] {
        self.fixes.as_deref().unwrap_or_default()
    }

    pub fn has_data(&self) -> bool {
        self.fixes.is_some()
    }

    pub fn selected(&self) -> Option<DriverId> {
        self.selection.current()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// List and map accept clicks once a fix set has been loaded
    pub fn is_interactive(&self) -> bool {
        self.mounted && self.phase != BoardPhase::Loading && self.has_data()
    }

    pub fn mount(&mut self) -> FetchTicket {
        self.mounted = true;
        self.phase = BoardPhase::Loading;
        tracing::info!("Location board mounted, loading driver locations");
        self.issue()
    }

    /// Start a re-fetch. A fetch already in flight is superseded: its result
    /// will be discarded when it lands. Returns `None` when unmounted.
    pub fn request_refresh(&mut self) -> Option<FetchTicket> {
        if !self.mounted {
            return None;
        }

        if let Some(pending) = self.in_flight {
            tracing::debug!("Refresh supersedes pending fetch {:?}", pending);
        }

        self.phase = match self.phase {
            BoardPhase::Loading => BoardPhase::Loading,
            BoardPhase::Ready | BoardPhase::Refreshing => BoardPhase::Refreshing,
            BoardPhase::Error if self.has_data() => BoardPhase::Refreshing,
            BoardPhase::Error => BoardPhase::Loading,
        };

        Some(self.issue())
    }

    fn issue(&mut self) -> FetchTicket {
        self.issued += 1;
        let ticket = FetchTicket(self.issued);
        self.in_flight = Some(ticket);
        ticket
    }

    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<DriverLocationFix>, FetchError>,
    ) -> Completion {
        if !self.mounted {
            tracing::debug!("Dropping fetch {:?} completed after unmount", ticket);
            return Completion::Unmounted;
        }
        if self.in_flight != Some(ticket) {
            tracing::warn!("Discarding stale fetch {:?}", ticket);
            return Completion::Superseded;
        }
        self.in_flight = None;

        match result {
            Ok(fixes) => {
                let mapped = fixes.iter().filter(|f| f.coordinate().is_some()).count();
                tracing::info!(
                    "Loaded {} driver locations ({} with valid coordinates)",
                    fixes.len(),
                    mapped
                );
                self.selection.replace_fix_set(&fixes);
                self.fixes = Some(fixes);
                self.last_error = None;
                self.phase = BoardPhase::Ready;
                self.recompute_viewport();
            }
            Err(e) => {
                if self.has_data() {
                    tracing::error!("Refresh failed, keeping previous driver locations: {}", e);
                } else {
                    tracing::error!("Failed to load driver locations: {}", e);
                }
                self.last_error = Some(e);
                self.phase = BoardPhase::Error;
            }
        }

        Completion::Applied
    }

    /// Suppress every completion that lands from now on
    pub fn unmount(&mut self) {
        self.mounted = false;
        self.in_flight = None;
        tracing::info!("Location board unmounted");
    }

    /// Select a driver from a list row or a map marker. Returns whether the
    /// selection changed.
    pub fn select(&mut self, id: DriverId) -> bool {
        if !self.is_interactive() {
            return false;
        }
        let changed = self.selection.select(id);
        if changed {
            self.recompute_viewport();
        }
        changed
    }

    pub fn clear_selection(&mut self) -> bool {
        if !self.is_interactive() {
            return false;
        }
        let changed = self.selection.clear();
        if changed {
            self.recompute_viewport();
        }
        changed
    }

    fn recompute_viewport(&mut self) {
        self.viewport = self
            .controller
            .compute(self.fixes(), self.selection.current());
    }

    pub fn view(&self) -> BoardView {
        BoardView::render(self)
    }
}
