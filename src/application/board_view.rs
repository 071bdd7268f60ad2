// Render model for the location board: list rows, map scene, selected panel
use crate::application::location_board::{BoardPhase, LocationBoard};
use crate::domain::driver::{format_status, status_color, DriverId};
use crate::domain::location::DriverLocationFix;
use crate::domain::viewport::Viewport;
use serde::Serialize;

pub const LOCATION_UNAVAILABLE: &str = "location unavailable";

/// Route of the single-driver detail view
pub fn detail_path(driver_id: DriverId) -> String {
    format!("/dashboard/movement/{}", driver_id)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListRow {
    pub fix_id: i64,
    pub driver_id: DriverId,
    pub name: String,
    pub status: String,
    pub status_label: String,
    pub place: String,
    pub location_available: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub driver_id: DriverId,
    pub latitude: f64,
    pub longitude: f64,
    pub label: String,
    pub color: &'static str,
    pub selected: bool,
}

/// Everything a map surface needs: where to look and what to pin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapScene {
    pub viewport: Viewport,
    pub markers: Vec<MapMarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedDriver {
    pub driver_id: DriverId,
    pub name: String,
    pub status_label: String,
    pub license: String,
    pub phone: String,
    pub email: String,
    pub place: String,
    pub coordinates: String,
    pub detail_path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoardView {
    pub mounted: bool,
    pub phase: BoardPhase,
    pub interactive: bool,
    pub total_drivers: usize,
    pub rows: Vec<ListRow>,
    pub map: MapScene,
    pub selected: Option<SelectedDriver>,
    pub error: Option<String>,
}

impl BoardView {
    pub fn render(board: &LocationBoard) -> Self {
        let fixes = board.fixes();
        let selected_id = board.selected();
        let is_selected = |f: &DriverLocationFix| Some(f.driver_id) == selected_id;

        let rows = fixes
            .iter()
            .map(|f| ListRow {
                fix_id: f.id,
                driver_id: f.driver_id,
                name: f.driver.display_name(),
                status: f.driver.movement_status().to_string(),
                status_label: format_status(f.driver.movement_status()),
                place: f.driver.place(),
                location_available: f.coordinate().is_some(),
                selected: is_selected(f),
            })
            .collect();

        let markers = fixes
            .iter()
            .filter_map(|f| {
                f.coordinate().map(|c| MapMarker {
                    driver_id: f.driver_id,
                    latitude: c.latitude,
                    longitude: c.longitude,
                    label: f.driver.display_name(),
                    color: status_color(f.driver.movement_status()),
                    selected: is_selected(f),
                })
            })
            .collect();

        let selected = selected_id
            .and_then(|id| fixes.iter().find(|f| f.driver_id == id))
            .map(selected_panel);

        Self {
            mounted: board.is_mounted(),
            phase: board.phase(),
            interactive: board.is_interactive(),
            total_drivers: fixes.len(),
            rows,
            map: MapScene {
                viewport: board.viewport(),
                markers,
            },
            selected,
            error: board.last_error().map(ToString::to_string),
        }
    }
}

fn selected_panel(fix: &DriverLocationFix) -> SelectedDriver {
    let driver = &fix.driver;
    let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());

    SelectedDriver {
        driver_id: fix.driver_id,
        name: driver.display_name(),
        status_label: format_status(driver.movement_status()),
        license: or_na(&driver.license_number),
        phone: or_na(&driver.phone),
        email: or_na(&driver.email),
        place: driver.place(),
        coordinates: fix
            .coordinate()
            .map(|c| c.format())
            .unwrap_or_else(|| LOCATION_UNAVAILABLE.to_string()),
        detail_path: detail_path(fix.driver_id),
    }
}
