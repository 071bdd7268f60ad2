// Driver detail service - Single-driver location lookup
use crate::application::board_view::{detail_path, MapMarker, MapScene, LOCATION_UNAVAILABLE};
use crate::application::location_source::{FetchError, LocationSource};
use crate::domain::driver::{format_status, status_color, DriverId};
use crate::domain::location::DriverLocationFix;
use crate::domain::viewport::{Viewport, ViewportController};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverDetailView {
    pub driver_id: DriverId,
    pub location_id: i64,
    pub name: String,
    pub license: String,
    pub status: String,
    pub movement_status: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub coordinates: String,
    pub has_valid_coordinates: bool,
    pub last_updated: Option<DateTime<Utc>>,
    pub map: MapScene,
    pub path: String,
}

#[derive(Clone)]
pub struct DriverDetailService {
    source: Arc<dyn LocationSource>,
    controller: ViewportController,
}

impl DriverDetailService {
    pub fn new(source: Arc<dyn LocationSource>, controller: ViewportController) -> Self {
        Self { source, controller }
    }

    /// Look up one driver's fix. Independent of any loaded board.
    pub async fn detail(&self, driver_id: DriverId) -> Result<DriverDetailView, FetchError> {
        let fix = self.source.fetch_one(driver_id).await?;
        Ok(self.render(&fix))
    }

    fn render(&self, fix: &DriverLocationFix) -> DriverDetailView {
        let driver = &fix.driver;
        let or_na = |v: &Option<String>| v.clone().unwrap_or_else(|| "N/A".to_string());
        let coordinate = fix.coordinate();

        let viewport = match coordinate {
            Some(c) => Viewport::centered_on(c, self.controller.settings().focus_zoom),
            None => self.controller.default_viewport(),
        };
        let markers = coordinate
            .map(|c| MapMarker {
                driver_id: fix.driver_id,
                latitude: c.latitude,
                longitude: c.longitude,
                label: driver.display_name(),
                color: status_color(driver.movement_status()),
                selected: true,
            })
            .into_iter()
            .collect();

        DriverDetailView {
            driver_id: fix.driver_id,
            location_id: fix.id,
            name: driver.full_name(),
            license: or_na(&driver.license_number),
            status: or_na(&driver.status),
            movement_status: format_status(driver.movement_status()),
            phone: or_na(&driver.phone),
            email: or_na(&driver.email),
            address: driver.address_line(),
            coordinates: coordinate
                .map(|c| c.format())
                .unwrap_or_else(|| LOCATION_UNAVAILABLE.to_string()),
            has_valid_coordinates: coordinate.is_some(),
            last_updated: fix.captured_at,
            map: MapScene { viewport, markers },
            path: detail_path(fix.driver_id),
        }
    }
}
