// Map viewport derivation
use super::driver::DriverId;
use super::location::{Coordinate, DriverLocationFix};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Viewport {
    pub center_latitude: f64,
    pub center_longitude: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn centered_on(coordinate: Coordinate, zoom: f64) -> Self {
        Self {
            center_latitude: coordinate.latitude,
            center_longitude: coordinate.longitude,
            zoom,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub default_latitude: f64,
    pub default_longitude: f64,
    pub default_zoom: f64,
    pub focus_zoom: f64,
    pub wide_min_zoom: f64,
    pub wide_max_zoom: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        // Central Nigeria
        Self {
            default_latitude: 9.0636288,
            default_longitude: 7.4448896,
            default_zoom: 6.0,
            focus_zoom: 12.0,
            wide_min_zoom: 2.0,
            wide_max_zoom: 8.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidViewportSettings {
    #[error("map.{0} must be finite")]
    NotFinite(&'static str),
    #[error("map.default_latitude {0} is outside -90..=90")]
    LatitudeOutOfRange(f64),
    #[error("map.default_longitude {0} is outside -180..=180")]
    LongitudeOutOfRange(f64),
    #[error("map.wide_min_zoom {min} exceeds map.wide_max_zoom {max}")]
    InvertedWideRange { min: f64, max: f64 },
}

impl ViewportSettings {
    pub fn validate(&self) -> Result<(), InvalidViewportSettings> {
        let fields = [
            ("default_latitude", self.default_latitude),
            ("default_longitude", self.default_longitude),
            ("default_zoom", self.default_zoom),
            ("focus_zoom", self.focus_zoom),
            ("wide_min_zoom", self.wide_min_zoom),
            ("wide_max_zoom", self.wide_max_zoom),
        ];
        if let Some((name, _)) = fields.into_iter().find(|(_, v)| !v.is_finite()) {
            return Err(InvalidViewportSettings::NotFinite(name));
        }
        if !(-90.0..=90.0).contains(&self.default_latitude) {
            return Err(InvalidViewportSettings::LatitudeOutOfRange(self.default_latitude));
        }
        if !(-180.0..=180.0).contains(&self.default_longitude) {
            return Err(InvalidViewportSettings::LongitudeOutOfRange(self.default_longitude));
        }
        if self.wide_min_zoom > self.wide_max_zoom {
            return Err(InvalidViewportSettings::InvertedWideRange {
                min: self.wide_min_zoom,
                max: self.wide_max_zoom,
            });
        }
        Ok(())
    }
}

/// Axis-aligned box enclosing a set of coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
struct Bounds {
    min_lat: f64,
    max_lat: f64,
    min_lon: f64,
    max_lon: f64,
}

impl Bounds {
    fn around(first: Coordinate) -> Self {
        Self {
            min_lat: first.latitude,
            max_lat: first.latitude,
            min_lon: first.longitude,
            max_lon: first.longitude,
        }
    }

    fn extend(&mut self, c: Coordinate) {
        self.min_lat = self.min_lat.min(c.latitude);
        self.max_lat = self.max_lat.max(c.latitude);
        self.min_lon = self.min_lon.min(c.longitude);
        self.max_lon = self.max_lon.max(c.longitude);
    }

    fn center(&self) -> Coordinate {
        Coordinate {
            latitude: (self.min_lat + self.max_lat) / 2.0,
            longitude: (self.min_lon + self.max_lon) / 2.0,
        }
    }

    fn lat_span(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    fn lon_span(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    fn is_point(&self) -> bool {
        self.lat_span() == 0.0 && self.lon_span() == 0.0
    }
}

/// Computes where the map looks. Holds configuration only, so the same
/// inputs always produce the same viewport.
#[derive(Debug, Clone, Copy, Default)]
pub struct ViewportController {
    settings: ViewportSettings,
}

impl ViewportController {
    pub fn new(settings: ViewportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ViewportSettings {
        &self.settings
    }

    pub fn default_viewport(&self) -> Viewport {
        Viewport {
            center_latitude: self.settings.default_latitude,
            center_longitude: self.settings.default_longitude,
            zoom: self.settings.default_zoom,
        }
    }

    pub fn compute(&self, fixes: &[DriverLocationFix], focus: Option<DriverId>) -> Viewport {
        if let Some(focused) = focus.and_then(|id| focused_coordinate(fixes, id)) {
            return Viewport::centered_on(focused, self.settings.focus_zoom);
        }

        let mut valid = fixes.iter().filter_map(DriverLocationFix::coordinate);
        let Some(first) = valid.next() else {
            return self.default_viewport();
        };

        let mut bounds = Bounds::around(first);
        for c in valid {
            bounds.extend(c);
        }

        if bounds.is_point() {
            return Viewport::centered_on(bounds.center(), self.settings.focus_zoom);
        }

        Viewport::centered_on(bounds.center(), self.fit_zoom(&bounds))
    }

    /// Largest whole zoom at which the box still fits a world-sized tile
    /// grid, clamped to the wide range.
    fn fit_zoom(&self, bounds: &Bounds) -> f64 {
        let lon_zoom = if bounds.lon_span() > 0.0 {
            (360.0 / bounds.lon_span()).log2()
        } else {
            f64::INFINITY
        };
        let lat_zoom = if bounds.lat_span() > 0.0 {
            (180.0 / bounds.lat_span()).log2()
        } else {
            f64::INFINITY
        };

        lon_zoom
            .min(lat_zoom)
            .floor()
            .clamp(self.settings.wide_min_zoom, self.settings.wide_max_zoom)
    }
}

fn focused_coordinate(fixes: &[DriverLocationFix], id: DriverId) -> Option<Coordinate> {
    fixes
        .iter()
        .filter(|f| f.driver_id == id)
        .find_map(DriverLocationFix::coordinate)
}
