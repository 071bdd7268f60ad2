// Driver location domain model
use super::driver::{DriverId, DriverSummary};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Value the backend stores in coordinate fields that were never set
pub const PLACEHOLDER: &str = "string";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn range(self) -> (f64, f64) {
        match self {
            Axis::Latitude => (-90.0, 90.0),
            Axis::Longitude => (-180.0, 180.0),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Latitude => f.write_str("latitude"),
            Axis::Longitude => f.write_str("longitude"),
        }
    }
}

/// Why a fix has no usable coordinate. Never fatal: the fix stays listed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidCoordinate {
    #[error("{0} is missing")]
    Missing(Axis),
    #[error("{0} holds the unset placeholder")]
    Placeholder(Axis),
    #[error("{axis} value {raw:?} is not a finite number")]
    Unparseable { axis: Axis, raw: String },
    #[error("{axis} value {value} is out of range")]
    OutOfRange { axis: Axis, value: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Validate a raw latitude/longitude pair as received from the backend.
    /// Both axes must be valid; one bad axis invalidates the pair.
    pub fn from_raw(
        latitude: Option<&Value>,
        longitude: Option<&Value>,
    ) -> Result<Self, InvalidCoordinate> {
        Ok(Self {
            latitude: parse_axis(Axis::Latitude, latitude)?,
            longitude: parse_axis(Axis::Longitude, longitude)?,
        })
    }

    /// "lat, lon" rounded to 4 decimals
    pub fn format(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

fn parse_axis(axis: Axis, raw: Option<&Value>) -> Result<f64, InvalidCoordinate> {
    let value = match raw {
        None | Some(Value::Null) => return Err(InvalidCoordinate::Missing(axis)),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| InvalidCoordinate::Unparseable {
            axis,
            raw: n.to_string(),
        })?,
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(InvalidCoordinate::Missing(axis));
            }
            if trimmed == PLACEHOLDER {
                return Err(InvalidCoordinate::Placeholder(axis));
            }
            trimmed
                .parse::<f64>()
                .map_err(|_| InvalidCoordinate::Unparseable {
                    axis,
                    raw: s.clone(),
                })?
        }
        Some(other) => {
            return Err(InvalidCoordinate::Unparseable {
                axis,
                raw: other.to_string(),
            });
        }
    };

    // "NaN" and "inf" parse as f64
    if !value.is_finite() {
        return Err(InvalidCoordinate::Unparseable {
            axis,
            raw: value.to_string(),
        });
    }

    let (min, max) = axis.range();
    if value < min || value > max {
        return Err(InvalidCoordinate::OutOfRange { axis, value });
    }

    Ok(value)
}

#[derive(Debug, Clone, PartialEq)]
pub enum Position {
    Known(Coordinate),
    Unavailable(InvalidCoordinate),
}

impl Position {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            Position::Known(c) => Some(*c),
            Position::Unavailable(_) => None,
        }
    }
}

impl From<Result<Coordinate, InvalidCoordinate>> for Position {
    fn from(result: Result<Coordinate, InvalidCoordinate>) -> Self {
        match result {
            Ok(c) => Position::Known(c),
            Err(e) => Position::Unavailable(e),
        }
    }
}

/// A single reported GPS position for a driver
#[derive(Debug, Clone, PartialEq)]
pub struct DriverLocationFix {
    pub id: i64,
    pub driver_id: DriverId,
    pub position: Position,
    pub captured_at: Option<DateTime<Utc>>,
    pub driver: DriverSummary,
}

impl DriverLocationFix {
    pub fn coordinate(&self) -> Option<Coordinate> {
        self.position.coordinate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(lat: Value, lon: Value) -> Result<Coordinate, InvalidCoordinate> {
        Coordinate::from_raw(Some(&lat), Some(&lon))
    }

    #[test]
    fn test_accepts_strings_and_numbers() {
        let c = parse(json!("9.0578"), json!(7.4951)).unwrap();
        assert_eq!(c.latitude, 9.0578);
        assert_eq!(c.longitude, 7.4951);

        let c = parse(json!(" -33.5 "), json!("151.2")).unwrap();
        assert_eq!(c.latitude, -33.5);
    }

    #[test]
    fn test_placeholder_is_not_data() {
        assert_eq!(
            parse(json!("string"), json!("string")),
            Err(InvalidCoordinate::Placeholder(Axis::Latitude))
        );
        assert_eq!(
            parse(json!("9.0"), json!("string")),
            Err(InvalidCoordinate::Placeholder(Axis::Longitude))
        );
    }

    #[test]
    fn test_missing_and_empty() {
        assert_eq!(
            Coordinate::from_raw(None, Some(&json!("7.0"))),
            Err(InvalidCoordinate::Missing(Axis::Latitude))
        );
        assert_eq!(
            parse(json!("9.0"), json!("")),
            Err(InvalidCoordinate::Missing(Axis::Longitude))
        );
        assert_eq!(
            parse(Value::Null, json!("7.0")),
            Err(InvalidCoordinate::Missing(Axis::Latitude))
        );
    }

    #[test]
    fn test_rejects_garbage_and_non_finite() {
        assert!(matches!(
            parse(json!("12abc"), json!("7.0")),
            Err(InvalidCoordinate::Unparseable { axis: Axis::Latitude, .. })
        ));
        assert!(matches!(
            parse(json!("NaN"), json!("7.0")),
            Err(InvalidCoordinate::Unparseable { .. })
        ));
        assert!(matches!(
            parse(json!("9.0"), json!("inf")),
            Err(InvalidCoordinate::Unparseable { axis: Axis::Longitude, .. })
        ));
        assert!(matches!(
            parse(json!(true), json!("7.0")),
            Err(InvalidCoordinate::Unparseable { .. })
        ));
    }

    #[test]
    fn test_range_limits() {
        assert!(parse(json!(90), json!(-180)).is_ok());
        assert!(matches!(
            parse(json!("90.5"), json!("0")),
            Err(InvalidCoordinate::OutOfRange { axis: Axis::Latitude, .. })
        ));
        assert!(matches!(
            parse(json!("0"), json!(180.01)),
            Err(InvalidCoordinate::OutOfRange { axis: Axis::Longitude, .. })
        ));
    }

    #[test]
    fn test_format() {
        let c = Coordinate {
            latitude: 9.057851,
            longitude: 7.49508,
        };
        assert_eq!(c.format(), "9.0579, 7.4951");
    }
}
