// Backend payload decoding - the only place raw location JSON is accepted
use crate::application::location_source::FetchError;
use crate::domain::driver::{DriverId, DriverSummary};
use crate::domain::location::{Coordinate, DriverLocationFix, Position};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// `{ success, message, data, metadata }` envelope used by every endpoint
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: Option<bool>,
    #[serde(default)]
    message: Option<String>,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct RawDriverLocation {
    id: i64,
    driver_id: i64,
    #[serde(default)]
    latitude: Option<Value>,
    #[serde(default)]
    longitude: Option<Value>,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
    #[serde(default)]
    driver: Option<RawDriver>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDriver {
    first_name: Option<String>,
    last_name: Option<String>,
    other_name: Option<String>,
    license_number: Option<String>,
    status: Option<String>,
    movement_status: Option<String>,
    #[serde(default)]
    user: Option<RawUser>,
}

#[derive(Debug, Default, Deserialize)]
struct RawUser {
    phone_number: Option<String>,
    email: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// Decode the list endpoint body
pub fn decode_fix_list(body: &[u8]) -> Result<Vec<DriverLocationFix>, FetchError> {
    let data: Vec<RawDriverLocation> = open_envelope(body)?.ok_or_else(|| {
        FetchError::MalformedResponse("response has no data array".to_string())
    })?;

    Ok(data.into_iter().map(into_fix).collect())
}

/// Decode the single-fix endpoint body. A null `data` means no such driver.
pub fn decode_single_fix(
    body: &[u8],
    driver_id: DriverId,
) -> Result<DriverLocationFix, FetchError> {
    open_envelope::<RawDriverLocation>(body)?
        .map(into_fix)
        .ok_or(FetchError::NotFound(driver_id))
}

fn open_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, FetchError> {
    let envelope: Envelope<T> = serde_json::from_slice(body)
        .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;

    match envelope.success {
        Some(true) => Ok(envelope.data),
        Some(false) => Err(FetchError::MalformedResponse(format!(
            "backend reported failure: {}",
            envelope.message.unwrap_or_default()
        ))),
        None => Err(FetchError::MalformedResponse(
            "response has no success flag".to_string(),
        )),
    }
}

fn into_fix(raw: RawDriverLocation) -> DriverLocationFix {
    let position: Position =
        Coordinate::from_raw(raw.latitude.as_ref(), raw.longitude.as_ref()).into();
    if let Position::Unavailable(reason) = &position {
        tracing::debug!(
            "Location {} of driver {} has no usable coordinate: {}",
            raw.id,
            raw.driver_id,
            reason
        );
    }

    let captured_at = raw
        .updated_at
        .as_deref()
        .or(raw.created_at.as_deref())
        .and_then(parse_timestamp);

    let driver = raw.driver.unwrap_or_default();
    let user = driver.user.unwrap_or_default();

    DriverLocationFix {
        id: raw.id,
        driver_id: DriverId(raw.driver_id),
        position,
        captured_at,
        driver: DriverSummary {
            first_name: driver.first_name,
            last_name: driver.last_name,
            other_name: driver.other_name,
            license_number: driver.license_number,
            status: driver.status,
            movement_status: driver.movement_status,
            phone: user.phone_number,
            email: user.email,
            address: user.address,
            city: user.city,
            state: user.state,
            country: user.country,
        },
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => Some(t.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!("Ignoring unparseable timestamp {:?}: {}", raw, e);
            None
        }
    }
}
