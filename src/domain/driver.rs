// Driver domain model
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverId(pub i64);

impl fmt::Display for DriverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Driver details attached to a location fix. Every field is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverSummary {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub other_name: Option<String>,
    pub license_number: Option<String>,
    pub status: Option<String>,
    pub movement_status: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

impl DriverSummary {
    /// "First Last", used for list rows and marker labels
    pub fn display_name(&self) -> String {
        join_present([self.first_name.as_deref(), self.last_name.as_deref()], " ")
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// "First Other Last", used on the detail view
    pub fn full_name(&self) -> String {
        join_present(
            [
                self.first_name.as_deref(),
                self.other_name.as_deref(),
                self.last_name.as_deref(),
            ],
            " ",
        )
        .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn place(&self) -> String {
        join_present([self.city.as_deref(), self.state.as_deref()], ", ")
            .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn address_line(&self) -> String {
        join_present(
            [
                self.address.as_deref(),
                self.city.as_deref(),
                self.state.as_deref(),
                self.country.as_deref(),
            ],
            ", ",
        )
        .unwrap_or_else(|| "N/A".to_string())
    }

    pub fn movement_status(&self) -> &str {
        self.movement_status.as_deref().unwrap_or("unknown")
    }
}

fn join_present<const N: usize>(parts: [Option<&str>; N], sep: &str) -> Option<String> {
    let present: Vec<&str> = parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if present.is_empty() {
        None
    } else {
        Some(present.join(sep))
    }
}

/// Convert "on_duty" to "On Duty"
pub fn format_status(status: &str) -> String {
    status
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Marker fill color for a movement status
pub fn status_color(status: &str) -> &'static str {
    match status {
        "moving" => "#22c55e",
        "pending" => "#eab308",
        "delivered" => "#ef4444",
        _ => "#6b7280",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_status() {
        assert_eq!(format_status("on_duty"), "On Duty");
        assert_eq!(format_status("moving"), "Moving");
        assert_eq!(format_status(""), "");
    }

    #[test]
    fn test_status_color() {
        assert_eq!(status_color("moving"), "#22c55e");
        assert_eq!(status_color("delivered"), "#ef4444");
        assert_eq!(status_color("parked"), "#6b7280");
    }

    #[test]
    fn test_names_skip_missing_parts() {
        let driver = DriverSummary {
            first_name: Some("Ada".to_string()),
            last_name: Some("Obi".to_string()),
            other_name: Some("  ".to_string()),
            city: Some("Abuja".to_string()),
            ..Default::default()
        };

        assert_eq!(driver.display_name(), "Ada Obi");
        assert_eq!(driver.full_name(), "Ada Obi");
        assert_eq!(driver.place(), "Abuja");
        assert_eq!(DriverSummary::default().display_name(), "N/A");
    }
}
