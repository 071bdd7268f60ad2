// Selected-driver focus shared by the list panel and the map
use super::driver::DriverId;
use super::location::DriverLocationFix;
use std::collections::HashSet;

/// Holds at most one selected driver, always one present in the current fix set.
#[derive(Debug, Clone, Default)]
pub struct SelectionSync {
    present: HashSet<DriverId>,
    current: Option<DriverId>,
}

impl SelectionSync {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<DriverId> {
        self.current
    }

    /// Select a driver. Drivers absent from the current fix set are ignored.
    /// Returns whether the selection changed.
    pub fn select(&mut self, id: DriverId) -> bool {
        if !self.present.contains(&id) {
            tracing::debug!("Ignoring selection of driver {} not in current fix set", id);
            return false;
        }
        self.current.replace(id) != Some(id)
    }

    pub fn clear(&mut self) -> bool {
        self.current.take().is_some()
    }

    /// Track a new fix set. The selection survives only if its driver is still
    /// present. Returns whether the selection was dropped.
    pub fn replace_fix_set(&mut self, fixes: &[DriverLocationFix]) -> bool {
        self.present = fixes.iter().map(|f| f.driver_id).collect();

        match self.current {
            Some(id) if !self.present.contains(&id) => {
                tracing::debug!("Selected driver {} left the fix set, clearing selection", id);
                self.current = None;
                true
            }
            _ => false,
        }
    }
}
