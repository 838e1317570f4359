//! Session-wide set of reported source locations (first report wins)

use crate::shared::models::SourceLocation;
use dashmap::DashSet;

#[derive(Debug, Default)]
pub struct ReportedLocations {
    locations: DashSet<SourceLocation>,
}

impl ReportedLocations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomic insert-if-absent; `true` if this call claimed the location
    pub fn try_claim(&self, location: &SourceLocation) -> bool {
        self.locations.insert(location.clone())
    }

    pub fn contains(&self, location: &SourceLocation) -> bool {
        self.locations.contains(location)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}
