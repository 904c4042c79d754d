//! Per-country source priorities.
//!
//! Attribute conflicts during a merge are resolved by preferring sources in
//! a fixed order. The order differs between scalar attributes and
//! geometry: scalar values trust the national government registry first,
//! while coordinates trust OpenStreetMap first because its point precision
//! is the most reliable of the three. The two lists are intentionally
//! distinct; do not unify them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VoltgridError};

/// Source name for OpenChargeMap records.
pub const SOURCE_OCM: &str = "OCM";
/// Source name for OpenStreetMap records.
pub const SOURCE_OSM: &str = "OSM";

/// Explicit mapping from country code to its government data source.
///
/// A country may be known without having a government source (e.g. Italy);
/// its scalar resolution then falls through directly to OCM and OSM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePriorities {
    government: BTreeMap<String, Option<String>>,
}

impl Default for SourcePriorities {
    fn default() -> Self {
        let mut government = BTreeMap::new();
        government.insert("DE".to_string(), Some("BNA".to_string()));
        government.insert("FR".to_string(), Some("FRGOV".to_string()));
        government.insert("GB".to_string(), Some("GBGOV".to_string()));
        // No government source for Italy so far
        government.insert("IT".to_string(), None);
        government.insert("NOR".to_string(), Some("NOBIL".to_string()));
        government.insert("SWE".to_string(), Some("NOBIL".to_string()));
        Self { government }
    }
}

impl SourcePriorities {
    /// Register or override a country's government source. `None` marks the
    /// country as known without a government registry.
    pub fn set_government_source(&mut self, country_code: &str, source: Option<String>) {
        self.government.insert(country_code.to_string(), source);
    }

    pub fn is_known_country(&self, country_code: &str) -> bool {
        self.government.contains_key(country_code)
    }

    pub fn government_source(&self, country_code: &str) -> Option<&str> {
        self.government.get(country_code).and_then(|s| s.as_deref())
    }

    fn require_known(&self, country_code: &str) -> Result<()> {
        if self.is_known_country(country_code) {
            Ok(())
        } else {
            Err(VoltgridError::UnknownCountry { country_code: country_code.to_string() })
        }
    }

    /// Priority order for scalar attributes: government source first, then
    /// OpenChargeMap, then OpenStreetMap.
    pub fn attribute_order(&self, country_code: &str) -> Result<Vec<&str>> {
        self.require_known(country_code)?;
        let mut order = Vec::with_capacity(3);
        if let Some(gov) = self.government_source(country_code) {
            order.push(gov);
        }
        order.push(SOURCE_OCM);
        order.push(SOURCE_OSM);
        Ok(order)
    }

    /// Priority order for the canonical point: OpenStreetMap first, then
    /// OpenChargeMap, then the government source.
    pub fn geometry_order(&self, country_code: &str) -> Result<Vec<&str>> {
        self.require_known(country_code)?;
        let mut order = Vec::with_capacity(3);
        order.push(SOURCE_OSM);
        order.push(SOURCE_OCM);
        if let Some(gov) = self.government_source(country_code) {
            order.push(gov);
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_german_orders() {
        let sources = SourcePriorities::default();
        assert_eq!(sources.attribute_order("DE").unwrap(), vec!["BNA", "OCM", "OSM"]);
        assert_eq!(sources.geometry_order("DE").unwrap(), vec!["OSM", "OCM", "BNA"]);
    }

    #[test]
    fn italy_has_no_government_source() {
        let sources = SourcePriorities::default();
        assert_eq!(sources.government_source("IT"), None);
        assert_eq!(sources.attribute_order("IT").unwrap(), vec!["OCM", "OSM"]);
        assert_eq!(sources.geometry_order("IT").unwrap(), vec!["OSM", "OCM"]);
    }

    #[test]
    fn unknown_country_is_rejected() {
        let sources = SourcePriorities::default();
        assert!(matches!(
            sources.attribute_order("XX"),
            Err(VoltgridError::UnknownCountry { .. })
        ));
    }

    #[test]
    fn override_adds_new_country() {
        let mut sources = SourcePriorities::default();
        sources.set_government_source("AT", Some("ECONTROL".to_string()));
        assert_eq!(sources.attribute_order("AT").unwrap(), vec!["ECONTROL", "OCM", "OSM"]);
    }
}
