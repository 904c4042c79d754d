//! Cluster-to-canonical-record resolution.
//!
//! Scalar attributes and geometry each follow their own per-country source
//! priority (see `SourcePriorities`); within a source, the first member
//! carrying the attribute wins.

use voltgrid_core::config::MergeConfig;
use voltgrid_core::error::{Result, VoltgridError};
use voltgrid_core::models::merged::MERGED_SOURCE_ID_PREFIX;
use voltgrid_core::models::{MergedStation, MergedStationSource, NearbyStation};
use voltgrid_geo::StationPoint;

/// Computes the canonical merged record for one duplicate cluster.
pub struct MergeResolver<'a> {
    config: &'a MergeConfig,
    country_code: &'a str,
}

impl<'a> MergeResolver<'a> {
    pub fn new(config: &'a MergeConfig, country_code: &'a str) -> Self {
        Self { config, country_code }
    }

    /// Resolve a discovery-ordered cluster (duplicates first, seed last)
    /// into one merged record plus one provenance row per member.
    pub fn merge(
        &self,
        cluster: &[NearbyStation],
    ) -> Result<(MergedStation, Vec<MergedStationSource>)> {
        let provenance: Vec<MergedStationSource> = cluster
            .iter()
            .map(|m| MergedStationSource { station_id: m.id, source_id: m.source_id.clone() })
            .collect();

        let merged = match cluster {
            [] => return Err(VoltgridError::EmptyCluster),
            [only] => MergedStation {
                country_code: self.country_code.to_string(),
                source_id: format!("{}{}", MERGED_SOURCE_ID_PREFIX, only.source_id),
                data_source: only.data_source.clone(),
                point: Some(only.point),
                operator: only.operator.clone(),
                payment: only.payment.clone(),
                authentication: only.authentication.clone(),
                is_merged: true,
            },
            members => {
                let mut source_names: Vec<&str> =
                    members.iter().map(|m| m.data_source.as_str()).collect();
                source_names.sort_unstable();
                source_names.dedup();
                let data_source = source_names.join(",");

                let source_ids: Vec<&str> =
                    members.iter().map(|m| m.source_id.as_str()).collect();
                let source_id =
                    format!("{}{}", MERGED_SOURCE_ID_PREFIX, source_ids.join(","));

                let attribute_order = self.config.sources.attribute_order(self.country_code)?;
                let geometry_order = self.config.sources.geometry_order(self.country_code)?;

                let point: Option<StationPoint> =
                    resolve_by_priority(members, &geometry_order, |m| Some(m.point));
                if point.is_none() {
                    // Should be impossible given upstream coordinate
                    // validation; fatal for this cluster only.
                    return Err(VoltgridError::MissingGeometry {
                        source_ids: source_ids.join(","),
                    });
                }

                MergedStation {
                    country_code: self.country_code.to_string(),
                    source_id,
                    data_source,
                    point,
                    operator: self.resolve_scalar(members, &attribute_order, "operator", |m| {
                        m.operator.clone()
                    }),
                    payment: self.resolve_scalar(members, &attribute_order, "payment", |m| {
                        m.payment.clone()
                    }),
                    authentication: self
                        .resolve_scalar(members, &attribute_order, "authentication", |m| {
                            m.authentication.clone()
                        }),
                    is_merged: true,
                }
            }
        };

        Ok((merged, provenance))
    }

    fn resolve_scalar<T, F>(
        &self,
        members: &[NearbyStation],
        order: &[&str],
        attribute: &str,
        get: F,
    ) -> Option<T>
    where
        F: Fn(&NearbyStation) -> Option<T>,
    {
        let resolved = resolve_by_priority(members, order, get);
        if resolved.is_none() {
            // Leave the attribute unset rather than guessing
            tracing::warn!(
                attribute,
                country_code = self.country_code,
                "no cluster member carries attribute, leaving unset"
            );
        }
        resolved
    }
}

/// First non-empty value walking the priority list source by source.
fn resolve_by_priority<T, F>(members: &[NearbyStation], order: &[&str], get: F) -> Option<T>
where
    F: Fn(&NearbyStation) -> Option<T>,
{
    order.iter().find_map(|source| {
        members.iter().filter(|m| m.data_source == *source).find_map(&get)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use voltgrid_core::models::StationId;

    fn member(id: i64, source_id: &str, data_source: &str, lon: f64) -> NearbyStation {
        NearbyStation {
            id: StationId(id),
            source_id: source_id.to_string(),
            data_source: data_source.to_string(),
            operator: None,
            payment: None,
            authentication: None,
            point: StationPoint::new(lon, 48.1548).unwrap(),
            address: None,
            charging: None,
            distance_m: 0.0,
        }
    }

    fn config() -> MergeConfig {
        MergeConfig::with_defaults()
    }

    #[test]
    fn single_member_cluster_copies_the_seed() {
        let config = config();
        let resolver = MergeResolver::new(&config, "DE");
        let mut seed = member(1, "OSM123", "OSM", 11.4717);
        seed.operator = Some("EnBW".to_string());

        let (merged, provenance) = resolver.merge(std::slice::from_ref(&seed)).unwrap();
        assert_eq!(merged.source_id, "MERGED_OSM123");
        assert_eq!(merged.data_source, "OSM");
        assert_eq!(merged.operator.as_deref(), Some("EnBW"));
        assert_eq!(merged.point, Some(seed.point));
        assert!(merged.is_merged);
        assert_eq!(provenance.len(), 1);
        assert_eq!(provenance[0].station_id, StationId(1));
        assert_eq!(provenance[0].source_id, "OSM123");
    }

    #[test]
    fn empty_cluster_is_rejected() {
        let config = config();
        let resolver = MergeResolver::new(&config, "DE");
        assert!(matches!(resolver.merge(&[]), Err(VoltgridError::EmptyCluster)));
    }

    #[test]
    fn scalar_attributes_prefer_government_then_ocm_then_osm() {
        let config = config();
        let resolver = MergeResolver::new(&config, "DE");

        let mut osm = member(1, "O1", "OSM", 11.0);
        osm.operator = Some("osm-operator".to_string());
        let mut ocm = member(2, "C1", "OCM", 11.0001);
        ocm.operator = Some("ocm-operator".to_string());
        let mut gov = member(3, "B1", "BNA", 11.0002);
        gov.operator = Some("bna-operator".to_string());

        let cluster = vec![osm.clone(), ocm.clone(), gov.clone()];
        let (merged, _) = resolver.merge(&cluster).unwrap();
        assert_eq!(merged.operator.as_deref(), Some("bna-operator"));

        // Without the government member, OCM wins
        let (merged, _) = resolver.merge(&[osm.clone(), ocm]).unwrap();
        assert_eq!(merged.operator.as_deref(), Some("ocm-operator"));

        // OSM is the last resort
        let mut ocm_bare = member(2, "C1", "OCM", 11.0001);
        ocm_bare.operator = None;
        let (merged, _) = resolver.merge(&[osm, ocm_bare]).unwrap();
        assert_eq!(merged.operator.as_deref(), Some("osm-operator"));
    }

    #[test]
    fn geometry_prefers_osm_over_government() {
        let config = config();
        let resolver = MergeResolver::new(&config, "DE");

        let osm = member(1, "O1", "OSM", 11.0);
        let gov = member(2, "B1", "BNA", 12.0);
        let (merged, _) = resolver.merge(&[gov, osm.clone()]).unwrap();
        assert_eq!(merged.point, Some(osm.point));
    }

    #[test]
    fn data_source_is_sorted_unique_and_source_id_keeps_discovery_order() {
        let config = config();
        let resolver = MergeResolver::new(&config, "DE");

        let cluster = vec![
            member(3, "O2", "OSM", 11.0),
            member(1, "B1", "BNA", 11.0001),
            member(2, "O1", "OSM", 11.0002),
        ];
        let (merged, provenance) = resolver.merge(&cluster).unwrap();
        assert_eq!(merged.data_source, "BNA,OSM");
        assert_eq!(merged.source_id, "MERGED_O2,B1,O1");
        assert_eq!(provenance.len(), 3);
    }

    #[test]
    fn unresolvable_operator_stays_unset() {
        let config = config();
        let resolver = MergeResolver::new(&config, "DE");

        let cluster = vec![
            member(1, "O1", "OSM", 11.0),
            member(2, "C1", "OCM", 11.0001),
            member(3, "B1", "BNA", 11.0002),
        ];
        let (merged, _) = resolver.merge(&cluster).unwrap();
        assert_eq!(merged.operator, None);
        assert_eq!(merged.payment, None);
        assert_eq!(merged.authentication, None);
    }

    #[test]
    fn italy_resolves_without_a_government_source() {
        let config = config();
        let resolver = MergeResolver::new(&config, "IT");

        let mut osm = member(1, "O1", "OSM", 11.0);
        osm.operator = Some("osm-operator".to_string());
        let mut ocm = member(2, "C1", "OCM", 11.0001);
        ocm.operator = Some("ocm-operator".to_string());
        let (merged, _) = resolver.merge(&[osm, ocm]).unwrap();
        assert_eq!(merged.operator.as_deref(), Some("ocm-operator"));
    }

    #[test]
    fn cluster_of_unknown_sources_fails_geometry_resolution() {
        let config = config();
        let resolver = MergeResolver::new(&config, "DE");

        let cluster = vec![member(1, "X1", "MYSTERY", 11.0), member(2, "X2", "MYSTERY", 11.0001)];
        assert!(matches!(
            resolver.merge(&cluster),
            Err(VoltgridError::MissingGeometry { .. })
        ));
    }
}
