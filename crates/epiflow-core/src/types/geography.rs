use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::GeographyError;
use crate::geo::Coordinates;

/// Region name shared by the communes of the largest urban cluster.
pub const ABIDJAN_REGION: &str = "Abidjan";

/// A modeled population unit (city or region) with its static attributes.
///
/// `region` and `district` feed the seasonal mobility rules; `centrality` is
/// a 0-100 importance score standing in for economic pull and health-system
/// capacity.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GeoZone {
    pub id: String,
    pub name: String,
    pub region: String,
    pub district: String,
    pub coordinates: Coordinates,
    pub population: u64,
    pub centrality: f64,
}

const IVORY_COAST_DATA: &str = include_str!("../../data/cote_divoire.json");

/// The 30 principal Côte d'Ivoire zones: 13 Abidjan communes plus 17
/// regional cities, with OpenStreetMap coordinates and census populations.
pub fn ivory_coast_zones() -> Vec<GeoZone> {
    serde_json::from_str(IVORY_COAST_DATA).expect("embedded zone table is valid JSON")
}

/// Look up a zone by its stable id.
pub fn zone_by_id<'a>(zones: &'a [GeoZone], id: &str) -> Option<&'a GeoZone> {
    zones.iter().find(|z| z.id == id)
}

/// All zones belonging to the given region.
pub fn zones_by_region<'a>(zones: &'a [GeoZone], region: &str) -> Vec<&'a GeoZone> {
    zones.iter().filter(|z| z.region == region).collect()
}

/// The communes of the largest urban cluster.
pub fn abidjan_cluster(zones: &[GeoZone]) -> Vec<&GeoZone> {
    zones_by_region(zones, ABIDJAN_REGION)
}

/// The `limit` zones with the highest centrality score, descending.
pub fn top_central_zones(zones: &[GeoZone], limit: usize) -> Vec<&GeoZone> {
    let mut ranked: Vec<&GeoZone> = zones.iter().collect();
    ranked.sort_by(|a, b| b.centrality.total_cmp(&a.centrality));
    ranked.truncate(limit);
    ranked
}

pub fn total_population(zones: &[GeoZone]) -> u64 {
    zones.iter().map(|z| z.population).sum()
}

/// Reject geographies the simulation cannot run on: empty tables, duplicate
/// ids, zero populations, out-of-range coordinates or centrality scores.
pub fn validate_geography(zones: &[GeoZone]) -> Result<(), GeographyError> {
    if zones.is_empty() {
        return Err(GeographyError::Empty);
    }

    let mut seen = HashSet::new();
    for zone in zones {
        if !seen.insert(zone.id.as_str()) {
            return Err(GeographyError::DuplicateId(zone.id.clone()));
        }
        if zone.population == 0 {
            return Err(GeographyError::ZeroPopulation {
                id: zone.id.clone(),
            });
        }
        if !zone.coordinates.is_valid() {
            return Err(GeographyError::InvalidCoordinates {
                id: zone.id.clone(),
                latitude: zone.coordinates.latitude,
                longitude: zone.coordinates.longitude,
            });
        }
        if !zone.centrality.is_finite() || !(0.0..=100.0).contains(&zone.centrality) {
            return Err(GeographyError::CentralityOutOfRange {
                id: zone.id.clone(),
                value: zone.centrality,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_loads_and_validates() {
        let zones = ivory_coast_zones();
        assert_eq!(zones.len(), 30);
        validate_geography(&zones).unwrap();
    }

    #[test]
    fn test_abidjan_cluster_has_thirteen_communes() {
        let zones = ivory_coast_zones();
        assert_eq!(abidjan_cluster(&zones).len(), 13);
    }

    #[test]
    fn test_zone_lookup() {
        let zones = ivory_coast_zones();
        assert_eq!(zone_by_id(&zones, "CI-BOU").unwrap().name, "Bouaké");
        assert!(zone_by_id(&zones, "CI-XXX").is_none());
    }

    #[test]
    fn test_top_central_zones_ordering() {
        let zones = ivory_coast_zones();
        let top = top_central_zones(&zones, 3);
        assert_eq!(top[0].name, "Plateau");
        assert!(top[0].centrality >= top[1].centrality);
        assert!(top[1].centrality >= top[2].centrality);
    }

    #[test]
    fn test_validation_rejects_duplicate_ids() {
        let mut zones = ivory_coast_zones();
        zones[1].id = zones[0].id.clone();
        assert!(matches!(
            validate_geography(&zones),
            Err(GeographyError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_validation_rejects_zero_population() {
        let mut zones = ivory_coast_zones();
        zones[4].population = 0;
        assert!(matches!(
            validate_geography(&zones),
            Err(GeographyError::ZeroPopulation { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_bad_coordinates() {
        let mut zones = ivory_coast_zones();
        zones[2].coordinates.latitude = 120.0;
        assert!(matches!(
            validate_geography(&zones),
            Err(GeographyError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_empty_table() {
        assert!(matches!(validate_geography(&[]), Err(GeographyError::Empty)));
    }
}
