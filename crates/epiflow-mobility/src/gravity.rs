use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};

use epiflow_core::{GeoZone, QuarantineLevel, ABIDJAN_REGION};

use crate::matrix::MobilityMatrix;

/// Brings raw gravity products into a people/day magnitude.
const GRAVITY_SCALE: f64 = 1e-5;
/// Destination centrality is expressed relative to a mid-scale score of 50.
const CENTRALITY_NORM: f64 = 50.0;
/// Pairs closer than this are treated as 1 km apart to keep the
/// inverse-square term bounded.
const MIN_DISTANCE_KM: f64 = 1.0;
/// Volumes at or under this are not materialized at all.
const MATERIALIZATION_THRESHOLD: f64 = 50.0;
/// Lower bar used after quarantine suppression, so restricted corridors
/// fade out instead of flickering around the base threshold.
const SUPPRESSED_THRESHOLD: f64 = 5.0;

/// Cocoa/coffee hubs that attract labor migration during harvest months.
const AGRICULTURAL_ZONES: [&str; 2] = ["Daloa", "Soubré"];
/// District favored by dry-season movement.
const NORTHERN_DISTRICT: &str = "Savanes";

const HARVEST_BOOST: f64 = 1.8;
const HOLIDAY_BOOST: f64 = 2.8;
const DRY_SEASON_BOOST: f64 = 1.3;

const NORTH_CORRIDOR: [(&str, &str); 3] = [
    ("Plateau", "Yamoussoukro"),
    ("Yamoussoukro", "Bouaké"),
    ("Bouaké", "Korhogo"),
];
const WEST_CORRIDOR: [(&str, &str); 2] = [("Plateau", "Daloa"), ("Daloa", "Man")];
const COASTAL_CORRIDOR: [(&str, &str); 2] = [("Plateau", "Sassandra"), ("Sassandra", "San Pedro")];

const NORTH_CORRIDOR_BOOST: f64 = 3.0;
const WEST_CORRIDOR_BOOST: f64 = 2.5;
const COASTAL_CORRIDOR_BOOST: f64 = 2.2;
/// Commuter flows between the Abidjan communes dwarf everything else.
const COMMUTE_BOOST: f64 = 5.0;

/// Build the full flow matrix for one calendar day.
///
/// Deterministic given (zones, date): volume = pop(o)·pop(d)/distance²,
/// scaled by destination centrality, the seasonal factor, the corridor
/// boost, and [`GRAVITY_SCALE`], materialized only above the threshold.
pub fn generate(zones: &[GeoZone], date: NaiveDate) -> MobilityMatrix {
    let mut matrix = MobilityMatrix::new();

    for origin in zones {
        for dest in zones {
            if origin.id == dest.id {
                continue;
            }

            let distance = origin
                .coordinates
                .distance_km(&dest.coordinates)
                .max(MIN_DISTANCE_KM);
            let gravity =
                (origin.population as f64 * dest.population as f64) / (distance * distance);

            let volume = gravity
                * GRAVITY_SCALE
                * (dest.centrality / CENTRALITY_NORM)
                * seasonal_factor(date, origin, dest)
                * corridor_boost(origin, dest);

            if volume > MATERIALIZATION_THRESHOLD {
                matrix.insert(&origin.id, &dest.id, volume.round());
            }
        }
    }

    matrix
}

/// Feedback coupler: rebuild the gravity matrix for `date`, then suppress
/// every flow by the more restrictive of its two endpoint quarantine tiers.
/// Suppressed entries under [`SUPPRESSED_THRESHOLD`] are dropped entirely.
pub fn generate_with_quarantine(
    zones: &[GeoZone],
    date: NaiveDate,
    levels: &HashMap<String, QuarantineLevel>,
) -> MobilityMatrix {
    let base = generate(zones, date);
    let mut adjusted = MobilityMatrix::new();

    for (origin, dest, volume) in base.iter() {
        let origin_factor = level_for(levels, origin).mobility_factor();
        let dest_factor = level_for(levels, dest).mobility_factor();
        let suppressed = (volume * origin_factor.min(dest_factor)).round();

        if suppressed > SUPPRESSED_THRESHOLD {
            adjusted.insert(origin, dest, suppressed);
        }
    }

    adjusted
}

fn level_for(levels: &HashMap<String, QuarantineLevel>, zone: &str) -> QuarantineLevel {
    levels.get(zone).copied().unwrap_or_default()
}

/// Multiplier for calendar-driven movement. The first matching rule wins:
/// harvest migration toward the agricultural hubs (Oct-Mar), year-end
/// returns from the Abidjan cluster to the rest of the country (Dec-Jan),
/// then dry-season movement toward the north (Nov-Mar).
fn seasonal_factor(date: NaiveDate, origin: &GeoZone, dest: &GeoZone) -> f64 {
    let month = date.month();
    let harvest_season = month >= 10 || month <= 3;
    let holiday_season = month == 12 || month == 1;
    let dry_season = month >= 11 || month <= 3;

    if harvest_season && AGRICULTURAL_ZONES.contains(&dest.name.as_str()) {
        return HARVEST_BOOST;
    }
    if holiday_season && origin.region == ABIDJAN_REGION && dest.region != ABIDJAN_REGION {
        return HOLIDAY_BOOST;
    }
    if dry_season && dest.district == NORTHERN_DISTRICT {
        return DRY_SEASON_BOOST;
    }

    1.0
}

/// Fixed multipliers for the named high-traffic routes.
fn corridor_boost(origin: &GeoZone, dest: &GeoZone) -> f64 {
    let pair = (origin.name.as_str(), dest.name.as_str());

    if NORTH_CORRIDOR.contains(&pair) {
        return NORTH_CORRIDOR_BOOST;
    }
    if WEST_CORRIDOR.contains(&pair) {
        return WEST_CORRIDOR_BOOST;
    }
    if COASTAL_CORRIDOR.contains(&pair) {
        return COASTAL_CORRIDOR_BOOST;
    }
    if origin.region == ABIDJAN_REGION && dest.region == ABIDJAN_REGION {
        return COMMUTE_BOOST;
    }

    1.0
}
