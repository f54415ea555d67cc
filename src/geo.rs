//! Geographic proximity filter over a [`Database`].

use tracing::debug;

use crate::model::{Database, System};

/// Equirectangular scale: one degree of latitude is roughly 69 miles.
const MILES_PER_DEGREE: f64 = 69.0;

/// Reduce a database to the systems with at least one site within
/// `radius_miles` of the given point.
///
/// Surviving systems keep only their in-radius sites; talkgroups are kept
/// verbatim. Agencies are not positioned and pass through unfiltered. The
/// input database is never mutated.
///
/// Distances use a flat-earth equirectangular approximation (east–west
/// miles scaled by the cosine of the reference latitude), which is only
/// meaningful for short ranges.
pub fn near_point(db: &Database, lat: f64, lon: f64, radius_miles: f64) -> Database {
    let mut systems = Vec::new();

    for system in &db.systems {
        let sites: Vec<_> = system
            .sites
            .iter()
            .filter(|site| distance_miles(lat, lon, site.lat, site.long) < radius_miles)
            .cloned()
            .collect();

        if sites.is_empty() {
            continue;
        }
        debug!(system = %system.name, sites = sites.len(), "system within radius");
        systems.push(System {
            name: system.name.clone(),
            system_id: system.system_id,
            modulation: system.modulation,
            talkgroups: system.talkgroups.clone(),
            sites,
        });
    }

    Database { systems, agencies: db.agencies.clone() }
}

fn distance_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dx = (lon2 - lon1) * MILES_PER_DEGREE * lat1.to_radians().cos();
    let dy = (lat2 - lat1) * MILES_PER_DEGREE;
    (dx * dx + dy * dy).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes::{Modulation, Tag};
    use crate::model::{Site, Talkgroup};

    fn site(name: &str, lat: f64, long: f64) -> Site {
        Site {
            name: name.to_string(),
            site_id: 1,
            control: vec![851.0125],
            channels: Vec::new(),
            lat,
            long,
            range: 25.0,
        }
    }

    fn system(name: &str, sites: Vec<Site>) -> System {
        System {
            name: name.to_string(),
            system_id: 5,
            modulation: Modulation::P25Phase1,
            talkgroups: vec![Talkgroup {
                tg_id: 100,
                tg_name: "Dispatch".to_string(),
                tg_tag: Tag::Dispatch,
            }],
            sites,
        }
    }

    #[test]
    fn test_distance_is_zero_at_same_point() {
        assert!(distance_miles(35.0, -78.7, 35.0, -78.7) < 1e-9);
    }

    #[test]
    fn test_distance_one_degree_latitude() {
        let d = distance_miles(35.0, -78.7, 36.0, -78.7);
        assert!((d - 69.0).abs() < 1e-9);
    }

    #[test]
    fn test_distance_longitude_shrinks_with_latitude() {
        // A degree of longitude spans fewer miles further from the equator.
        let near_equator = distance_miles(1.0, -78.7, 1.0, -79.7);
        let mid_latitude = distance_miles(45.0, -78.7, 45.0, -79.7);
        assert!(near_equator > mid_latitude);
        assert!((mid_latitude - 69.0 * 45f64.to_radians().cos()).abs() < 1e-9);
    }

    #[test]
    fn test_keeps_only_in_radius_sites() {
        let db = Database {
            systems: vec![system(
                "Statewide P25",
                vec![
                    site("Near", 35.05, -78.71),
                    site("Far", 36.50, -78.71), // ~100 miles north
                ],
            )],
            agencies: Vec::new(),
        };

        let filtered = near_point(&db, 35.05, -78.71, 25.0);
        assert_eq!(filtered.systems.len(), 1);
        assert_eq!(filtered.systems[0].sites.len(), 1);
        assert_eq!(filtered.systems[0].sites[0].name, "Near");
        // Talkgroups are untouched on surviving systems.
        assert_eq!(filtered.systems[0].talkgroups.len(), 1);
    }

    #[test]
    fn test_drops_system_with_no_site_in_radius() {
        let db = Database {
            systems: vec![
                system("In Range", vec![site("Near", 35.05, -78.71)]),
                system("Out of Range", vec![site("Far", 40.0, -80.0)]),
            ],
            agencies: Vec::new(),
        };

        let filtered = near_point(&db, 35.05, -78.71, 25.0);
        assert_eq!(filtered.systems.len(), 1);
        assert_eq!(filtered.systems[0].name, "In Range");
    }

    #[test]
    fn test_does_not_mutate_input_and_passes_agencies_through() {
        let db = Database {
            systems: vec![system("Statewide P25", vec![site("Far", 40.0, -80.0)])],
            agencies: vec![crate::model::Agency {
                agency_id: 9,
                county_name: "County A".to_string(),
                agency_name: "County A Fire".to_string(),
                freqs: Vec::new(),
            }],
        };
        let before = db.clone();

        let filtered = near_point(&db, 35.05, -78.71, 25.0);
        assert_eq!(db, before);
        assert!(filtered.systems.is_empty());
        assert_eq!(filtered.agencies, db.agencies);
    }
}
