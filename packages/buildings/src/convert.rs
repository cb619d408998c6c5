//! Footprint geometry to renderable [`BuildingRecord`] conversion.
//!
//! Each footprint's boundary is simplified with Douglas-Peucker and only
//! exterior rings survive; holes are dropped. A multi-part footprint
//! yields one record per part, all sharing the height estimated once for
//! the footprint. Non-areal geometries are skipped.

use geo::{Geometry, Polygon, Simplify};
use rand::Rng;
use spendmap_buildings_models::BuildingRecord;

use crate::Footprint;
use crate::height::estimate_height;

/// Default simplification tolerance in degrees (roughly 5 m).
pub const DEFAULT_SIMPLIFY_TOLERANCE: f64 = 0.000_05;

/// Converts footprints into a flat list of building records.
///
/// A `tolerance` of zero or less disables simplification so every input
/// vertex is kept.
pub fn convert_buildings<R: Rng + ?Sized>(
    footprints: &[Footprint],
    tolerance: f64,
    rng: &mut R,
) -> Vec<BuildingRecord> {
    let mut records = Vec::with_capacity(footprints.len());
    let mut skipped = 0usize;

    for footprint in footprints {
        match &footprint.geometry {
            Geometry::Polygon(polygon) => {
                let height = estimate_height(&footprint.tags, rng);
                records.push(polygon_record(&simplify(polygon, tolerance), height));
            }
            Geometry::MultiPolygon(multi) => {
                let height = estimate_height(&footprint.tags, rng);
                records.extend(
                    multi
                        .0
                        .iter()
                        .map(|polygon| polygon_record(&simplify(polygon, tolerance), height)),
                );
            }
            _ => skipped += 1,
        }
    }

    if skipped > 0 {
        log::debug!("Skipped {skipped} non-polygon footprints");
    }

    records
}

fn simplify(polygon: &Polygon<f64>, tolerance: f64) -> Polygon<f64> {
    if tolerance > 0.0 {
        polygon.simplify(&tolerance)
    } else {
        polygon.clone()
    }
}

fn polygon_record(polygon: &Polygon<f64>, height: f64) -> BuildingRecord {
    let exterior = polygon.exterior().coords().map(|c| [c.x, c.y]).collect();
    BuildingRecord {
        coordinates: vec![exterior],
        height,
    }
}

#[cfg(test)]
mod tests {
    use geo::{LineString, MultiPolygon, Point, polygon};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use spendmap_buildings_models::{BuildingTags, TAG_BUILDING, TAG_HEIGHT};

    use super::*;

    fn footprint(geometry: Geometry<f64>, tags: &[(&str, &str)]) -> Footprint {
        Footprint {
            geometry,
            tags: tags.iter().copied().collect::<BuildingTags>(),
        }
    }

    fn square(x: f64, y: f64) -> Polygon<f64> {
        polygon![
            (x: x, y: y),
            (x: x + 0.001, y: y),
            (x: x + 0.001, y: y + 0.001),
            (x: x, y: y + 0.001),
        ]
    }

    #[test]
    fn polygon_keeps_all_vertices_without_tolerance() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let poly = square(77.0, 28.0);
        let n = poly.exterior().0.len();

        let records = convert_buildings(&[footprint(Geometry::Polygon(poly), &[])], 0.0, &mut rng);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].coordinates.len(), 1);
        assert_eq!(records[0].coordinates[0].len(), n);
        assert!(records[0].height > 0.0);
        let [lon, lat] = records[0].coordinates[0][1];
        assert!((lon - 77.001).abs() < 1e-9 && (lat - 28.0).abs() < 1e-9);
    }

    #[test]
    fn interior_rings_are_dropped() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let hole = LineString::from(vec![
            (77.0002, 28.0002),
            (77.0004, 28.0002),
            (77.0004, 28.0004),
            (77.0002, 28.0002),
        ]);
        let poly = Polygon::new(square(77.0, 28.0).exterior().clone(), vec![hole]);

        let records = convert_buildings(&[footprint(Geometry::Polygon(poly), &[])], 0.0, &mut rng);

        assert_eq!(records[0].coordinates.len(), 1);
    }

    #[test]
    fn multipolygon_parts_share_height() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let multi = MultiPolygon(vec![
            square(77.0, 28.0),
            square(77.01, 28.0),
            square(77.02, 28.0),
        ]);

        let records = convert_buildings(
            &[footprint(Geometry::MultiPolygon(multi), &[(TAG_BUILDING, "house")])],
            0.0,
            &mut rng,
        );

        assert_eq!(records.len(), 3);
        let first = records[0].height;
        assert!(records.iter().all(|r| (r.height - first).abs() < f64::EPSILON));
        assert!((5.0..=12.0).contains(&first));
    }

    #[test]
    fn heights_differ_between_footprints() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let records = convert_buildings(
            &[
                footprint(Geometry::Polygon(square(77.0, 28.0)), &[(TAG_HEIGHT, "10")]),
                footprint(Geometry::Polygon(square(77.1, 28.0)), &[(TAG_HEIGHT, "25m")]),
            ],
            0.0,
            &mut rng,
        );
        assert!((records[0].height - 10.0).abs() < f64::EPSILON);
        assert!((records[1].height - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn points_and_lines_are_skipped() {
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let records = convert_buildings(
            &[
                footprint(Geometry::Point(Point::new(77.0, 28.0)), &[]),
                footprint(
                    Geometry::LineString(LineString::from(vec![(77.0, 28.0), (77.1, 28.1)])),
                    &[],
                ),
            ],
            0.0,
            &mut rng,
        );
        assert!(records.is_empty());
    }

    #[test]
    fn simplification_removes_redundant_vertices() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let poly = polygon![
            (x: 0.0, y: 0.0),
            (x: 0.5, y: 0.000_001),
            (x: 1.0, y: 0.0),
            (x: 1.0, y: 1.0),
            (x: 0.0, y: 1.0),
        ];

        let records = convert_buildings(
            &[footprint(Geometry::Polygon(poly), &[])],
            DEFAULT_SIMPLIFY_TOLERANCE,
            &mut rng,
        );

        assert_eq!(records[0].coordinates[0].len(), 5);
    }
}
