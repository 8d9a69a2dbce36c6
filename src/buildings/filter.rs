use crate::crs::crs_utils::EpsgCode;
use crate::crs::projection::project_features;
use crate::geofile::feature::Feature;

/// Keep only features whose geometry type is exactly Polygon.
///
/// MultiPolygons are dropped along with points and lines; the downstream
/// loader expects plain polygon rows.
pub fn retain_polygons(features: Vec<Feature>) -> Vec<Feature> {
    let num_features = features.len();
    let polygons: Vec<Feature> = features
        .into_iter()
        .filter(|feature| matches!(feature.geometry, geo::Geometry::Polygon(_)))
        .collect();
    if polygons.len() != num_features {
        log::warn!(
            "Out of {} features read, only {} were Polygons.",
            num_features,
            polygons.len()
        );
    }
    polygons
}

/// Reproject the whole collection, then narrow it to polygons.
pub fn project_and_filter_polygons(
    mut features: Vec<Feature>,
    from_epsg: EpsgCode,
    to_epsg: EpsgCode,
) -> anyhow::Result<Vec<Feature>> {
    project_features(&mut features, from_epsg, to_epsg)?;
    Ok(retain_polygons(features))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use crate::crs::crs_utils::{EPSG_WEB_MERCATOR, EPSG_WGS84};
    use crate::geofile::feature::Feature;

    use super::{project_and_filter_polygons, retain_polygons};

    fn unit_square(offset: f64) -> geo::Polygon {
        geo::Polygon::new(
            geo::LineString::from(vec![
                (offset, offset),
                (offset + 0.001, offset),
                (offset + 0.001, offset + 0.001),
                (offset, offset + 0.001),
                (offset, offset),
            ]),
            vec![],
        )
    }

    #[rstest]
    fn test_retain_polygons_drops_other_geometry_types() {
        let features = vec![
            Feature::new(1, geo::Geometry::Polygon(unit_square(0.0))),
            Feature::new(
                2,
                geo::Geometry::LineString(geo::LineString::from(vec![(0.0, 0.0), (1.0, 1.0)])),
            ),
            Feature::new(3, geo::Geometry::Polygon(unit_square(0.01))),
            Feature::new(
                4,
                geo::Geometry::MultiPolygon(geo::MultiPolygon(vec![unit_square(0.02)])),
            ),
            Feature::new(5, geo::Geometry::Point(geo::Point::new(0.0, 0.0))),
        ];

        let polygons = retain_polygons(features);
        let ids: Vec<i64> = polygons.iter().map(|feature| feature.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert!(polygons
            .iter()
            .all(|feature| matches!(feature.geometry, geo::Geometry::Polygon(_))));
    }

    #[rstest]
    fn test_project_and_filter_polygons() {
        // Two polygons and a line string, as a fetch result would contain.
        let features = vec![
            Feature::new(1, geo::Geometry::Polygon(unit_square(0.0))),
            Feature::new(
                2,
                geo::Geometry::LineString(geo::LineString::from(vec![(0.0, 0.0), (0.001, 0.001)])),
            ),
            Feature::new(3, geo::Geometry::Polygon(unit_square(0.01))),
        ];

        let polygons =
            project_and_filter_polygons(features, EPSG_WGS84, EPSG_WEB_MERCATOR).unwrap();
        assert_eq!(polygons.len(), 2);
        for feature in &polygons {
            let geo::Geometry::Polygon(polygon) = &feature.geometry else {
                panic!("Non-polygon survived the filter");
            };
            // Projected coordinates are in meters now, far from the degree range.
            assert!(polygon
                .exterior()
                .coords()
                .skip(1)
                .any(|coord| coord.x.abs() > 1.0 || coord.y.abs() > 1.0));
        }
    }
}
