extern crate osm_xml as osm;
use anyhow::anyhow;
use std::path::Path;

use crate::geofile::feature::Feature;
use crate::osm::download::TagFilter;

/// Read every way matching the tag filter from an OSM XML file.
///
/// Closed rings become Polygons, open ways LineStrings. The ways are sorted
/// by id so the output order does not depend on the parser's map order.
pub fn read_tagged_features_from_file(
    filepath: &Path,
    tag_filter: &TagFilter,
) -> anyhow::Result<Vec<Feature>> {
    let infile = std::fs::File::open(filepath)?;
    let data = osm::OSM::parse(infile)?;
    let mut ways: Vec<&osm::Way> = data
        .ways
        .values()
        .filter(|way| way_matches_filter(way, tag_filter))
        .collect();
    ways.sort_by_key(|way| way.id);
    ways.into_iter()
        .map(|way| osm_way_to_feature(&data, way))
        .collect()
}

fn way_matches_filter(way: &osm::Way, tag_filter: &TagFilter) -> bool {
    way.tags
        .iter()
        .any(|tag| tag_filter.matches(&tag.key, &tag.val))
}

fn osm_way_to_feature(osm_data: &osm::OSM, way: &osm::Way) -> anyhow::Result<Feature> {
    let mut coords: Vec<geo::Coord> = Vec::new();
    for node in &way.nodes {
        if let osm::Reference::Node(node) = osm_data.resolve_reference(node) {
            coords.push(geo::Coord {
                x: node.lon,
                y: node.lat,
            });
        } else {
            return Err(anyhow!("Expected a node"));
        }
    }
    let geometry = if is_closed_ring(&coords) {
        geo::Geometry::Polygon(geo::Polygon::new(geo::LineString::new(coords), vec![]))
    } else {
        geo::Geometry::LineString(geo::LineString::new(coords))
    };
    let attributes = way
        .tags
        .iter()
        .map(|tag| (tag.key.clone(), tag.val.clone()))
        .collect();
    Ok(Feature {
        geometry,
        id: way.id,
        attributes: Some(attributes),
    })
}

fn is_closed_ring(coords: &[geo::Coord]) -> bool {
    coords.len() >= 4 && coords.first() == coords.last()
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use testdir::testdir;

    use crate::osm::download::TagFilter;

    use super::read_tagged_features_from_file;

    const OSM_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<osm version="0.6" generator="test">
  <node id="1" lat="0.0" lon="0.0"/>
  <node id="2" lat="0.0" lon="0.001"/>
  <node id="3" lat="0.001" lon="0.001"/>
  <node id="4" lat="0.001" lon="0.0"/>
  <node id="5" lat="0.002" lon="0.002"/>
  <node id="6" lat="0.003" lon="0.003"/>
  <way id="200">
    <nd ref="5"/>
    <nd ref="6"/>
    <tag k="building" v="roof"/>
  </way>
  <way id="100">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="3"/>
    <nd ref="4"/>
    <nd ref="1"/>
    <tag k="building" v="yes"/>
    <tag k="name" v="Test hall"/>
  </way>
  <way id="300">
    <nd ref="1"/>
    <nd ref="2"/>
    <nd ref="5"/>
    <nd ref="1"/>
    <tag k="highway" v="service"/>
  </way>
</osm>
"#;

    #[rstest]
    fn test_read_tagged_features_from_file() {
        let test_dir = testdir!();
        let osm_filepath = test_dir.join("response_osm.xml");
        std::fs::write(&osm_filepath, OSM_XML).unwrap();

        let tag_filter = TagFilter::HasKey {
            key: "building".to_string(),
        };
        let features = read_tagged_features_from_file(&osm_filepath, &tag_filter).unwrap();

        // The highway way is filtered out, the rest come back sorted by id.
        assert_eq!(features.len(), 2);
        assert_eq!(features[0].id, 100);
        assert_eq!(features[1].id, 200);

        match &features[0].geometry {
            geo::Geometry::Polygon(polygon) => {
                assert_eq!(polygon.exterior().coords().count(), 5);
                assert!(polygon.interiors().is_empty());
            }
            other => panic!("Expected the closed way to be a Polygon, got {:?}", other),
        }
        match &features[1].geometry {
            geo::Geometry::LineString(line) => assert_eq!(line.coords().count(), 2),
            other => panic!("Expected the open way to be a LineString, got {:?}", other),
        }

        let attributes = features[0].attributes.as_ref().unwrap();
        assert_eq!(attributes.get("building"), Some(&"yes".to_string()));
        assert_eq!(attributes.get("name"), Some(&"Test hall".to_string()));
    }

    #[rstest]
    fn test_key_equals_filter_narrows_to_matching_value() {
        let test_dir = testdir!();
        let osm_filepath = test_dir.join("response_osm.xml");
        std::fs::write(&osm_filepath, OSM_XML).unwrap();

        let tag_filter = TagFilter::KeyEquals {
            key: "building".to_string(),
            value: "roof".to_string(),
        };
        let features = read_tagged_features_from_file(&osm_filepath, &tag_filter).unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, 200);
    }
}
