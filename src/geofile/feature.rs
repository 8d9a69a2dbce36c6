use std::collections::HashMap;

/// A single geometry with its OSM way id and tag attributes.
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: geo::Geometry,
    /// OSM way ids do not fit in an i32, so the id travels as Integer64 all
    /// the way into the exported files.
    pub id: i64,
    // TODO support different value types besides String. See gdal::vector::OGRFieldType for types
    // supported by GDAL.
    pub attributes: Option<HashMap<String, String>>,
}

impl Feature {
    pub fn new(id: i64, geometry: geo::Geometry) -> Self {
        Self {
            geometry,
            id,
            attributes: None,
        }
    }
}
