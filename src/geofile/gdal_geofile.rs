use anyhow::{anyhow, Context};
use gdal::vector::LayerAccess;
use indicatif::ProgressBar;
use std::path::Path;

use super::feature::Feature;
use super::remove_file_if_exists;

/// Name of the identifier column in the exported files. The downstream
/// loader keys building records on it.
pub const FID_FIELD_NAME: &str = "fid";

pub enum GdalDriverType {
    GeoJson,
    Csv,
}

impl GdalDriverType {
    pub fn name(&self) -> &'static str {
        match self {
            GdalDriverType::GeoJson => "GeoJSON",
            GdalDriverType::Csv => "CSV",
        }
    }
}

/// Write the collection to a vector geofile with exactly two columns: the
/// feature id as `fid` and the geometry.
///
/// Any prior file at the output path is removed first, so a re-run replaces
/// the export instead of appending to it.
pub fn write_features_to_geofile(
    features: &Vec<Feature>,
    output_filepath: &Path,
    crs: Option<&gdal::spatial_ref::SpatialRef>,
    driver: &str,
) -> anyhow::Result<()> {
    remove_file_if_exists(output_filepath).context("Removing prior geofile")?;
    let driver = gdal::DriverManager::get_driver_by_name(driver).context("Getting GDAL driver")?;

    let layer_type = {
        use gdal::vector::OGRwkbGeometryType::*;
        match features.first() {
            Some(feature) => match &feature.geometry {
                geo::Geometry::Point(_) => wkbPoint,
                geo::Geometry::LineString(_) => wkbLineString,
                geo::Geometry::Polygon(_) => wkbPolygon,
                _ => {
                    return Err(anyhow!("Cannot write geometry type {:?} to file.", {
                        &feature.geometry
                    }))
                }
            },
            // An empty collection still gets a layer, so the output file is
            // valid for downstream readers.
            None => wkbPolygon,
        }
    };

    let crs = match crs {
        Some(crs) => crs.clone(),
        None => gdal::spatial_ref::SpatialRef::from_epsg(4326).unwrap(),
    };
    let crs_name = crs.name()?;
    log::debug!("Using spatial ref {} for writing geofile", crs_name);

    let mut dataset = driver.create_vector_only(output_filepath)?;
    let layer_options = gdal::LayerOptions {
        name: "",
        srs: Some(&crs),
        ty: layer_type,
        options: None,
    };

    let mut layer = dataset.create_layer(layer_options)?;
    layer.create_defn_fields(&[(FID_FIELD_NAME, gdal::vector::OGRFieldType::OFTInteger64)])?;

    log::info!(
        "Writing {} features to {:?}",
        features.len(),
        output_filepath
    );
    unsafe {
        // Start a transaction in case the driver supports transactions.
        // Committing all features once as opposed to per-feature is a massive speedup for these drivers.
        gdal_sys::OGR_L_StartTransaction(layer.c_layer());
    };
    let bar = ProgressBar::new(features.len() as u64);
    for feature in features {
        let wkb = wkb::geom_to_wkb(&feature.geometry)
            .or_else(|err| Err(anyhow!("Could not write geometry to WKB, {:?}", err)))?;
        let geometry = gdal::vector::Geometry::from_wkb(&wkb)?;
        layer.create_feature_fields(
            geometry,
            &[FID_FIELD_NAME],
            &[gdal::vector::FieldValue::Integer64Value(feature.id)],
        )?;
        bar.inc(1);
    }
    unsafe {
        gdal_sys::OGR_L_CommitTransaction(layer.c_layer());
    };
    Ok(())
}
