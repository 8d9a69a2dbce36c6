use anyhow::{anyhow, Context};
use gdal::vector::LayerAccess;
use std::{fs, path::Path};

use crate::crs::crs_utils::EpsgCode;

use super::gdal_geofile::{GdalDriverType, FID_FIELD_NAME};
use super::remove_file_if_exists;

/// Convert a vector geofile into a CSV with the geometry as a WKT column.
///
/// The output has a `WKT` column first and the `fid` column second, one row
/// per feature in file order. Equivalent to
/// `ogr2ogr -f CSV -lco GEOMETRY=AS_WKT`.
pub fn convert_geofile_to_wkt_csv(
    input_filepath: &Path,
    output_filepath: &Path,
) -> anyhow::Result<()> {
    remove_file_if_exists(output_filepath).context("Removing prior CSV")?;

    gdal::DriverManager::register_all();
    let mut open_options = gdal::DatasetOptions::default();
    open_options.open_flags = gdal::GdalOpenFlags::GDAL_OF_VECTOR;
    let input_dataset = gdal::Dataset::open_ex(input_filepath, open_options)?;
    let mut input_layer = input_dataset.layer(0)?;

    let csv_driver = gdal::DriverManager::get_driver_by_name(GdalDriverType::Csv.name())
        .context("Getting GDAL CSV driver")?;
    let mut output_dataset = csv_driver.create_vector_only(output_filepath)?;
    let layer_options = gdal::LayerOptions {
        name: "",
        srs: None,
        ty: gdal::vector::OGRwkbGeometryType::wkbPolygon,
        options: Some(&["GEOMETRY=AS_WKT"]),
    };
    let mut output_layer = output_dataset.create_layer(layer_options)?;
    output_layer.create_defn_fields(&[(FID_FIELD_NAME, gdal::vector::OGRFieldType::OFTInteger64)])?;

    let mut num_rows: u64 = 0;
    for input_feature in input_layer.features() {
        // Geometries cross between datasets as WKT.
        let geometry_wkt = input_feature.geometry().wkt()?;
        let geometry = gdal::vector::Geometry::from_wkt(&geometry_wkt)?;
        let fid = read_fid_field(&input_feature)?;
        output_layer.create_feature_fields(
            geometry,
            &[FID_FIELD_NAME],
            &[gdal::vector::FieldValue::Integer64Value(fid)],
        )?;
        num_rows += 1;
    }
    log::info!(
        "Converted {} features from {:?} to {:?}",
        num_rows,
        input_filepath,
        output_filepath
    );
    Ok(())
}

fn read_fid_field(feature: &gdal::vector::Feature) -> anyhow::Result<i64> {
    match feature.field(FID_FIELD_NAME)? {
        Some(gdal::vector::FieldValue::Integer64Value(value)) => Ok(value),
        Some(gdal::vector::FieldValue::IntegerValue(value)) => Ok(value as i64),
        other => Err(anyhow!(
            "Unexpected value for the {} field: {:?}",
            FID_FIELD_NAME,
            other
        )),
    }
}

/// Rewrite every polygon row of the CSV to carry the spatial reference id,
/// `"POLYGON...` becoming `"SRID=<epsg>;POLYGON...`, so the bulk loader can
/// interpret the geometry column without a separate schema declaration.
pub fn embed_srid_in_wkt_csv(csv_filepath: &Path, epsg: EpsgCode) -> anyhow::Result<()> {
    let contents = fs::read_to_string(csv_filepath)?;
    let mut rewritten: Vec<String> = Vec::new();
    for line in contents.lines() {
        match line.strip_prefix("\"POLYGON") {
            Some(rest) => rewritten.push(format!("\"SRID={};POLYGON{}", epsg, rest)),
            None => rewritten.push(line.to_string()),
        }
    }
    let mut rewritten = rewritten.join("\n");
    if contents.ends_with('\n') {
        rewritten.push('\n');
    }
    fs::write(csv_filepath, rewritten)?;
    Ok(())
}
