extern crate log;
pub mod buildings;
pub mod crs;
pub mod geofile;
pub mod osm;
use crate::buildings::filter::project_and_filter_polygons;
use crate::buildings::preview::{render_footprints, PreviewStyle};
use crate::crs::crs_utils::{spatial_ref_from_epsg, EpsgCode, EPSG_WEB_MERCATOR, EPSG_WGS84};
use crate::geofile::gdal_geofile::{write_features_to_geofile, GdalDriverType};
use crate::geofile::wkt_csv::{convert_geofile_to_wkt_csv, embed_srid_in_wkt_csv};
use crate::osm::conversion::read_tagged_features_from_file;
use crate::osm::download::{sync_osm_data_to_file, FeatureQuery, TagFilter, WgsPoint};
use anyhow::anyhow;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::{fs::read_to_string, path::Path};

/// Download building footprints around a test point and export them as
/// GeoJSON and WKT CSV fixtures for the database loading scripts.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an optional config file. Without it the standard fixture
    /// around Nairobi is produced.
    #[arg(short, long)]
    config_filepath: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct OutputPaths {
    preview_png: PathBuf,
    geojson: PathBuf,
    csv: PathBuf,
}

impl Default for OutputPaths {
    fn default() -> Self {
        Self {
            preview_png: PathBuf::from("test_buildings_preview.png"),
            geojson: PathBuf::from("test_buildings.geojson"),
            csv: PathBuf::from("test_buildings.3857.csv"),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(default)]
struct Config {
    query: FeatureQuery,
    target_epsg: EpsgCode,
    data_dir: PathBuf,
    preview_size_px: u32,
    output: OutputPaths,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Roughly 1.5 km² around Nairobi with dense building coverage.
            query: FeatureQuery {
                center: WgsPoint {
                    lat: -1.270192,
                    lon: 36.919725,
                },
                radius_m: 2500,
                tag_filter: TagFilter::HasKey {
                    key: "building".to_string(),
                },
            },
            target_epsg: EPSG_WEB_MERCATOR,
            data_dir: PathBuf::from("data"),
            preview_size_px: 2400,
            output: OutputPaths::default(),
        }
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::try_parse()?;
    let config = match args.config_filepath {
        Some(config_filepath) => {
            if !Path::new(&config_filepath).exists() {
                return Err(anyhow!("Config file {} not found", &config_filepath));
            }
            serde_yaml::from_str(&read_to_string(config_filepath)?)?
        }
        None => Config::default(),
    };

    log::info!("Syncing OSM data for query {:?}", config.query);
    let osm_filepath = sync_osm_data_to_file(&config.query, &config.data_dir)?;
    log::info!("Reading tagged ways");
    let features = read_tagged_features_from_file(&osm_filepath, &config.query.tag_filter)?;
    log::info!("Read {} features", features.len());

    let polygons = project_and_filter_polygons(features, EPSG_WGS84, config.target_epsg)?;
    log::info!("Kept {} polygon footprints", polygons.len());

    render_footprints(
        &polygons,
        &config.output.preview_png,
        &PreviewStyle {
            size_px: config.preview_size_px,
            ..Default::default()
        },
    )?;

    let spatial_ref = spatial_ref_from_epsg(config.target_epsg)?;
    write_features_to_geofile(
        &polygons,
        &config.output.geojson,
        Some(&spatial_ref),
        GdalDriverType::GeoJson.name(),
    )?;
    convert_geofile_to_wkt_csv(&config.output.geojson, &config.output.csv)?;
    embed_srid_in_wkt_csv(&config.output.csv, config.target_epsg)?;
    Ok(())
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();
    if let Err(e) = try_main() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1)
    }
}
