use anyhow::{anyhow, Ok};
use geohash::{encode, Coord};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

const OVERPASS_INTERPRETER_URL: &str = "https://overpass-api.de/api/interpreter";

/// Server-side timeout passed to Overpass, in seconds.
const OVERPASS_TIMEOUT_S: u32 = 180;

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct WgsPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Tag predicate applied server-side by Overpass and again when converting
/// the response.
#[derive(Deserialize, Debug, Clone)]
pub enum TagFilter {
    /// The tag key is present with any value, e.g. building=*.
    HasKey { key: String },
    /// The tag key is present with exactly this value, e.g. building=church.
    KeyEquals { key: String, value: String },
}

impl TagFilter {
    pub fn key(&self) -> &str {
        match self {
            TagFilter::HasKey { key } => key,
            TagFilter::KeyEquals { key, .. } => key,
        }
    }

    pub fn matches(&self, key: &str, value: &str) -> bool {
        match self {
            TagFilter::HasKey { key: wanted } => key == wanted,
            TagFilter::KeyEquals { key: wanted, value: wanted_value } => {
                key == wanted && value == wanted_value
            }
        }
    }

    fn to_overpass_filter(&self) -> String {
        match self {
            TagFilter::HasKey { key } => format!("[\"{}\"]", key),
            TagFilter::KeyEquals { key, value } => format!("[\"{}\"=\"{}\"]", key, value),
        }
    }

    /// Filesystem-safe token used in cache filenames.
    fn cache_token(&self) -> String {
        match self {
            TagFilter::HasKey { key } => key.clone(),
            TagFilter::KeyEquals { key, value } => format!("{}={}", key, value),
        }
    }
}

/// Everything the Overpass query needs: where to look and what to keep.
#[derive(Deserialize, Debug, Clone)]
pub struct FeatureQuery {
    pub center: WgsPoint,
    pub radius_m: u32,
    pub tag_filter: TagFilter,
}

/// Render the Overpass QL for all ways matching the tag filter within the
/// radius, plus the nodes they reference. XML output, so the response parses
/// with osm-xml.
pub fn build_overpass_query(query: &FeatureQuery) -> String {
    format!(
        "[out:xml][timeout:{}];way{}(around:{},{},{});(._;>;);out body;",
        OVERPASS_TIMEOUT_S,
        query.tag_filter.to_overpass_filter(),
        query.radius_m,
        query.center.lat,
        query.center.lon
    )
}

pub fn get_filename_for_query(query: &FeatureQuery) -> anyhow::Result<String> {
    const GEOHASH_LENGTH: usize = 8;
    let center_coord = Coord {
        x: query.center.lon,
        y: query.center.lat,
    };
    let center_geohash = encode(center_coord, GEOHASH_LENGTH)?;
    Ok(format!(
        "{}_{}m_{}_osm.xml",
        center_geohash,
        query.radius_m,
        query.tag_filter.cache_token()
    ))
}

pub fn download_osm_data(query: &FeatureQuery) -> anyhow::Result<String> {
    let client = reqwest::blocking::Client::builder()
        .user_agent("building_fixtures")
        // Large queries can take a while; Overpass enforces its own timeout.
        .timeout(None)
        .build()?;
    let response = client
        .post(OVERPASS_INTERPRETER_URL)
        .body(build_overpass_query(query))
        .send()?;
    response.text().or(Err(anyhow!("No response text")))
}

/// Download the query result into `output_dir`, reusing a previously
/// downloaded file for the same query if one exists.
pub fn sync_osm_data_to_file(query: &FeatureQuery, output_dir: &Path) -> anyhow::Result<PathBuf> {
    let filename = get_filename_for_query(query)?;
    let output_filepath = output_dir.join(filename);
    if output_filepath.exists() {
        log::info!(
            "Local file exists for OSM data: {:?}",
            output_filepath.canonicalize()
        );
        return Ok(output_filepath);
    }

    log::info!("Downloading OSM data");
    let osm_data = download_osm_data(query)?;
    fs::create_dir_all(output_dir)?;
    fs::write(&output_filepath, osm_data).or(Err(anyhow!("Could not write OSM data to file")))?;
    Ok(output_filepath)
}
