pub type EpsgCode = u32;

/// Geographic WGS84, the CRS of everything the Overpass API returns.
pub const EPSG_WGS84: EpsgCode = 4326;

/// Web mercator, the default target CRS of the export.
pub const EPSG_WEB_MERCATOR: EpsgCode = 3857;

pub fn epsg_code_to_authority_string(code: EpsgCode) -> String {
    format!("EPSG:{}", code)
}

pub fn spatial_ref_from_epsg(code: EpsgCode) -> anyhow::Result<gdal::spatial_ref::SpatialRef> {
    gdal::spatial_ref::SpatialRef::from_epsg(code)
        .map_err(|err| anyhow::anyhow!("Could not create SpatialRef for EPSG:{}. {}", code, err))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{epsg_code_to_authority_string, spatial_ref_from_epsg, EPSG_WEB_MERCATOR};

    #[rstest]
    #[case(4326, "EPSG:4326")]
    #[case(3857, "EPSG:3857")]
    #[case(32654, "EPSG:32654")]
    fn test_epsg_code_to_authority_string(#[case] code: u32, #[case] expected: &str) {
        assert_eq!(epsg_code_to_authority_string(code), expected);
    }

    #[rstest]
    fn test_spatial_ref_from_epsg() {
        let spatial_ref = spatial_ref_from_epsg(EPSG_WEB_MERCATOR).unwrap();
        assert_eq!(spatial_ref.auth_code().unwrap(), EPSG_WEB_MERCATOR as i32);
        assert!(spatial_ref.is_projected());
    }
}
