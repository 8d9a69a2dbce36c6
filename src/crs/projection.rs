use anyhow::anyhow;
use proj::Transform;

use crate::geofile::feature::Feature;

use super::crs_utils::{epsg_code_to_authority_string, EpsgCode};

/// Reproject every feature geometry in place.
///
/// One transformation is constructed for the whole collection, so all
/// features must share `from_epsg` on entry; they all share `to_epsg` on
/// return.
pub fn project_features(
    features: &mut Vec<Feature>,
    from_epsg: EpsgCode,
    to_epsg: EpsgCode,
) -> anyhow::Result<()> {
    let projection = proj::Proj::new_known_crs(
        &epsg_code_to_authority_string(from_epsg),
        &epsg_code_to_authority_string(to_epsg),
        None,
    )?;
    for feature in features.iter_mut() {
        feature
            .geometry
            .transform(&projection)
            .map_err(|err| anyhow!("Could not project feature {}, {}", feature.id, err))?;
    }
    Ok(())
}
