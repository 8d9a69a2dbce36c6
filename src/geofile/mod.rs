pub mod feature;
pub mod gdal_geofile;
pub mod wkt_csv;

use std::{fs, io, path::Path};

/// Delete a file so the next write starts fresh. A missing file is a no-op.
pub fn remove_file_if_exists(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}
