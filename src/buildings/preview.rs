use std::path::Path;

use anyhow::Context;
use geo::BoundingRect;
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use crate::geofile::feature::Feature;
use crate::geofile::remove_file_if_exists;

/// Canvas size and colors of the preview image.
pub struct PreviewStyle {
    pub size_px: u32,
    pub background: Rgb<u8>,
    pub foreground: Rgb<u8>,
}

impl Default for PreviewStyle {
    fn default() -> Self {
        Self {
            // A 4 inch figure at 600 dpi.
            size_px: 2400,
            background: Rgb([0x33, 0x33, 0x33]),
            foreground: Rgb([0xff, 0xff, 0xff]),
        }
    }
}

/// Render the polygon footprints onto a square canvas and save it as a PNG.
///
/// The joint bounding box of the collection is fitted into the canvas with
/// the aspect ratio preserved. A collection with nothing drawable still
/// produces an image of the background color.
pub fn render_footprints(
    features: &Vec<Feature>,
    output_filepath: &Path,
    style: &PreviewStyle,
) -> anyhow::Result<()> {
    remove_file_if_exists(output_filepath)?;
    let mut canvas = RgbImage::from_pixel(style.size_px, style.size_px, style.background);
    match joint_bounding_rect(features) {
        Some(bounds) => {
            let mapping = PixelMapping::new(&bounds, style.size_px);
            for feature in features {
                if let geo::Geometry::Polygon(polygon) = &feature.geometry {
                    fill_ring(&mut canvas, polygon.exterior(), &mapping, style.foreground);
                    // Courtyards get punched back out in the background color.
                    for interior in polygon.interiors() {
                        fill_ring(&mut canvas, interior, &mapping, style.background);
                    }
                }
            }
        }
        None => log::warn!("No footprints to render, writing an empty preview"),
    }
    log::info!(
        "Writing {}x{} preview to {:?}",
        style.size_px,
        style.size_px,
        output_filepath
    );
    canvas.save(output_filepath).context("Saving preview image")?;
    Ok(())
}

fn joint_bounding_rect(features: &Vec<Feature>) -> Option<geo::Rect> {
    features
        .iter()
        .filter_map(|feature| feature.geometry.bounding_rect())
        .reduce(|merged, rect| {
            geo::Rect::new(
                geo::Coord {
                    x: merged.min().x.min(rect.min().x),
                    y: merged.min().y.min(rect.min().y),
                },
                geo::Coord {
                    x: merged.max().x.max(rect.max().x),
                    y: merged.max().y.max(rect.max().y),
                },
            )
        })
}

/// World-to-pixel transform: uniform scale, centered, y axis flipped.
struct PixelMapping {
    min_x: f64,
    min_y: f64,
    scale: f64,
    x_offset: f64,
    y_offset: f64,
    size_px: f64,
}

impl PixelMapping {
    fn new(bounds: &geo::Rect, size_px: u32) -> Self {
        const MARGIN_FRACTION: f64 = 0.02;
        let size_px = size_px as f64;
        let margin = size_px * MARGIN_FRACTION;
        let extent = bounds.width().max(bounds.height());
        let scale = if extent > 0.0 {
            (size_px - 2.0 * margin) / extent
        } else {
            1.0
        };
        Self {
            min_x: bounds.min().x,
            min_y: bounds.min().y,
            scale,
            x_offset: (size_px - bounds.width() * scale) / 2.0,
            y_offset: (size_px - bounds.height() * scale) / 2.0,
            size_px,
        }
    }

    fn apply(&self, coord: &geo::Coord) -> Point<i32> {
        let x = self.x_offset + (coord.x - self.min_x) * self.scale;
        // Raster rows grow downward.
        let y = self.size_px - self.y_offset - (coord.y - self.min_y) * self.scale;
        Point::new(x.round() as i32, y.round() as i32)
    }
}

fn fill_ring(canvas: &mut RgbImage, ring: &geo::LineString, mapping: &PixelMapping, color: Rgb<u8>) {
    let mut points: Vec<Point<i32>> = Vec::new();
    for coord in ring.coords() {
        let point = mapping.apply(coord);
        if points.last() != Some(&point) {
            points.push(point);
        }
    }
    // draw_polygon_mut wants an open path.
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        // The ring collapsed at this resolution.
        return;
    }
    draw_polygon_mut(canvas, &points, color);
}
