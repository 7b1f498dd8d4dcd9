//! Rasterize the panel's SVG preview for display in the terminal.

use anyhow::{anyhow, Context, Result};
use image::{DynamicImage, RgbaImage};
use resvg::usvg;
use tiny_skia::{Color, Pixmap, Transform};

/// Pixel size of the rendered preview (the viewBox is 100x100 units).
pub const PREVIEW_PIXELS: u32 = 200;

/// Render SVG markup to a square RGBA image on a white background.
pub fn render_svg(markup: &str) -> Result<DynamicImage> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(markup, &options).context("failed to parse preview SVG")?;

    let mut pixmap = Pixmap::new(PREVIEW_PIXELS, PREVIEW_PIXELS)
        .ok_or_else(|| anyhow!("failed to create pixmap"))?;
    pixmap.fill(Color::WHITE);

    let size = tree.size();
    let scale_x = PREVIEW_PIXELS as f32 / size.width();
    let scale_y = PREVIEW_PIXELS as f32 / size.height();
    resvg::render(
        &tree,
        Transform::from_scale(scale_x, scale_y),
        &mut pixmap.as_mut(),
    );

    let rgba = RgbaImage::from_raw(PREVIEW_PIXELS, PREVIEW_PIXELS, pixmap.take())
        .ok_or_else(|| anyhow!("failed to create image"))?;

    Ok(DynamicImage::ImageRgba8(rgba))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hectare::{polygon_svg, Point};

    #[test]
    fn renders_polygon_inside_viewbox() {
        let ring = vec![
            Point::new(10.0, 10.0),
            Point::new(90.0, 10.0),
            Point::new(90.0, 90.0),
            Point::new(10.0, 90.0),
            Point::new(10.0, 10.0),
        ];
        let markup = hectare::force_fill(&polygon_svg(&ring), "black").unwrap();
        let image = render_svg(&markup).unwrap().to_rgba8();

        assert_eq!(image.dimensions(), (PREVIEW_PIXELS, PREVIEW_PIXELS));
        // Middle is filled black, corner stays white
        let center = image.get_pixel(PREVIEW_PIXELS / 2, PREVIEW_PIXELS / 2);
        assert!(center[0] < 50 && center[1] < 50 && center[2] < 50, "{:?}", center);
        let corner = image.get_pixel(1, 1);
        assert_eq!(corner[0], 255);
    }

    #[test]
    fn invalid_markup_is_an_error() {
        assert!(render_svg("<not-svg/>").is_err());
    }
}
