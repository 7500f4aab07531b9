// File: crates/ticker-core/src/raster.rs
// Summary: Per-render CPU raster surface and PNG flattening.

use std::io::Cursor;

use skia_safe as skia;

use crate::error::{Error, Result};

/// Drawing context owned by exactly one render call.
pub struct Raster {
    surface: skia::Surface,
    width: i32,
    height: i32,
}

impl Raster {
    /// Create a fresh surface. Zero or negative sizes fail before any drawing.
    pub fn new(width: i32, height: i32) -> Result<Self> {
        if width <= 0 || height <= 0 {
            return Err(Error::config(format!("surface size must be positive, got {width}x{height}")));
        }
        let mut surface = skia::surfaces::raster_n32_premul((width, height))
            .ok_or_else(|| Error::render(format!("failed to create {width}x{height} raster surface")))?;
        surface.canvas().clear(skia::Color::TRANSPARENT);
        Ok(Self { surface, width, height })
    }

    /// Same as [`Raster::new`] for callers holding floating-point sizes.
    pub fn from_f32(width: f32, height: f32) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) {
            return Err(Error::config(format!("surface size must be finite, got {width}x{height}")));
        }
        Self::new(width.round() as i32, height.round() as i32)
    }

    pub fn width(&self) -> i32 { self.width }
    pub fn height(&self) -> i32 { self.height }

    pub fn canvas(&mut self) -> &skia::Canvas {
        self.surface.canvas()
    }

    /// Immutable copy of the current pixels, for compositing into another canvas.
    pub fn snapshot(&mut self) -> skia::Image {
        self.surface.image_snapshot()
    }

    /// Read back unpremultiplied RGBA8 pixels (row stride = width * 4).
    pub fn to_rgba8(&mut self) -> Result<Vec<u8>> {
        let info = skia::ImageInfo::new(
            (self.width, self.height),
            skia::ColorType::RGBA8888,
            skia::AlphaType::Unpremul,
            None,
        );
        let row_bytes = self.width as usize * 4;
        let mut pixels = vec![0u8; row_bytes * self.height as usize];
        if !self.surface.read_pixels(&info, &mut pixels, row_bytes, (0, 0)) {
            return Err(Error::render("pixel readback failed"));
        }
        Ok(pixels)
    }

    /// Flatten to PNG bytes. Consumes the context.
    pub fn into_png(mut self) -> Result<Vec<u8>> {
        let pixels = self.to_rgba8()?;
        encode_png(self.width as u32, self.height as u32, pixels)
    }
}

/// Encode RGBA8 pixels as PNG.
pub fn encode_png(width: u32, height: u32, rgba: Vec<u8>) -> Result<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| Error::render("pixel buffer does not match surface size"))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| Error::render(format!("encode PNG failed: {e}")))?;
    Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_surfaces() {
        assert!(matches!(Raster::new(0, 10), Err(Error::Config(_))));
        assert!(matches!(Raster::from_f32(f32::NAN, 10.0), Err(Error::Config(_))));
    }

    #[test]
    fn png_has_header_and_size() {
        let mut raster = Raster::new(8, 4).unwrap();
        raster.canvas().clear(skia::Color::from_rgb(10, 20, 30));
        let png = raster.into_png().unwrap();
        assert!(png.starts_with(&[137, 80, 78, 71]));
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 4));
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }
}
