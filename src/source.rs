//! Source images and the decode / encode collaborators at the crate boundary.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use crate::error::SheetError;
use crate::fit::SourceRect;
use crate::render::RenderTarget;

/// A decoded photo. The pixel data is shared and never mutated.
///
/// A handle may outlive its pixels (for example a decode that was dropped);
/// such an image still has dimensions for layout purposes but sampling it
/// fails and its slot is drawn as a placeholder.
#[derive(Debug, Clone)]
pub struct SourceImage {
    name: String,
    width: u32,
    height: u32,
    pixels: Option<Arc<RgbaImage>>,
}

impl SourceImage {
    pub fn from_rgba(name: impl Into<String>, pixels: RgbaImage) -> Self {
        let (width, height) = pixels.dimensions();
        Self {
            name: name.into(),
            width,
            height,
            pixels: Some(Arc::new(pixels)),
        }
    }

    pub fn from_dynamic(name: impl Into<String>, image: &DynamicImage) -> Self {
        Self::from_rgba(name, image.to_rgba8())
    }

    /// A handle with known dimensions but no readable pixel data
    pub fn unreadable(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pixels: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Pixels of the whole image, if they can be read
    pub fn pixels(&self) -> Result<&RgbaImage, SheetError> {
        match &self.pixels {
            Some(p)
                if p.dimensions() == (self.width, self.height)
                    && self.width > 0
                    && self.height > 0 =>
            {
                Ok(&**p)
            }
            _ => Err(SheetError::UnreadableImage(self.name.clone())),
        }
    }

    /// Copy out the whole-pixel window covering `rect`
    pub fn sample(&self, rect: &SourceRect) -> Result<RgbaImage, SheetError> {
        let pixels = self.pixels()?;
        let (x, y, w, h) = rect.to_pixel_bounds(self.width, self.height);
        Ok(image::imageops::crop_imm(pixels, x, y, w, h).to_image())
    }
}

/// Turns encoded bytes into a [`SourceImage`]
pub trait ImageDecoder {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<SourceImage, SheetError>;
}

/// Decoder backed by the `image` crate (PNG and JPEG)
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterDecoder;

impl ImageDecoder for RasterDecoder {
    fn decode(&self, name: &str, bytes: &[u8]) -> Result<SourceImage, SheetError> {
        let img = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| SheetError::Decode(format!("{}: {}", name, e)))?
            .decode()
            .map_err(|e| SheetError::Decode(format!("{}: {}", name, e)))?;
        if img.width() == 0 || img.height() == 0 {
            return Err(SheetError::Decode(format!("{}: image has no pixels", name)));
        }
        Ok(SourceImage::from_dynamic(name, &img))
    }
}

impl RasterDecoder {
    pub fn decode_file(&self, path: &Path) -> Result<SourceImage, SheetError> {
        let bytes = std::fs::read(path)?;
        self.decode(&path.display().to_string(), &bytes)
    }
}

/// Turns a finished sheet into bytes for a file or printer
pub trait Exporter {
    fn export(&self, target: &RenderTarget) -> Result<Vec<u8>, SheetError>;

    /// Conventional file extension for the output
    fn extension(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PngExporter;

impl Exporter for PngExporter {
    fn export(&self, target: &RenderTarget) -> Result<Vec<u8>, SheetError> {
        let image = target.image();
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(
                image.as_raw(),
                image.width(),
                image.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(|e| SheetError::Encode(e.to_string()))?;
        Ok(out)
    }

    fn extension(&self) -> &'static str {
        "png"
    }
}

/// JPEG output; the alpha channel is dropped since sheets are opaque.
#[derive(Debug, Clone, Copy)]
pub struct JpegExporter {
    pub quality: u8,
}

impl Default for JpegExporter {
    fn default() -> Self {
        Self { quality: 95 }
    }
}

impl Exporter for JpegExporter {
    fn export(&self, target: &RenderTarget) -> Result<Vec<u8>, SheetError> {
        let rgb = DynamicImage::ImageRgba8(target.image().clone()).to_rgb8();
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.quality)
            .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
            .map_err(|e| SheetError::Encode(e.to_string()))?;
        Ok(out)
    }

    fn extension(&self) -> &'static str {
        "jpg"
    }
}

/// Pick an exporter from an output file extension
pub fn exporter_for_path(path: &Path) -> Option<Box<dyn Exporter>> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some(Box::new(PngExporter)),
        "jpg" | "jpeg" => Some(Box::new(JpegExporter::default())),
        _ => None,
    }
}
