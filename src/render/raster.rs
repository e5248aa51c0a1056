//! Bitmap renditions of composed documents via usvg/resvg.

use std::io::Cursor;

use anyhow::Context as _;

use crate::foundation::error::{EmblemError, EmblemResult};

/// Output encoding for rasterized exports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RasterFormat {
    #[default]
    Png,
    /// Lossy; honors the quality knob. Alpha is flattened onto white.
    Jpeg,
}

impl RasterFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

/// Parse a composed SVG document and rasterize it at `width x height`.
#[tracing::instrument(skip(svg), fields(bytes = svg.len(), width, height))]
pub fn rasterize(svg: &str, width: u32, height: u32) -> EmblemResult<image::RgbaImage> {
    if width == 0 || height == 0 {
        return Err(EmblemError::validation(
            "raster.size",
            "target dimensions must be >= 1",
        ));
    }

    let mut options = usvg::Options::default();
    options.fontdb_mut().load_system_fonts();
    let tree = usvg::Tree::from_str(svg, &options)
        .map_err(|e| anyhow::anyhow!(e))
        .context("parse composed document")?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height).context("allocate pixmap")?;
    let scale_x = width as f32 / tree.size().width();
    let scale_y = height as f32 / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(scale_x, scale_y),
        &mut pixmap.as_mut(),
    );

    // The pixmap holds premultiplied RGBA; the image crate wants straight
    // alpha.
    let mut data = pixmap.take();
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        if a != 0 && a != 255 {
            let a16 = u16::from(a);
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * 255 + a16 / 2) / a16).min(255) as u8;
            }
        }
    }
    let img = image::RgbaImage::from_raw(width, height, data).context("pixmap buffer size")?;
    Ok(img)
}

/// Encode pixels for delivery; quality only affects lossy formats.
pub fn encode(img: &image::RgbaImage, format: RasterFormat, quality: u8) -> EmblemResult<Vec<u8>> {
    let mut bytes = Vec::new();
    match format {
        RasterFormat::Png => {
            img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
                .map_err(|e| anyhow::anyhow!(e))
                .context("encode png")?;
        }
        RasterFormat::Jpeg => {
            let flat = flatten_onto_white(img);
            let mut cursor = Cursor::new(&mut bytes);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut cursor,
                quality.clamp(1, 100),
            );
            flat.write_with_encoder(encoder)
                .map_err(|e| anyhow::anyhow!(e))
                .context("encode jpeg")?;
        }
    }
    Ok(bytes)
}

fn flatten_onto_white(img: &image::RgbaImage) -> image::RgbImage {
    image::RgbImage::from_fn(img.width(), img.height(), |x, y| {
        let px = img.get_pixel(x, y);
        let a = u16::from(px[3]);
        let blend = |c: u8| ((u16::from(c) * a + 255 * (255 - a)) / 255) as u8;
        image::Rgb([blend(px[0]), blend(px[1]), blend(px[2])])
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
