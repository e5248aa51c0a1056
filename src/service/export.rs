//! Deadline-aware export paths: the composed SVG document, an uploaded PNG
//! rendition, and the thumbnail side effect.

use std::collections::BTreeSet;

use crate::foundation::{
    core::LogoId,
    error::{EmblemError, EmblemResult},
};
use crate::model::asset::AssetCatalog;
use crate::model::logo::{Layer, Logo};
use crate::model::patch::LogoPatch;
use crate::render::compose::{RenderOptions, render_svg};
use crate::render::raster::{RasterFormat, encode, rasterize};
use crate::store::logo::LogoStore;
use crate::store::media::{DEFAULT_FOLDER, MediaStore};

/// Edge length of a generated thumbnail when the caller does not size it.
pub const THUMBNAIL_SIZE: u32 = 300;

/// Rendition record returned by [`ExportService::export_png`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PngExport {
    pub download_url: String,
    pub provider_id: String,
    pub width: u32,
    pub height: u32,
    pub byte_size: u64,
}

/// Rendition record returned by [`ExportService::thumbnail`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ThumbnailExport {
    pub thumbnail_url: String,
    pub width: u32,
    pub height: u32,
}

/// Export surface over a logo's persisted state.
///
/// `thumbnail` is the one path with a persistence side effect: it writes the
/// fresh thumbnail URL back onto the logo record. Everything else only
/// reads. Deadlines abort between phases, never after a write has begun.
pub struct ExportService<'a, S, M> {
    logos: &'a S,
    media: &'a M,
}

impl<'a, S: LogoStore, M: MediaStore> ExportService<'a, S, M> {
    pub fn new(logos: &'a S, media: &'a M) -> Self {
        Self { logos, media }
    }

    /// Compose the logo into a standalone SVG document.
    #[tracing::instrument(skip_all, fields(logo = %logo_id))]
    pub fn export_svg(&self, logo_id: LogoId, options: &RenderOptions) -> EmblemResult<String> {
        let (_, svg) = self.document(logo_id, options)?;
        Ok(svg)
    }

    /// Rasterize a PNG rendition and upload it for download.
    #[tracing::instrument(skip_all, fields(logo = %logo_id))]
    pub fn export_png(&self, logo_id: LogoId, options: &RenderOptions) -> EmblemResult<PngExport> {
        let (logo, svg) = self.document(logo_id, options)?;
        let (width, height) = options.resolve_size(logo.canvas);

        options.deadline.check("rasterize")?;
        let image = rasterize(&svg, width, height)?;
        let bytes = encode(&image, RasterFormat::Png, 90)?;

        options.deadline.check("upload")?;
        let name = format!("logo-{logo_id}.png");
        let uploaded = self.media.upload(&bytes, &name, "image/png", DEFAULT_FOLDER)?;
        Ok(PngExport {
            download_url: uploaded.url,
            provider_id: uploaded.provider_id,
            width,
            height,
            byte_size: uploaded.byte_size,
        })
    }

    /// Render a reduced rendition, upload it, and persist its URL onto the
    /// logo record.
    #[tracing::instrument(skip_all, fields(logo = %logo_id))]
    pub fn thumbnail(
        &self,
        logo_id: LogoId,
        options: &RenderOptions,
    ) -> EmblemResult<ThumbnailExport> {
        let width = options.width.unwrap_or(THUMBNAIL_SIZE);
        let height = options.height.unwrap_or(THUMBNAIL_SIZE);
        let sized = RenderOptions {
            width: Some(width),
            height: Some(height),
            deadline: options.deadline,
        };
        let (_, svg) = self.document(logo_id, &sized)?;

        sized.deadline.check("rasterize")?;
        let image = rasterize(&svg, width, height)?;
        let bytes = encode(&image, RasterFormat::Png, 80)?;

        sized.deadline.check("upload")?;
        let name = format!("logo-{logo_id}-thumb.png");
        let uploaded = self.media.upload(&bytes, &name, "image/png", DEFAULT_FOLDER)?;

        sized.deadline.check("persist")?;
        let patch = LogoPatch {
            thumbnail_url: Some(Some(uploaded.url.clone())),
            ..LogoPatch::default()
        };
        self.logos.update_logo(logo_id, &patch)?;
        Ok(ThumbnailExport {
            thumbnail_url: uploaded.url,
            width,
            height,
        })
    }

    fn document(&self, logo_id: LogoId, options: &RenderOptions) -> EmblemResult<(Logo, String)> {
        let logo = self.logos.fetch_logo(logo_id)?;
        let layers = self.logos.fetch_layers(logo_id)?;
        let catalog = self.collect_catalog(&layers)?;
        let svg = render_svg(&logo, &layers, &catalog, options)?;
        Ok((logo, svg))
    }

    /// Resolve every asset and font the stack references. A missing asset
    /// fails the export; a missing font falls back to the default face.
    fn collect_catalog(&self, layers: &[Layer]) -> EmblemResult<AssetCatalog> {
        let mut asset_ids = BTreeSet::new();
        let mut font_ids = BTreeSet::new();
        for layer in layers {
            if let Some(id) = layer.payload.asset_ref() {
                asset_ids.insert(id);
            }
            if let Some(id) = layer.payload.font_ref() {
                font_ids.insert(id);
            }
        }

        let mut catalog = AssetCatalog::new();
        for id in asset_ids {
            catalog.insert_asset(self.logos.fetch_asset(id)?);
        }
        for id in font_ids {
            match self.logos.fetch_font(id) {
                Ok(font) => catalog.insert_font(font),
                Err(EmblemError::NotFound { .. }) => {
                    tracing::debug!(font = %id, "font reference missing; using the default face");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(catalog)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/export.rs"]
mod tests;
