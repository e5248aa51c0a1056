use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::foundation::{
    core::{AssetId, CategoryId, FontId, LogoId, Rgb, TemplateId, UserId, VersionId},
    error::{EmblemError, EmblemResult},
};

/// Broad media class of an asset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Raster,
    Vector,
    Font,
    Pattern,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One extracted palette color and the fraction of pixels it covers.
pub struct PaletteEntry {
    pub color: Rgb,
    pub ratio: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// An externally stored media object referenced by layers.
///
/// Assets are immutable-by-reference inputs to rendering. Template
/// instantiation shares them; only [`crate::AssetService`] mutates the set.
pub struct Asset {
    pub id: AssetId,
    pub kind: AssetKind,
    pub name: String,
    /// Storage backend tag (e.g. `memory`, a provider name).
    pub storage: String,
    pub url: String,
    /// Provider-side identity used for delete and URL transforms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_id: Option<String>,
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub byte_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_alpha: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dominant: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub palette: Option<Vec<PaletteEntry>>,
    /// Inline markup for vector assets; embedded directly by the renderer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_sha256: Option<String>,
    /// Free-form provider/ingest metadata.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub meta: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Face style of a registered font.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A registered font face, unique per `(family, weight, style)`.
pub struct Font {
    pub id: FontId,
    pub family: String,
    #[serde(default)]
    pub style: FontStyle,
    /// Numeric weight (100..900 in practice).
    pub weight: u16,
    pub url: String,
    /// Family names tried after `family`, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fallbacks: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Font {
    /// Uniqueness key enforced by the store.
    pub fn identity_key(&self) -> (String, u16, FontStyle) {
        (self.family.clone(), self.weight, self.style)
    }

    /// `family` followed by its fallbacks, for a CSS `font-family` list.
    pub fn family_stack(&self) -> Vec<&str> {
        let mut stack = vec![self.family.as_str()];
        stack.extend(self.fallbacks.iter().map(String::as_str));
        stack
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Grouping for templates and logos.
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_asset_id: Option<AssetId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A reusable starting point: its base logo is deep-copied on instantiation,
/// with assets shared by reference.
pub struct Template {
    pub id: TemplateId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    pub base_logo_id: LogoId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One immutable entry of a logo's append-only version trail.
pub struct LogoVersion {
    pub id: VersionId,
    pub logo_id: LogoId,
    /// Self-contained snapshot document (see [`crate::Snapshot`]).
    pub snapshot: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Resolved asset and font references handed to the renderer.
///
/// External IO is front-loaded here so rendering itself stays pure: callers
/// collect every referenced asset/font before the render starts.
#[derive(Clone, Debug, Default)]
pub struct AssetCatalog {
    assets: BTreeMap<AssetId, Asset>,
    fonts: BTreeMap<FontId, Font>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_asset(&mut self, asset: Asset) {
        self.assets.insert(asset.id, asset);
    }

    pub fn insert_font(&mut self, font: Font) {
        self.fonts.insert(font.id, font);
    }

    /// Asset lookup; a miss is a hard [`EmblemError::NotFound`].
    pub fn require_asset(&self, id: AssetId) -> EmblemResult<&Asset> {
        self.assets
            .get(&id)
            .ok_or_else(|| EmblemError::not_found("asset", id))
    }

    /// Font lookup; a miss means "fall back to the default face", never an
    /// error.
    pub fn font(&self, id: FontId) -> Option<&Font> {
        self.fonts.get(&id)
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/asset.rs"]
mod tests;
