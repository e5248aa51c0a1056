use crate::foundation::{
    core::{Canvas, CategoryId},
    error::EmblemResult,
};
use crate::model::logo::{BlendMode, Layer, LayerPayload, Logo, Shadow};

/// Partial update of a [`Logo`] with named optional fields.
///
/// `None` leaves a field unchanged. For clearable fields the inner option
/// distinguishes "set" (`Some(Some(v))`) from "clear" (`Some(None)`).
/// Arbitrary caller-supplied field names never reach a write path; this
/// struct is the whole update surface.
#[derive(Clone, Debug, Default)]
pub struct LogoPatch {
    pub title: Option<String>,
    pub canvas: Option<Canvas>,
    pub dpi: Option<Option<u32>>,
    pub thumbnail_url: Option<Option<String>>,
    pub category_id: Option<Option<CategoryId>>,
    pub is_template: Option<bool>,
}

impl LogoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.canvas.is_none()
            && self.dpi.is_none()
            && self.thumbnail_url.is_none()
            && self.category_id.is_none()
            && self.is_template.is_none()
    }

    /// Merge into `logo`, validating the merged value before anything
    /// observes it. On error `logo` is left untouched.
    pub fn apply_to(&self, logo: &mut Logo) -> EmblemResult<()> {
        let mut merged = logo.clone();
        if let Some(title) = &self.title {
            merged.title = title.clone();
        }
        if let Some(canvas) = self.canvas {
            merged.canvas = canvas;
        }
        if let Some(dpi) = self.dpi {
            merged.dpi = dpi;
        }
        if let Some(url) = &self.thumbnail_url {
            merged.thumbnail_url = url.clone();
        }
        if let Some(category) = self.category_id {
            merged.category_id = category;
        }
        if let Some(is_template) = self.is_template {
            merged.is_template = is_template;
        }
        merged.validate()?;
        *logo = merged;
        Ok(())
    }
}

/// Partial update of a [`Layer`] with named optional fields.
///
/// `z_index` is deliberately absent: ordering changes go through the reorder
/// operation so the dense permutation is maintained in one atomic region.
/// Replacing `payload` may change the layer's kind.
#[derive(Clone, Debug, Default)]
pub struct LayerPatch {
    pub name: Option<String>,
    pub x_norm: Option<f64>,
    pub y_norm: Option<f64>,
    pub scale: Option<f64>,
    pub rotation_deg: Option<f64>,
    pub anchor_x: Option<f64>,
    pub anchor_y: Option<f64>,
    pub opacity: Option<f64>,
    pub blend_mode: Option<BlendMode>,
    pub is_visible: Option<bool>,
    pub is_locked: Option<bool>,
    pub shadow: Option<Option<Shadow>>,
    pub payload: Option<LayerPayload>,
}

impl LayerPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.x_norm.is_none()
            && self.y_norm.is_none()
            && self.scale.is_none()
            && self.rotation_deg.is_none()
            && self.anchor_x.is_none()
            && self.anchor_y.is_none()
            && self.opacity.is_none()
            && self.blend_mode.is_none()
            && self.is_visible.is_none()
            && self.is_locked.is_none()
            && self.shadow.is_none()
            && self.payload.is_none()
    }

    /// Merge into `layer`, validating the merged value before anything
    /// observes it. On error `layer` is left untouched.
    pub fn apply_to(&self, layer: &mut Layer) -> EmblemResult<()> {
        let mut merged = layer.clone();
        if let Some(name) = &self.name {
            merged.name = name.clone();
        }
        if let Some(v) = self.x_norm {
            merged.x_norm = v;
        }
        if let Some(v) = self.y_norm {
            merged.y_norm = v;
        }
        if let Some(v) = self.scale {
            merged.scale = v;
        }
        if let Some(v) = self.rotation_deg {
            merged.rotation_deg = v;
        }
        if let Some(v) = self.anchor_x {
            merged.anchor_x = v;
        }
        if let Some(v) = self.anchor_y {
            merged.anchor_y = v;
        }
        if let Some(v) = self.opacity {
            merged.opacity = v;
        }
        if let Some(v) = self.blend_mode {
            merged.blend_mode = v;
        }
        if let Some(v) = self.is_visible {
            merged.is_visible = v;
        }
        if let Some(v) = self.is_locked {
            merged.is_locked = v;
        }
        if let Some(shadow) = self.shadow {
            merged.shadow = shadow;
        }
        if let Some(payload) = &self.payload {
            merged.payload = payload.clone();
        }
        merged.validate()?;
        *layer = merged;
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/patch.rs"]
mod tests;
