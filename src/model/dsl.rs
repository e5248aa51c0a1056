use chrono::Utc;

use crate::foundation::{
    core::{AssetId, Canvas, CategoryId, LayerId, LogoId, Paint, Rgb, UserId},
    error::EmblemResult,
};
use crate::model::logo::{
    BackgroundStyle, BlendMode, Gradient, IconLayer, ImageLayer, Layer, LayerPayload, Logo,
    Shadow, ShapeGeometry, ShapeLayer, TextLayer, validate_stack,
};

/// Builder for a [`Logo`] plus its layer stack.
///
/// Layers are appended bottom-up; the first added layer paints first.
/// `build()` mints identities, assigns dense z-indices in insertion order,
/// and validates the whole stack.
pub struct LogoBuilder {
    owner_id: UserId,
    title: String,
    canvas: Canvas,
    dpi: Option<u32>,
    category_id: Option<CategoryId>,
    is_template: bool,
    layers: Vec<LayerBuilder>,
}

impl LogoBuilder {
    pub fn new(owner_id: UserId, title: impl Into<String>) -> Self {
        Self {
            owner_id,
            title: title.into(),
            canvas: Canvas::DEFAULT,
            dpi: None,
            category_id: None,
            is_template: false,
            layers: Vec::new(),
        }
    }

    pub fn canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.dpi = Some(dpi);
        self
    }

    pub fn category(mut self, category: CategoryId) -> Self {
        self.category_id = Some(category);
        self
    }

    pub fn template(mut self, is_template: bool) -> Self {
        self.is_template = is_template;
        self
    }

    /// Append a layer on top of the current stack.
    pub fn layer(mut self, layer: LayerBuilder) -> Self {
        self.layers.push(layer);
        self
    }

    pub fn build(self) -> EmblemResult<(Logo, Vec<Layer>)> {
        let now = Utc::now();
        let logo = Logo {
            id: LogoId::new(),
            owner_id: self.owner_id,
            title: self.title,
            canvas: self.canvas,
            dpi: self.dpi,
            thumbnail_url: None,
            is_template: self.is_template,
            category_id: self.category_id,
            created_at: now,
            updated_at: now,
        };

        let layers = self
            .layers
            .into_iter()
            .enumerate()
            .map(|(z, builder)| builder.into_layer(logo.id, z as u32))
            .collect::<Vec<_>>();

        validate_stack(&logo, &layers)?;
        Ok((logo, layers))
    }
}

/// Builder for a single [`Layer`].
///
/// Defaults mirror a freshly placed element: centered, unit scale, fully
/// opaque, visible, normal blending.
pub struct LayerBuilder {
    name: String,
    x_norm: f64,
    y_norm: f64,
    scale: f64,
    rotation_deg: f64,
    anchor_x: f64,
    anchor_y: f64,
    opacity: f64,
    blend_mode: BlendMode,
    is_visible: bool,
    is_locked: bool,
    shadow: Option<Shadow>,
    payload: LayerPayload,
}

impl LayerBuilder {
    pub fn new(name: impl Into<String>, payload: LayerPayload) -> Self {
        Self {
            name: name.into(),
            x_norm: 0.5,
            y_norm: 0.5,
            scale: 1.0,
            rotation_deg: 0.0,
            anchor_x: 0.5,
            anchor_y: 0.5,
            opacity: 1.0,
            blend_mode: BlendMode::Normal,
            is_visible: true,
            is_locked: false,
            shadow: None,
            payload,
        }
    }

    pub fn position(mut self, x_norm: f64, y_norm: f64) -> Self {
        self.x_norm = x_norm;
        self.y_norm = y_norm;
        self
    }

    pub fn scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation_deg = degrees;
        self
    }

    pub fn anchor(mut self, x: f64, y: f64) -> Self {
        self.anchor_x = x;
        self.anchor_y = y;
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn blend(mut self, mode: BlendMode) -> Self {
        self.blend_mode = mode;
        self
    }

    pub fn visible(mut self, visible: bool) -> Self {
        self.is_visible = visible;
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.is_locked = locked;
        self
    }

    pub fn shadow(mut self, shadow: Shadow) -> Self {
        self.shadow = Some(shadow);
        self
    }

    /// Finish into a [`Layer`] owned by `logo_id` at `z_index`.
    ///
    /// Does not validate; [`LogoBuilder::build`] and the layer service
    /// validate in stack context.
    pub fn into_layer(self, logo_id: LogoId, z_index: u32) -> Layer {
        let now = Utc::now();
        Layer {
            id: LayerId::new(),
            logo_id,
            name: self.name,
            z_index,
            x_norm: self.x_norm,
            y_norm: self.y_norm,
            scale: self.scale,
            rotation_deg: self.rotation_deg,
            anchor_x: self.anchor_x,
            anchor_y: self.anchor_y,
            opacity: self.opacity,
            blend_mode: self.blend_mode,
            is_visible: self.is_visible,
            is_locked: self.is_locked,
            shadow: self.shadow,
            created_at: now,
            updated_at: now,
            payload: self.payload,
        }
    }
}

/// Solid-color background payload.
pub fn solid_background(color: Rgb) -> LayerPayload {
    LayerPayload::Background(BackgroundStyle::Solid {
        fill: Paint::solid(color),
    })
}

/// Gradient background payload; stops are kept in the given order.
pub fn gradient_background(gradient: Gradient) -> LayerPayload {
    LayerPayload::Background(BackgroundStyle::Gradient { gradient })
}

/// Text payload with centered alignment and the default baseline.
pub fn text_layer(content: impl Into<String>, font_size: f64, fill: Paint) -> LayerPayload {
    LayerPayload::Text(TextLayer {
        content: content.into(),
        font_id: None,
        font_size,
        line_height: None,
        letter_spacing: None,
        align: Default::default(),
        baseline: Default::default(),
        fill,
        stroke: None,
        gradient: None,
    })
}

/// Filled rectangle payload (unit 100x100 local box).
pub fn rect_shape(fill: Paint) -> LayerPayload {
    LayerPayload::Shape(ShapeLayer {
        geometry: ShapeGeometry::Rect { rx: 0.0, ry: 0.0 },
        fill: Some(fill),
        gradient: None,
        stroke: None,
    })
}

/// Filled circle payload (unit 100x100 local box).
pub fn circle_shape(fill: Paint) -> LayerPayload {
    LayerPayload::Shape(ShapeLayer {
        geometry: ShapeGeometry::Circle,
        fill: Some(fill),
        gradient: None,
        stroke: None,
    })
}

/// Raw-path payload; `d` is emitted verbatim.
pub fn path_shape(d: impl Into<String>, fill: Option<Paint>) -> LayerPayload {
    LayerPayload::Shape(ShapeLayer {
        geometry: ShapeGeometry::Path { d: d.into() },
        fill,
        gradient: None,
        stroke: None,
    })
}

/// Polygon payload from local-unit vertices.
pub fn polygon_shape(points: Vec<[f64; 2]>, fill: Option<Paint>) -> LayerPayload {
    LayerPayload::Shape(ShapeLayer {
        geometry: ShapeGeometry::Polygon { points },
        fill,
        gradient: None,
        stroke: None,
    })
}

/// Icon payload referencing `asset_id`, untinted.
pub fn icon_layer(asset_id: AssetId) -> LayerPayload {
    LayerPayload::Icon(IconLayer {
        asset_id,
        tint: None,
        allow_recolor: false,
    })
}

/// Image payload referencing `asset_id` with cover fit.
pub fn image_layer(asset_id: AssetId) -> LayerPayload {
    LayerPayload::Image(ImageLayer {
        asset_id,
        crop: None,
        fit: Default::default(),
        rounding: None,
        blur: None,
        brightness: None,
        contrast: None,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/model/dsl.rs"]
mod tests;
