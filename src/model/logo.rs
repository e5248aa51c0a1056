use chrono::{DateTime, Utc};

use crate::foundation::{
    core::{AssetId, Canvas, CategoryId, FontId, LayerId, LogoId, Paint, Rgb, UserId},
    error::{EmblemError, EmblemResult},
};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// A stored logo design.
///
/// A logo is pure data: canvas dimensions plus an ordered stack of [`Layer`]s
/// owned by it. Rendering is performed by [`crate::render_svg`]; the stack
/// ordering invariant is maintained by the functions in [`crate::zorder`].
pub struct Logo {
    pub id: LogoId,
    pub owner_id: UserId,
    pub title: String,
    /// Drawing surface in pixels; normalized layer coordinates resolve
    /// against the render target, which defaults to this.
    pub canvas: Canvas,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dpi: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Template sources are ordinary logos with this flag set.
    #[serde(default)]
    pub is_template: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Logo {
    /// Validate logo-level invariants, reporting the first violation.
    pub fn validate(&self) -> EmblemResult<()> {
        if self.title.trim().is_empty() {
            return Err(EmblemError::validation(
                "logo.title",
                "title must be non-empty",
            ));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(EmblemError::validation(
                "logo.canvas",
                "canvas width and height must be >= 1",
            ));
        }
        if let Some(dpi) = self.dpi
            && dpi == 0
        {
            return Err(EmblemError::validation("logo.dpi", "dpi must be > 0"));
        }
        Ok(())
    }
}

/// Compositing mode applied when a layer is painted over the stack below it.
///
/// The full CSS `mix-blend-mode` set; [`BlendMode::Normal`] is plain
/// source-over and emits no style.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    #[default]
    Normal,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorBurn,
    ColorDodge,
    Difference,
    Exclusion,
    Hue,
    Saturation,
    Color,
    Luminosity,
    SoftLight,
    HardLight,
}

impl BlendMode {
    /// CSS `mix-blend-mode` keyword, or `None` for plain source-over.
    pub fn css_name(self) -> Option<&'static str> {
        match self {
            BlendMode::Normal => None,
            BlendMode::Multiply => Some("multiply"),
            BlendMode::Screen => Some("screen"),
            BlendMode::Overlay => Some("overlay"),
            BlendMode::Darken => Some("darken"),
            BlendMode::Lighten => Some("lighten"),
            BlendMode::ColorBurn => Some("color-burn"),
            BlendMode::ColorDodge => Some("color-dodge"),
            BlendMode::Difference => Some("difference"),
            BlendMode::Exclusion => Some("exclusion"),
            BlendMode::Hue => Some("hue"),
            BlendMode::Saturation => Some("saturation"),
            BlendMode::Color => Some("color"),
            BlendMode::Luminosity => Some("luminosity"),
            BlendMode::SoftLight => Some("soft-light"),
            BlendMode::HardLight => Some("hard-light"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Per-layer drop shadow, rendered as a filter wrapping the layer's element.
pub struct Shadow {
    /// Horizontal offset in target pixels.
    pub dx: f64,
    /// Vertical offset in target pixels.
    pub dy: f64,
    /// Blur standard deviation, >= 0.
    pub blur: f64,
    pub color: Rgb,
    /// Shadow coverage in `[0, 1]`.
    pub alpha: f64,
}

impl Shadow {
    fn validate(&self) -> EmblemResult<()> {
        for (name, v) in [("dx", self.dx), ("dy", self.dy)] {
            if !v.is_finite() {
                return Err(EmblemError::validation(
                    format!("layer.shadow.{name}"),
                    "must be finite",
                ));
            }
        }
        if !self.blur.is_finite() || self.blur < 0.0 {
            return Err(EmblemError::validation(
                "layer.shadow.blur",
                "blur must be finite and >= 0",
            ));
        }
        if !self.alpha.is_finite() || !(0.0..=1.0).contains(&self.alpha) {
            return Err(EmblemError::validation(
                "layer.shadow.alpha",
                "alpha must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One stop of a linear gradient.
pub struct GradientStop {
    /// Normalized position along the gradient axis, `[0, 1]`.
    pub offset: f64,
    pub color: Rgb,
    pub alpha: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Linear gradient along the fixed top-left to bottom-right diagonal.
///
/// Stops are emitted in stored order; the renderer never re-sorts them, so
/// callers own the ascending-offset convention.
pub struct Gradient {
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    fn validate(&self, field: &str) -> EmblemResult<()> {
        if self.stops.len() < 2 {
            return Err(EmblemError::validation(
                format!("{field}.stops"),
                "gradient needs at least 2 stops",
            ));
        }
        for (i, stop) in self.stops.iter().enumerate() {
            if !stop.offset.is_finite() || !(0.0..=1.0).contains(&stop.offset) {
                return Err(EmblemError::validation(
                    format!("{field}.stops[{i}].offset"),
                    "offset must be within [0, 1]",
                ));
            }
            if !stop.alpha.is_finite() || !(0.0..=1.0).contains(&stop.alpha) {
                return Err(EmblemError::validation(
                    format!("{field}.stops[{i}].alpha"),
                    "alpha must be within [0, 1]",
                ));
            }
        }
        Ok(())
    }
}

/// Horizontal alignment of text relative to its layer origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
    /// No single-line SVG equivalent; treated as start-aligned.
    Justify,
}

impl TextAlign {
    /// SVG `text-anchor` keyword.
    pub fn svg_anchor(self) -> &'static str {
        match self {
            TextAlign::Left | TextAlign::Justify => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        }
    }
}

/// Vertical registration of text relative to its layer origin.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextBaseline {
    Top,
    Middle,
    Bottom,
    #[default]
    Alphabetic,
}

impl TextBaseline {
    /// SVG `dominant-baseline` keyword.
    pub fn svg_baseline(self) -> &'static str {
        match self {
            TextBaseline::Top => "text-before-edge",
            TextBaseline::Middle => "middle",
            TextBaseline::Bottom => "text-after-edge",
            TextBaseline::Alphabetic => "alphabetic",
        }
    }
}

/// Placement of a text stroke relative to the glyph outline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrokeAlign {
    #[default]
    Center,
    Inside,
    Outside,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn svg_keyword(self) -> &'static str {
        match self {
            LineCap::Butt => "butt",
            LineCap::Round => "round",
            LineCap::Square => "square",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    #[default]
    Miter,
    Round,
    Bevel,
}

impl LineJoin {
    pub fn svg_keyword(self) -> &'static str {
        match self {
            LineJoin::Miter => "miter",
            LineJoin::Round => "round",
            LineJoin::Bevel => "bevel",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Outline stroke on text glyphs.
pub struct TextStroke {
    pub paint: Paint,
    /// Stroke width in local units, > 0.
    pub width: f64,
    #[serde(default)]
    pub align: StrokeAlign,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Outline stroke on shape geometry.
pub struct ShapeStroke {
    pub paint: Paint,
    /// Stroke width in local units, > 0.
    pub width: f64,
    /// Dash segment lengths; empty means solid.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dash: Vec<f64>,
    #[serde(default)]
    pub cap: LineCap,
    #[serde(default)]
    pub join: LineJoin,
}

impl ShapeStroke {
    fn validate(&self, field: &str) -> EmblemResult<()> {
        self.paint.validate(&format!("{field}.paint"))?;
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(EmblemError::validation(
                format!("{field}.width"),
                "stroke width must be finite and > 0",
            ));
        }
        for (i, seg) in self.dash.iter().enumerate() {
            if !seg.is_finite() || *seg < 0.0 {
                return Err(EmblemError::validation(
                    format!("{field}.dash[{i}]"),
                    "dash segments must be finite and >= 0",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Kind-specific payload of a text layer.
pub struct TextLayer {
    pub content: String,
    /// Registered font face; a missing reference falls back to the default
    /// face at render time instead of failing the render.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_id: Option<FontId>,
    /// Font size in local units, > 0.
    pub font_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub baseline: TextBaseline,
    pub fill: Paint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<TextStroke>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
}

/// Concrete geometry of a shape layer.
///
/// Rect and circle draw into the fixed 100x100 local box and take their
/// on-canvas size from the layer transform; path and polygon carry their own
/// coordinates verbatim.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "shape_kind", rename_all = "lowercase")]
pub enum ShapeGeometry {
    Rect {
        #[serde(default)]
        rx: f64,
        #[serde(default)]
        ry: f64,
    },
    Circle,
    Path {
        /// Raw SVG path data, emitted verbatim.
        d: String,
    },
    Polygon {
        /// Vertices in local units; at least 3.
        points: Vec<[f64; 2]>,
    },
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Kind-specific payload of a shape layer.
pub struct ShapeLayer {
    #[serde(flatten)]
    pub geometry: ShapeGeometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Paint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient: Option<Gradient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<ShapeStroke>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Kind-specific payload of an icon layer.
pub struct IconLayer {
    /// Referenced asset; inline vector markup is embedded when present,
    /// otherwise the asset URL is placed as a raster image.
    pub asset_id: AssetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tint: Option<Paint>,
    /// Gate for rewriting the markup's fills to the tint.
    #[serde(default)]
    pub allow_recolor: bool,
}

/// How image content is fitted into its layer box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Fill the box preserving aspect ratio, cropping overflow.
    #[default]
    Cover,
    /// Fit entirely inside the box preserving aspect ratio.
    Contain,
    /// Stretch to the box, ignoring aspect ratio.
    Fill,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Normalized sub-rectangle of the source image, all fields in `[0, 1]`.
pub struct CropRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl CropRect {
    fn validate(&self) -> EmblemResult<()> {
        for (name, v) in [("x", self.x), ("y", self.y), ("w", self.w), ("h", self.h)] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(EmblemError::validation(
                    format!("layer.crop.{name}"),
                    "must be within [0, 1]",
                ));
            }
        }
        if self.w <= 0.0 || self.h <= 0.0 {
            return Err(EmblemError::validation(
                "layer.crop",
                "crop width and height must be > 0",
            ));
        }
        if self.x + self.w > 1.0 || self.y + self.h > 1.0 {
            return Err(EmblemError::validation(
                "layer.crop",
                "crop rect must stay within the source image",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Kind-specific payload of an image layer.
pub struct ImageLayer {
    pub asset_id: AssetId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropRect>,
    #[serde(default)]
    pub fit: FitMode,
    /// Corner rounding radius in local units, >= 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rounding: Option<f64>,
    /// Gaussian blur standard deviation, >= 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blur: Option<f64>,
    /// Linear brightness multiplier; 1.0 is unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brightness: Option<f64>,
    /// Linear contrast multiplier; 1.0 is unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<f64>,
}

/// Tiling of a background image across the canvas.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BgRepeat {
    #[default]
    NoRepeat,
    Repeat,
    RepeatX,
    RepeatY,
}

/// Background fill, one of three modes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum BackgroundStyle {
    Solid {
        fill: Paint,
    },
    Gradient {
        gradient: Gradient,
    },
    Image {
        asset_id: AssetId,
        #[serde(default)]
        repeat: BgRepeat,
        #[serde(default)]
        fit: FitMode,
    },
}

/// Discriminant of a layer's payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerKind {
    Background,
    Text,
    Icon,
    Shape,
    Image,
}

impl std::fmt::Display for LayerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LayerKind::Background => "BACKGROUND",
            LayerKind::Text => "TEXT",
            LayerKind::Icon => "ICON",
            LayerKind::Shape => "SHAPE",
            LayerKind::Image => "IMAGE",
        };
        f.write_str(s)
    }
}

/// Kind-tagged payload, exactly one per layer.
///
/// The closed sum makes a kind/payload mismatch unrepresentable; every
/// consumer (renderer, codec, validator) matches exhaustively.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LayerPayload {
    Background(BackgroundStyle),
    Text(TextLayer),
    Icon(IconLayer),
    Shape(ShapeLayer),
    Image(ImageLayer),
}

impl LayerPayload {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerPayload::Background(_) => LayerKind::Background,
            LayerPayload::Text(_) => LayerKind::Text,
            LayerPayload::Icon(_) => LayerKind::Icon,
            LayerPayload::Shape(_) => LayerKind::Shape,
            LayerPayload::Image(_) => LayerKind::Image,
        }
    }

    /// Asset referenced by this payload, if any.
    pub fn asset_ref(&self) -> Option<AssetId> {
        match self {
            LayerPayload::Icon(icon) => Some(icon.asset_id),
            LayerPayload::Image(image) => Some(image.asset_id),
            LayerPayload::Background(BackgroundStyle::Image { asset_id, .. }) => Some(*asset_id),
            LayerPayload::Background(_) | LayerPayload::Text(_) | LayerPayload::Shape(_) => None,
        }
    }

    /// Font referenced by this payload, if any.
    pub fn font_ref(&self) -> Option<FontId> {
        match self {
            LayerPayload::Text(text) => text.font_id,
            _ => None,
        }
    }

    fn validate(&self) -> EmblemResult<()> {
        match self {
            LayerPayload::Background(style) => match style {
                BackgroundStyle::Solid { fill } => fill.validate("layer.background.fill"),
                BackgroundStyle::Gradient { gradient } => {
                    gradient.validate("layer.background.gradient")
                }
                BackgroundStyle::Image { .. } => Ok(()),
            },
            LayerPayload::Text(text) => {
                if !text.font_size.is_finite() || text.font_size <= 0.0 {
                    return Err(EmblemError::validation(
                        "layer.text.font_size",
                        "font size must be finite and > 0",
                    ));
                }
                if let Some(lh) = text.line_height
                    && (!lh.is_finite() || lh <= 0.0)
                {
                    return Err(EmblemError::validation(
                        "layer.text.line_height",
                        "line height must be finite and > 0 when set",
                    ));
                }
                if let Some(ls) = text.letter_spacing
                    && !ls.is_finite()
                {
                    return Err(EmblemError::validation(
                        "layer.text.letter_spacing",
                        "letter spacing must be finite when set",
                    ));
                }
                text.fill.validate("layer.text.fill")?;
                if let Some(stroke) = &text.stroke {
                    stroke.paint.validate("layer.text.stroke.paint")?;
                    if !stroke.width.is_finite() || stroke.width <= 0.0 {
                        return Err(EmblemError::validation(
                            "layer.text.stroke.width",
                            "stroke width must be finite and > 0",
                        ));
                    }
                }
                if let Some(gradient) = &text.gradient {
                    gradient.validate("layer.text.gradient")?;
                }
                Ok(())
            }
            LayerPayload::Icon(icon) => {
                if let Some(tint) = &icon.tint {
                    tint.validate("layer.icon.tint")?;
                }
                Ok(())
            }
            LayerPayload::Shape(shape) => {
                match &shape.geometry {
                    ShapeGeometry::Rect { rx, ry } => {
                        for (name, v) in [("rx", *rx), ("ry", *ry)] {
                            if !v.is_finite() || v < 0.0 {
                                return Err(EmblemError::validation(
                                    format!("layer.shape.{name}"),
                                    "corner radius must be finite and >= 0",
                                ));
                            }
                        }
                    }
                    ShapeGeometry::Circle => {}
                    ShapeGeometry::Path { d } => {
                        if d.trim().is_empty() {
                            return Err(EmblemError::validation(
                                "layer.shape.d",
                                "path data must be non-empty",
                            ));
                        }
                    }
                    ShapeGeometry::Polygon { points } => {
                        if points.len() < 3 {
                            return Err(EmblemError::validation(
                                "layer.shape.points",
                                "polygon needs at least 3 points",
                            ));
                        }
                        for (i, [x, y]) in points.iter().enumerate() {
                            if !x.is_finite() || !y.is_finite() {
                                return Err(EmblemError::validation(
                                    format!("layer.shape.points[{i}]"),
                                    "coordinates must be finite",
                                ));
                            }
                        }
                    }
                }
                if let Some(fill) = &shape.fill {
                    fill.validate("layer.shape.fill")?;
                }
                if let Some(gradient) = &shape.gradient {
                    gradient.validate("layer.shape.gradient")?;
                }
                if let Some(stroke) = &shape.stroke {
                    stroke.validate("layer.shape.stroke")?;
                }
                Ok(())
            }
            LayerPayload::Image(image) => {
                if let Some(crop) = &image.crop {
                    crop.validate()?;
                }
                for (name, v) in [
                    ("rounding", image.rounding),
                    ("blur", image.blur),
                    ("brightness", image.brightness),
                    ("contrast", image.contrast),
                ] {
                    if let Some(v) = v
                        && (!v.is_finite() || v < 0.0)
                    {
                        return Err(EmblemError::validation(
                            format!("layer.image.{name}"),
                            "must be finite and >= 0 when set",
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// One positioned, styled element of a logo.
///
/// Position and anchor are normalized against the render target so a stack
/// re-renders identically at any output size. `z_index` values within one
/// logo always form the dense set `{0, .., N-1}`.
pub struct Layer {
    pub id: LayerId,
    pub logo_id: LogoId,
    #[serde(default)]
    pub name: String,
    /// Dense paint rank, low-to-high is bottom-to-top.
    pub z_index: u32,
    /// Horizontal position as a fraction of target width, `[0, 1]`.
    pub x_norm: f64,
    /// Vertical position as a fraction of target height, `[0, 1]`.
    pub y_norm: f64,
    /// Uniform scale factor, > 0.
    pub scale: f64,
    #[serde(default)]
    pub rotation_deg: f64,
    /// Transform origin as a fraction of the layer's local bounds.
    #[serde(default = "default_anchor")]
    pub anchor_x: f64,
    #[serde(default = "default_anchor")]
    pub anchor_y: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub blend_mode: BlendMode,
    #[serde(default = "default_true")]
    pub is_visible: bool,
    /// Editing affordance only; locked layers still render.
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadow: Option<Shadow>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(flatten)]
    pub payload: LayerPayload,
}

fn default_anchor() -> f64 {
    0.5
}

fn default_opacity() -> f64 {
    1.0
}

fn default_true() -> bool {
    true
}

impl Layer {
    pub fn kind(&self) -> LayerKind {
        self.payload.kind()
    }

    /// Validate layer-level ranges and the payload, reporting the first
    /// violation. Stack-level invariants live in [`validate_stack`].
    pub fn validate(&self) -> EmblemResult<()> {
        for (name, v) in [
            ("x_norm", self.x_norm),
            ("y_norm", self.y_norm),
            ("anchor_x", self.anchor_x),
            ("anchor_y", self.anchor_y),
            ("opacity", self.opacity),
        ] {
            if !v.is_finite() || !(0.0..=1.0).contains(&v) {
                return Err(EmblemError::validation(
                    format!("layer.{name}"),
                    "must be within [0, 1]",
                ));
            }
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(EmblemError::validation(
                "layer.scale",
                "scale must be finite and > 0",
            ));
        }
        if !self.rotation_deg.is_finite() {
            return Err(EmblemError::validation(
                "layer.rotation_deg",
                "rotation must be finite",
            ));
        }
        if let Some(shadow) = &self.shadow {
            shadow.validate()?;
        }
        self.payload.validate()
    }
}

/// Validate a logo together with its full layer stack: per-layer ranges,
/// ownership, and the dense z-index permutation.
pub fn validate_stack(logo: &Logo, layers: &[Layer]) -> EmblemResult<()> {
    logo.validate()?;

    let n = layers.len();
    let mut seen = vec![false; n];
    for layer in layers {
        if layer.logo_id != logo.id {
            return Err(EmblemError::validation(
                "layer.logo_id",
                format!("layer '{}' does not belong to logo '{}'", layer.id, logo.id),
            ));
        }
        layer.validate()?;

        let z = layer.z_index as usize;
        if z >= n {
            return Err(EmblemError::validation(
                "layer.z_index",
                format!("z-index {z} outside dense range [0, {n})"),
            ));
        }
        if seen[z] {
            return Err(EmblemError::validation(
                "layer.z_index",
                format!("duplicate z-index {z}"),
            ));
        }
        seen[z] = true;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/model/logo.rs"]
mod tests;
