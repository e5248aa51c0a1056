//! Deterministic SVG composition of a logo's ordered layer stack.
//!
//! Composition is a pure transform over already-fetched data: the caller
//! resolves every referenced asset and font into an [`AssetCatalog`] first,
//! and identical inputs always produce byte-identical output. That stability
//! is what makes the documents cacheable and diffable in tests.

use std::fmt::Write as _;

use crate::foundation::{
    core::{Canvas, Deadline, Paint},
    error::{EmblemError, EmblemResult},
};
use crate::model::asset::{Asset, AssetCatalog, FontStyle};
use crate::model::logo::{
    BackgroundStyle, BgRepeat, FitMode, Gradient, IconLayer, ImageLayer, Layer, LayerPayload,
    LineCap, LineJoin, Logo, ShapeGeometry, ShapeLayer, StrokeAlign, TextLayer,
};
use crate::render::svg::{
    escape_xml, fmt_num, layer_affine, local_bbox, matrix_attr, prepare_icon_markup,
};
use crate::zorder::maintainer::painting_order;

/// Caller knobs for one composition.
#[derive(Clone, Copy, Debug, Default)]
pub struct RenderOptions {
    /// Output width; falls back to the logo's canvas width.
    pub width: Option<u32>,
    /// Output height; falls back to the logo's canvas height.
    pub height: Option<u32>,
    pub deadline: Deadline,
}

impl RenderOptions {
    pub fn sized(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            deadline: Deadline::NONE,
        }
    }

    pub fn deadline(mut self, deadline: Deadline) -> Self {
        self.deadline = deadline;
        self
    }

    /// Effective output dimensions given the logo's stored canvas.
    pub fn resolve_size(&self, canvas: Canvas) -> (u32, u32) {
        (
            self.width.unwrap_or(canvas.width),
            self.height.unwrap_or(canvas.height),
        )
    }
}

/// Compose `layers` into a standalone SVG document.
///
/// Layers paint in ascending z order (painter's algorithm); a hidden layer
/// contributes nothing at all. Referenced assets must be present in the
/// catalog; a missing font falls back to the default face instead of failing
/// the render.
#[tracing::instrument(skip_all, fields(logo = %logo.id, layers = layers.len()))]
pub fn render_svg(
    logo: &Logo,
    layers: &[Layer],
    catalog: &AssetCatalog,
    options: &RenderOptions,
) -> EmblemResult<String> {
    options.deadline.check("compose")?;
    let (width, height) = options.resolve_size(logo.canvas);
    if width == 0 || height == 0 {
        return Err(EmblemError::validation(
            "render.size",
            "target dimensions must be >= 1",
        ));
    }

    let mut emitter = Emitter::new(catalog, f64::from(width), f64::from(height));
    for layer in painting_order(layers) {
        if !layer.is_visible {
            continue;
        }
        options.deadline.check("compose layer")?;
        emitter.layer(layer)?;
    }

    let Emitter { defs, body, .. } = emitter;
    let mut svg = String::with_capacity(defs.len() + body.len() + 256);
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>");
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    );
    if !defs.is_empty() {
        svg.push_str("<defs>");
        svg.push_str(&defs);
        svg.push_str("</defs>");
    }
    svg.push_str(&body);
    svg.push_str("</svg>");
    Ok(svg)
}

/// Accumulates the document in two streams, `<defs>` content and body
/// elements, with emit-order counters handing out def ids. Counter-based ids
/// keep output independent of layer identities, so re-identified copies of
/// the same stack (template instantiation) render byte-identically.
struct Emitter<'a> {
    catalog: &'a AssetCatalog,
    width: f64,
    height: f64,
    defs: String,
    body: String,
    grad_counter: u64,
    shadow_counter: u64,
    fx_counter: u64,
    clip_counter: u64,
    pattern_counter: u64,
}

impl<'a> Emitter<'a> {
    fn new(catalog: &'a AssetCatalog, width: f64, height: f64) -> Self {
        Self {
            catalog,
            width,
            height,
            defs: String::new(),
            body: String::new(),
            grad_counter: 0,
            shadow_counter: 0,
            fx_counter: 0,
            clip_counter: 0,
            pattern_counter: 0,
        }
    }

    fn layer(&mut self, layer: &Layer) -> EmblemResult<()> {
        let mut attrs = String::new();

        // Backgrounds cover the target rect directly and never transform.
        if !matches!(layer.payload, LayerPayload::Background(_)) {
            let bbox = local_bbox(&layer.payload)?;
            let affine = layer_affine(layer, self.width, self.height, bbox);
            let _ = write!(attrs, " transform=\"{}\"", matrix_attr(affine));
        }
        if layer.opacity < 1.0 {
            let _ = write!(attrs, " opacity=\"{}\"", fmt_num(layer.opacity));
        }
        if let Some(css) = layer.blend_mode.css_name() {
            let _ = write!(attrs, " style=\"mix-blend-mode:{css}\"");
        }
        if let Some(shadow) = &layer.shadow {
            let id = self.shadow_counter;
            self.shadow_counter += 1;
            let _ = write!(
                self.defs,
                "<filter id=\"shadow-{id}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">\
                 <feDropShadow dx=\"{}\" dy=\"{}\" stdDeviation=\"{}\" flood-color=\"{}\" flood-opacity=\"{}\"/></filter>",
                fmt_num(shadow.dx),
                fmt_num(shadow.dy),
                fmt_num(shadow.blur),
                shadow.color.to_hex(),
                fmt_num(shadow.alpha),
            );
            let _ = write!(attrs, " filter=\"url(#shadow-{id})\"");
        }

        let _ = write!(self.body, "<g{attrs}>");
        match &layer.payload {
            LayerPayload::Background(style) => self.background(style)?,
            LayerPayload::Text(text) => self.text(text),
            LayerPayload::Shape(shape) => self.shape(shape),
            LayerPayload::Icon(icon) => self.icon(icon)?,
            LayerPayload::Image(image) => self.image(image)?,
        }
        self.body.push_str("</g>");
        Ok(())
    }

    fn background(&mut self, style: &BackgroundStyle) -> EmblemResult<()> {
        let (w, h) = (fmt_num(self.width), fmt_num(self.height));
        match style {
            BackgroundStyle::Solid { fill } => {
                let fill = self.fill_attrs(Some(fill), None);
                let _ = write!(self.body, "<rect width=\"{w}\" height=\"{h}\"{fill}/>");
            }
            BackgroundStyle::Gradient { gradient } => {
                let fill = self.fill_attrs(None, Some(gradient));
                let _ = write!(self.body, "<rect width=\"{w}\" height=\"{h}\"{fill}/>");
            }
            BackgroundStyle::Image {
                asset_id,
                repeat,
                fit,
            } => {
                let asset = self.catalog.require_asset(*asset_id)?;
                let href = escape_xml(&asset.url);
                let aspect = preserve_aspect(*fit);
                if *repeat == BgRepeat::NoRepeat {
                    let _ = write!(
                        self.body,
                        "<image href=\"{href}\" x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"{aspect}\"/>"
                    );
                } else {
                    let (tile_w, tile_h) = self.tile_size(asset, *repeat);
                    let id = format!("pat-{}", self.pattern_counter);
                    self.pattern_counter += 1;
                    let _ = write!(
                        self.defs,
                        "<pattern id=\"{id}\" patternUnits=\"userSpaceOnUse\" width=\"{}\" height=\"{}\">\
                         <image href=\"{href}\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"{aspect}\"/></pattern>",
                        fmt_num(tile_w),
                        fmt_num(tile_h),
                        fmt_num(tile_w),
                        fmt_num(tile_h),
                    );
                    let _ = write!(
                        self.body,
                        "<rect width=\"{w}\" height=\"{h}\" fill=\"url(#{id})\"/>"
                    );
                }
            }
        }
        Ok(())
    }

    /// Tile size for repeating backgrounds: the asset's native size when
    /// known, the full target otherwise. The non-repeating axis always spans
    /// the target.
    fn tile_size(&self, asset: &Asset, repeat: BgRepeat) -> (f64, f64) {
        let native_w = asset.width.map(f64::from).unwrap_or(self.width);
        let native_h = asset.height.map(f64::from).unwrap_or(self.height);
        match repeat {
            BgRepeat::Repeat => (native_w, native_h),
            BgRepeat::RepeatX => (native_w, self.height),
            BgRepeat::RepeatY => (self.width, native_h),
            BgRepeat::NoRepeat => (self.width, self.height),
        }
    }

    fn text(&mut self, text: &TextLayer) {
        let mut attrs = format!(
            " text-anchor=\"{}\" dominant-baseline=\"{}\" font-size=\"{}\"",
            text.align.svg_anchor(),
            text.baseline.svg_baseline(),
            fmt_num(text.font_size),
        );
        if let Some(font) = text.font_id.and_then(|id| self.catalog.font(id)) {
            let _ = write!(
                attrs,
                " font-family=\"{}\"",
                escape_xml(&font.family_stack().join(", "))
            );
            if font.weight != 400 {
                let _ = write!(attrs, " font-weight=\"{}\"", font.weight);
            }
            if font.style == FontStyle::Italic {
                attrs.push_str(" font-style=\"italic\"");
            }
        }
        if let Some(spacing) = text.letter_spacing {
            let _ = write!(attrs, " letter-spacing=\"{}\"", fmt_num(spacing));
        }
        attrs.push_str(&self.fill_attrs(Some(&text.fill), text.gradient.as_ref()));
        if let Some(stroke) = &text.stroke {
            let _ = write!(attrs, " stroke=\"{}\"", stroke.paint.color.to_hex());
            if stroke.paint.alpha < 1.0 {
                let _ = write!(attrs, " stroke-opacity=\"{}\"", fmt_num(stroke.paint.alpha));
            }
            let _ = write!(attrs, " stroke-width=\"{}\"", fmt_num(stroke.width));
            // No native stroke alignment in SVG; an outside stroke is
            // approximated by painting it under the fill. Inside falls back
            // to centered.
            if stroke.align == StrokeAlign::Outside {
                attrs.push_str(" paint-order=\"stroke\"");
            }
        }

        let _ = write!(self.body, "<text x=\"0\" y=\"0\"{attrs}>");
        let lines: Vec<&str> = text.content.split('\n').collect();
        if let [line] = lines.as_slice() {
            self.body.push_str(&escape_xml(line));
        } else {
            let line_step = text.font_size * text.line_height.unwrap_or(1.2);
            for (i, line) in lines.iter().enumerate() {
                let dy = if i == 0 { 0.0 } else { line_step };
                let _ = write!(
                    self.body,
                    "<tspan x=\"0\" dy=\"{}\">{}</tspan>",
                    fmt_num(dy),
                    escape_xml(line),
                );
            }
        }
        self.body.push_str("</text>");
    }

    fn shape(&mut self, shape: &ShapeLayer) {
        let mut attrs = self.fill_attrs(shape.fill.as_ref(), shape.gradient.as_ref());
        if let Some(stroke) = &shape.stroke {
            let _ = write!(attrs, " stroke=\"{}\"", stroke.paint.color.to_hex());
            if stroke.paint.alpha < 1.0 {
                let _ = write!(attrs, " stroke-opacity=\"{}\"", fmt_num(stroke.paint.alpha));
            }
            let _ = write!(attrs, " stroke-width=\"{}\"", fmt_num(stroke.width));
            if !stroke.dash.is_empty() {
                let dashes = stroke
                    .dash
                    .iter()
                    .copied()
                    .map(fmt_num)
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(attrs, " stroke-dasharray=\"{dashes}\"");
            }
            if stroke.cap != LineCap::Butt {
                let _ = write!(attrs, " stroke-linecap=\"{}\"", stroke.cap.svg_keyword());
            }
            if stroke.join != LineJoin::Miter {
                let _ = write!(attrs, " stroke-linejoin=\"{}\"", stroke.join.svg_keyword());
            }
        }

        match &shape.geometry {
            ShapeGeometry::Rect { rx, ry } => {
                let mut corners = String::new();
                if *rx > 0.0 {
                    let _ = write!(corners, " rx=\"{}\"", fmt_num(*rx));
                }
                if *ry > 0.0 {
                    let _ = write!(corners, " ry=\"{}\"", fmt_num(*ry));
                }
                let _ = write!(
                    self.body,
                    "<rect x=\"0\" y=\"0\" width=\"100\" height=\"100\"{corners}{attrs}/>"
                );
            }
            ShapeGeometry::Circle => {
                let _ = write!(self.body, "<circle cx=\"50\" cy=\"50\" r=\"50\"{attrs}/>");
            }
            ShapeGeometry::Path { d } => {
                let _ = write!(self.body, "<path d=\"{}\"{attrs}/>", escape_xml(d));
            }
            ShapeGeometry::Polygon { points } => {
                let pts = points
                    .iter()
                    .map(|p| format!("{},{}", fmt_num(p[0]), fmt_num(p[1])))
                    .collect::<Vec<_>>()
                    .join(" ");
                let _ = write!(self.body, "<polygon points=\"{pts}\"{attrs}/>");
            }
        }
    }

    fn icon(&mut self, icon: &IconLayer) -> EmblemResult<()> {
        let asset = self.catalog.require_asset(icon.asset_id)?;
        if let Some(markup) = &asset.vector_svg {
            let tint = if icon.allow_recolor { icon.tint } else { None };
            let prepared = prepare_icon_markup(markup, tint)?;
            self.body.push_str(&prepared);
        } else {
            let _ = write!(
                self.body,
                "<image href=\"{}\" x=\"0\" y=\"0\" width=\"100\" height=\"100\"/>",
                escape_xml(&asset.url),
            );
        }
        Ok(())
    }

    fn image(&mut self, image: &ImageLayer) -> EmblemResult<()> {
        let asset = self.catalog.require_asset(image.asset_id)?;
        let href = escape_xml(&asset.url);
        let aspect = preserve_aspect(image.fit);

        let mut attrs = String::new();
        if let Some(radius) = image.rounding
            && radius > 0.0
        {
            let id = format!("clip-{}", self.clip_counter);
            self.clip_counter += 1;
            let _ = write!(
                self.defs,
                "<clipPath id=\"{id}\"><rect x=\"0\" y=\"0\" width=\"100\" height=\"100\" rx=\"{}\"/></clipPath>",
                fmt_num(radius),
            );
            let _ = write!(attrs, " clip-path=\"url(#{id})\"");
        }
        if let Some(id) = self.effects_filter(image) {
            let _ = write!(attrs, " filter=\"url(#{id})\"");
        }

        // Crop projects a sub-rectangle of the source through a nested
        // viewport. Without known source dimensions the crop cannot be
        // resolved and the full image is used.
        if let (Some(crop), Some(sw), Some(sh)) = (&image.crop, asset.width, asset.height) {
            let (sw, sh) = (f64::from(sw), f64::from(sh));
            let _ = write!(
                self.body,
                "<svg x=\"0\" y=\"0\" width=\"100\" height=\"100\" viewBox=\"{} {} {} {}\" preserveAspectRatio=\"{aspect}\"{attrs}>\
                 <image href=\"{href}\" width=\"{}\" height=\"{}\"/></svg>",
                fmt_num(crop.x * sw),
                fmt_num(crop.y * sh),
                fmt_num(crop.w * sw),
                fmt_num(crop.h * sh),
                fmt_num(sw),
                fmt_num(sh),
            );
        } else {
            let _ = write!(
                self.body,
                "<image href=\"{href}\" x=\"0\" y=\"0\" width=\"100\" height=\"100\" preserveAspectRatio=\"{aspect}\"{attrs}/>"
            );
        }
        Ok(())
    }

    /// Blur/brightness/contrast declared as one filter def; `None` when the
    /// layer sets no effect.
    fn effects_filter(&mut self, image: &ImageLayer) -> Option<String> {
        let blur = image.blur.filter(|b| *b > 0.0);
        let brightness = image.brightness.filter(|b| (*b - 1.0).abs() > f64::EPSILON);
        let contrast = image.contrast.filter(|c| (*c - 1.0).abs() > f64::EPSILON);
        if blur.is_none() && brightness.is_none() && contrast.is_none() {
            return None;
        }

        let id = format!("fx-{}", self.fx_counter);
        self.fx_counter += 1;
        let _ = write!(
            self.defs,
            "<filter id=\"{id}\" x=\"-50%\" y=\"-50%\" width=\"200%\" height=\"200%\">"
        );
        if let Some(std_dev) = blur {
            let _ = write!(
                self.defs,
                "<feGaussianBlur stdDeviation=\"{}\"/>",
                fmt_num(std_dev)
            );
        }
        if brightness.is_some() || contrast.is_some() {
            // Linear transfer: brightness scales the channel, contrast pivots
            // it around mid-gray; composing the two gives slope b*c and
            // intercept (1-c)/2.
            let slope = brightness.unwrap_or(1.0) * contrast.unwrap_or(1.0);
            let intercept = contrast.map_or(0.0, |c| (1.0 - c) / 2.0);
            self.defs.push_str("<feComponentTransfer>");
            for channel in ["feFuncR", "feFuncG", "feFuncB"] {
                let _ = write!(
                    self.defs,
                    "<{channel} type=\"linear\" slope=\"{}\" intercept=\"{}\"/>",
                    fmt_num(slope),
                    fmt_num(intercept),
                );
            }
            self.defs.push_str("</feComponentTransfer>");
        }
        self.defs.push_str("</filter>");
        Some(id)
    }

    /// `fill` attribute text for a paint/gradient pair; the gradient wins
    /// when both are set, and neither means an explicit `fill="none"`.
    fn fill_attrs(&mut self, fill: Option<&Paint>, gradient: Option<&Gradient>) -> String {
        if let Some(gradient) = gradient {
            let id = self.gradient_def(gradient);
            return format!(" fill=\"url(#{id})\"");
        }
        match fill {
            Some(paint) => {
                let mut s = format!(" fill=\"{}\"", paint.color.to_hex());
                if paint.alpha < 1.0 {
                    let _ = write!(s, " fill-opacity=\"{}\"", fmt_num(paint.alpha));
                }
                s
            }
            None => " fill=\"none\"".to_owned(),
        }
    }

    /// Emit a linear gradient def along the fixed top-left to bottom-right
    /// diagonal. Stops go out in stored order, never re-sorted.
    fn gradient_def(&mut self, gradient: &Gradient) -> String {
        let id = format!("grad-{}", self.grad_counter);
        self.grad_counter += 1;
        let _ = write!(
            self.defs,
            "<linearGradient id=\"{id}\" x1=\"0%\" y1=\"0%\" x2=\"100%\" y2=\"100%\">"
        );
        for stop in &gradient.stops {
            let _ = write!(
                self.defs,
                "<stop offset=\"{}%\" stop-color=\"{}\" stop-opacity=\"{}\"/>",
                fmt_num(stop.offset * 100.0),
                stop.color.to_hex(),
                fmt_num(stop.alpha),
            );
        }
        self.defs.push_str("</linearGradient>");
        id
    }
}

fn preserve_aspect(fit: FitMode) -> &'static str {
    match fit {
        FitMode::Cover => "xMidYMid slice",
        FitMode::Contain => "xMidYMid meet",
        FitMode::Fill => "none",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
