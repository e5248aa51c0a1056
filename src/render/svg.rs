//! Low-level helpers for assembling SVG text: scalar formatting, escaping,
//! transform math, and the structural rewrite of inline vector markup.

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::foundation::{
    core::{Affine, BezPath, Paint, Rect, Vec2},
    error::{EmblemError, EmblemResult},
};
use crate::model::logo::{Layer, LayerPayload, ShapeGeometry};

/// Local drawing box of the fixed-size layer kinds.
pub(crate) const UNIT_BOX: Rect = Rect::new(0.0, 0.0, 100.0, 100.0);

/// Format a scalar the way SVG attributes want it: integers bare, everything
/// else with at most three decimals and no trailing zeros.
pub(crate) fn fmt_num(v: f64) -> String {
    if v.is_finite() {
        let i = v as i64;
        let diff = (i as f64) - v;
        if diff > -1e-6 && diff < 1e-6 {
            return format!("{i}");
        }
    } else {
        return format!("{v}");
    }

    let mut s = format!("{v:.3}");
    while s.contains('.') && s.ends_with('0') {
        s.pop();
    }
    if s.ends_with('.') {
        s.pop();
    }
    s
}

/// Escape a string for use as XML text or an attribute value.
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// `matrix(a b c d e f)` form of an affine transform.
pub(crate) fn matrix_attr(xf: Affine) -> String {
    // kurbo's coefficient order matches the SVG matrix() argument order.
    let c = xf.as_coeffs();
    format!(
        "matrix({} {} {} {} {} {})",
        fmt_num(c[0]),
        fmt_num(c[1]),
        fmt_num(c[2]),
        fmt_num(c[3]),
        fmt_num(c[4]),
        fmt_num(c[5]),
    )
}

/// Placement transform for one layer: translate to the normalized canvas
/// position, then rotate, then scale, pivoting at the anchor fraction of the
/// layer's local box. The anchor point itself lands exactly on the position.
pub(crate) fn layer_affine(layer: &Layer, width: f64, height: f64, bbox: Rect) -> Affine {
    let anchor = Vec2::new(
        bbox.x0 + layer.anchor_x * bbox.width(),
        bbox.y0 + layer.anchor_y * bbox.height(),
    );
    Affine::translate(Vec2::new(layer.x_norm * width, layer.y_norm * height))
        * Affine::rotate(layer.rotation_deg.to_radians())
        * Affine::scale(layer.scale)
        * Affine::translate(-anchor)
}

/// Local bounding box a payload draws into, used to resolve the anchor.
///
/// Fixed-box kinds (rect, circle, icon, image) occupy [`UNIT_BOX`]; path and
/// polygon derive the box from their own coordinates. Text anchors at the
/// origin through its alignment/baseline attributes, and backgrounds never
/// transform, so both use a degenerate box.
pub(crate) fn local_bbox(payload: &LayerPayload) -> EmblemResult<Rect> {
    use kurbo::Shape as _;

    let bbox = match payload {
        LayerPayload::Background(_) | LayerPayload::Text(_) => Rect::ZERO,
        LayerPayload::Icon(_) | LayerPayload::Image(_) => UNIT_BOX,
        LayerPayload::Shape(shape) => match &shape.geometry {
            ShapeGeometry::Rect { .. } | ShapeGeometry::Circle => UNIT_BOX,
            ShapeGeometry::Path { d } => BezPath::from_svg(d)
                .map_err(|e| EmblemError::validation("layer.shape.d", e.to_string()))?
                .bounding_box(),
            ShapeGeometry::Polygon { points } => points_bbox(points)?,
        },
    };
    Ok(bbox)
}

fn points_bbox(points: &[[f64; 2]]) -> EmblemResult<Rect> {
    let Some(first) = points.first() else {
        return Err(EmblemError::validation(
            "layer.shape.points",
            "polygon has no points",
        ));
    };
    let mut bbox = Rect::new(first[0], first[1], first[0], first[1]);
    for p in &points[1..] {
        bbox.x0 = bbox.x0.min(p[0]);
        bbox.y0 = bbox.y0.min(p[1]);
        bbox.x1 = bbox.x1.max(p[0]);
        bbox.y1 = bbox.y1.max(p[1]);
    }
    Ok(bbox)
}

/// Rewrite inline vector markup for embedding: drop the XML prolog, pin an
/// unsized root `<svg>` to the 100x100 local box, and apply the tint.
///
/// Recolor is structural, per attribute: explicit `fill` values other than
/// `none` become the tint color, any `currentColor` value becomes the tint
/// color, and a root element without an explicit fill gains one so untagged
/// children inherit it. Tint alpha lands as `fill-opacity` on the root.
pub(crate) fn prepare_icon_markup(markup: &str, tint: Option<Paint>) -> EmblemResult<String> {
    let mut reader = Reader::from_str(markup);
    let mut writer = Writer::new(Vec::new());
    let mut root_seen = false;

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => {
                let rewritten = rewrite_element(&e, tint, !root_seen)?;
                root_seen = true;
                writer
                    .write_event(Event::Start(rewritten))
                    .map_err(markup_err)?;
            }
            Ok(Event::Empty(e)) => {
                let rewritten = rewrite_element(&e, tint, !root_seen)?;
                root_seen = true;
                writer
                    .write_event(Event::Empty(rewritten))
                    .map_err(markup_err)?;
            }
            Ok(Event::Decl(_) | Event::DocType(_)) => {}
            Ok(event) => writer.write_event(event).map_err(markup_err)?,
            Err(e) => return Err(markup_err(e)),
        }
    }

    String::from_utf8(writer.into_inner()).map_err(markup_err)
}

fn markup_err(e: impl std::fmt::Display) -> EmblemError {
    EmblemError::validation("layer.icon.vector_svg", e.to_string())
}

fn rewrite_element(
    element: &BytesStart<'_>,
    tint: Option<Paint>,
    is_root: bool,
) -> EmblemResult<BytesStart<'static>> {
    let name = std::str::from_utf8(element.name().as_ref())
        .map_err(markup_err)?
        .to_owned();
    let is_svg_root = is_root && name == "svg";
    let mut out = BytesStart::new(name);

    let mut saw_fill = false;
    let mut saw_width = false;
    let mut saw_height = false;
    for attr in element.attributes() {
        let attr = attr.map_err(markup_err)?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(markup_err)?
            .to_owned();
        let value = attr.unescape_value().map_err(markup_err)?.into_owned();

        let tinted = match tint {
            Some(paint) if key == "fill" && value != "none" => Some(paint.color.to_hex()),
            Some(paint) if value == "currentColor" => Some(paint.color.to_hex()),
            _ => None,
        };
        let value = tinted.unwrap_or(value);

        match key.as_str() {
            "fill" => saw_fill = true,
            "width" => saw_width = true,
            "height" => saw_height = true,
            _ => {}
        }
        out.push_attribute((key.as_str(), value.as_str()));
    }

    if is_svg_root {
        if !saw_width {
            out.push_attribute(("width", "100"));
        }
        if !saw_height {
            out.push_attribute(("height", "100"));
        }
    }
    if is_root && let Some(paint) = tint {
        if !saw_fill {
            out.push_attribute(("fill", paint.color.to_hex().as_str()));
        }
        if paint.alpha < 1.0 {
            out.push_attribute(("fill-opacity", fmt_num(paint.alpha).as_str()));
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/render/svg.rs"]
mod tests;
