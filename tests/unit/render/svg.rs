use kurbo::Point;

use super::*;
use crate::foundation::core::{AssetId, LogoId, Rgb};
use crate::model::dsl::{
    LayerBuilder, icon_layer, image_layer, path_shape, polygon_shape, rect_shape,
    solid_background, text_layer,
};

fn ink() -> Paint {
    Paint::solid(Rgb::new(0, 128, 255))
}

#[test]
fn numbers_format_like_svg_attributes() {
    assert_eq!(fmt_num(1.0), "1");
    assert_eq!(fmt_num(100.0), "100");
    assert_eq!(fmt_num(-18.0), "-18");
    assert_eq!(fmt_num(0.5), "0.5");
    assert_eq!(fmt_num(0.1 + 0.2), "0.3");
    assert_eq!(fmt_num(1.23456), "1.235");
    assert_eq!(fmt_num(2.0000001), "2");
}

#[test]
fn xml_specials_are_escaped() {
    assert_eq!(
        escape_xml(r#"a&b<c>d"e'f"#),
        "a&amp;b&lt;c&gt;d&quot;e&apos;f"
    );
    assert_eq!(escape_xml("plain"), "plain");
}

#[test]
fn identity_matrix_attr() {
    assert_eq!(matrix_attr(Affine::IDENTITY), "matrix(1 0 0 1 0 0)");
    assert_eq!(
        matrix_attr(Affine::translate(Vec2::new(-18.0, -18.0))),
        "matrix(1 0 0 1 -18 -18)"
    );
}

#[test]
fn default_placement_centers_the_unit_box() {
    let layer = LayerBuilder::new("c", rect_shape(ink())).into_layer(LogoId::new(), 0);
    let xf = layer_affine(&layer, 64.0, 64.0, UNIT_BOX);
    assert_eq!(matrix_attr(xf), "matrix(1 0 0 1 -18 -18)");
}

#[test]
fn anchor_point_lands_exactly_on_the_position() {
    let layer = LayerBuilder::new("c", rect_shape(ink()))
        .position(0.25, 0.75)
        .scale(2.5)
        .rotation(33.0)
        .into_layer(LogoId::new(), 0);
    let xf = layer_affine(&layer, 200.0, 100.0, UNIT_BOX);

    // anchor fraction 0.5/0.5 of the 100x100 box is (50, 50)
    let mapped = xf * Point::new(50.0, 50.0);
    assert!((mapped.x - 50.0).abs() < 1e-9);
    assert!((mapped.y - 75.0).abs() < 1e-9);
}

#[test]
fn rotation_turns_around_the_anchor() {
    let layer = LayerBuilder::new("c", rect_shape(ink()))
        .rotation(90.0)
        .into_layer(LogoId::new(), 0);
    let xf = layer_affine(&layer, 100.0, 100.0, UNIT_BOX);

    // a point 10 units right of the anchor ends up 10 units below it
    let mapped = xf * Point::new(60.0, 50.0);
    assert!((mapped.x - 50.0).abs() < 1e-9);
    assert!((mapped.y - 60.0).abs() < 1e-9);
}

#[test]
fn corner_anchor_scales_away_from_the_corner() {
    let layer = LayerBuilder::new("c", rect_shape(ink()))
        .position(0.0, 0.0)
        .anchor(0.0, 0.0)
        .scale(2.0)
        .into_layer(LogoId::new(), 0);
    let xf = layer_affine(&layer, 100.0, 100.0, UNIT_BOX);

    let origin = xf * Point::new(0.0, 0.0);
    let far = xf * Point::new(100.0, 100.0);
    assert!((origin.x - 0.0).abs() < 1e-9 && (origin.y - 0.0).abs() < 1e-9);
    assert!((far.x - 200.0).abs() < 1e-9 && (far.y - 200.0).abs() < 1e-9);
}

#[test]
fn fixed_box_kinds_use_the_unit_box() {
    assert_eq!(local_bbox(&rect_shape(ink())).unwrap(), UNIT_BOX);
    assert_eq!(local_bbox(&icon_layer(AssetId::new())).unwrap(), UNIT_BOX);
    assert_eq!(local_bbox(&image_layer(AssetId::new())).unwrap(), UNIT_BOX);
    assert_eq!(local_bbox(&solid_background(Rgb::WHITE)).unwrap(), Rect::ZERO);
    assert_eq!(local_bbox(&text_layer("t", 12.0, ink())).unwrap(), Rect::ZERO);
}

#[test]
fn free_geometry_derives_its_own_box() {
    let path = path_shape("M0 0 L10 0 L10 20 Z", Some(ink()));
    let bbox = local_bbox(&path).unwrap();
    assert_eq!(bbox, Rect::new(0.0, 0.0, 10.0, 20.0));

    let polygon = polygon_shape(vec![[-5.0, 0.0], [5.0, 10.0], [0.0, -10.0]], None);
    assert_eq!(local_bbox(&polygon).unwrap(), Rect::new(-5.0, -10.0, 5.0, 10.0));

    let broken = path_shape("Q not a path", Some(ink()));
    assert!(matches!(
        local_bbox(&broken).unwrap_err(),
        EmblemError::Validation { field, .. } if field == "layer.shape.d"
    ));
}

#[test]
fn icon_markup_loses_the_prolog_and_gains_a_size() {
    let markup = r##"<?xml version="1.0"?><svg viewBox="0 0 24 24"><path d="M0 0h24v24H0z" fill="#000000"/></svg>"##;
    let out = prepare_icon_markup(markup, None).unwrap();
    assert_eq!(
        out,
        r##"<svg viewBox="0 0 24 24" width="100" height="100"><path d="M0 0h24v24H0z" fill="#000000"/></svg>"##
    );
}

#[test]
fn sized_roots_keep_their_own_size() {
    let markup = r#"<svg width="24" height="24" viewBox="0 0 24 24"><rect width="24" height="24"/></svg>"#;
    let out = prepare_icon_markup(markup, None).unwrap();
    assert!(out.starts_with(r#"<svg width="24" height="24""#));
    assert!(!out.contains("\"100\""));
}

#[test]
fn tint_rewrites_explicit_fills_but_not_none() {
    let markup = r##"<svg viewBox="0 0 10 10"><circle cx="5" cy="5" r="4" fill="#ff0000"/><rect width="2" height="2" fill="none"/></svg>"##;
    let out = prepare_icon_markup(markup, Some(ink())).unwrap();

    assert!(out.contains(r##"<circle cx="5" cy="5" r="4" fill="#0080ff"/>"##));
    assert!(out.contains(r#"fill="none""#));
    // root had no fill of its own, so it gains the tint for inheritance
    assert!(out.starts_with(r##"<svg viewBox="0 0 10 10" width="100" height="100" fill="#0080ff">"##));
}

#[test]
fn current_color_becomes_the_tint_on_any_attribute() {
    let markup = r#"<svg viewBox="0 0 10 10"><path d="M0 0h10" stroke="currentColor" fill="currentColor"/></svg>"#;
    let out = prepare_icon_markup(markup, Some(ink())).unwrap();
    assert!(out.contains(r##"stroke="#0080ff""##));
    assert!(out.contains(r##"fill="#0080ff""##));
    assert!(!out.contains("currentColor"));
}

#[test]
fn translucent_tint_sets_fill_opacity_on_the_root() {
    let markup = r#"<svg viewBox="0 0 10 10"><path d="M0 0h10"/></svg>"#;
    let tint = Paint {
        color: Rgb::new(0, 128, 255),
        alpha: 0.5,
    };
    let out = prepare_icon_markup(markup, Some(tint)).unwrap();
    assert!(out.contains(r#"fill-opacity="0.5""#));
}

#[test]
fn malformed_markup_is_a_validation_error() {
    let err = prepare_icon_markup("<svg", None).unwrap_err();
    assert!(matches!(
        err,
        EmblemError::Validation { field, .. } if field == "layer.icon.vector_svg"
    ));
}
