use std::time::Duration;

use super::*;

#[test]
fn rgb_parses_hex_with_and_without_hash() {
    assert_eq!(Rgb::parse("#ff8800").unwrap(), Rgb::new(255, 136, 0));
    assert_eq!(Rgb::parse("FF8800").unwrap(), Rgb::new(255, 136, 0));
    assert_eq!(Rgb::parse("#000000").unwrap(), Rgb::BLACK);
}

#[test]
fn rgb_rejects_malformed_hex() {
    for bad in ["", "#fff", "#12345", "#1234567", "zzzzzz", "#ggg000"] {
        assert!(Rgb::parse(bad).is_err(), "accepted {bad:?}");
    }
}

#[test]
fn rgb_round_trips_through_hex_and_display() {
    let c = Rgb::new(18, 52, 86);
    assert_eq!(c.to_hex(), "#123456");
    assert_eq!(c.to_string(), "#123456");
    assert_eq!("#123456".parse::<Rgb>().unwrap(), c);
}

#[test]
fn rgb_serde_uses_hex_strings() {
    let c = Rgb::new(10, 11, 12);
    let json = serde_json::to_value(c).unwrap();
    assert_eq!(json, serde_json::json!("#0a0b0c"));
    let back: Rgb = serde_json::from_value(json).unwrap();
    assert_eq!(back, c);

    let bad: Result<Rgb, _> = serde_json::from_value(serde_json::json!("not-a-color"));
    assert!(bad.is_err());
}

#[test]
fn canvas_rejects_zero_dimensions() {
    assert!(Canvas::new(0, 100).is_err());
    assert!(Canvas::new(100, 0).is_err());
    assert_eq!(Canvas::new(64, 32).unwrap(), Canvas {
        width: 64,
        height: 32
    });
    assert_eq!(Canvas::default(), Canvas::DEFAULT);
    assert_eq!(Canvas::DEFAULT.width, 1080);
}

#[test]
fn paint_alpha_must_stay_in_unit_range() {
    assert!(Paint::solid(Rgb::BLACK).validate("fill").is_ok());
    assert!(Paint::new(Rgb::BLACK, 0.0).validate("fill").is_ok());

    let over = Paint::new(Rgb::BLACK, 1.5).validate("fill").unwrap_err();
    assert!(matches!(
        over,
        EmblemError::Validation { field, .. } if field == "fill.alpha"
    ));
    assert!(Paint::new(Rgb::BLACK, f64::NAN).validate("fill").is_err());
}

#[test]
fn deadline_none_always_passes() {
    Deadline::NONE.check("anything").unwrap();
    Deadline::default().check("anything").unwrap();
}

#[test]
fn expired_deadline_names_the_phase() {
    let deadline = Deadline::within(Duration::ZERO);
    let err = deadline.check("rasterize").unwrap_err();
    match err {
        EmblemError::Canceled(msg) => assert!(msg.contains("rasterize"), "{msg}"),
        other => panic!("expected Canceled, got {other:?}"),
    }
}

#[test]
fn generous_deadline_passes() {
    Deadline::within(Duration::from_secs(3600)).check("compose").unwrap();
}

#[test]
fn page_request_first_starts_at_zero() {
    let page = PageRequest::first(25);
    assert_eq!(page.offset, 0);
    assert_eq!(page.limit, 25);
    assert_eq!(PageRequest::new(50, 25).offset, 50);
}

#[test]
fn ids_display_as_plain_uuids() {
    let id = LogoId::new();
    assert_eq!(id.to_string(), id.0.to_string());
    assert_ne!(LayerId::new(), LayerId::new());
}
