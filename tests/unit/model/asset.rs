use chrono::Utc;

use super::*;

fn raster_asset(name: &str) -> Asset {
    let now = Utc::now();
    Asset {
        id: AssetId::new(),
        kind: AssetKind::Raster,
        name: name.into(),
        storage: "memory".into(),
        url: format!("memory://assets/{name}.png"),
        provider_id: Some(format!("assets/{name}")),
        mime_type: "image/png".into(),
        byte_size: Some(128),
        width: Some(64),
        height: Some(64),
        has_alpha: Some(true),
        dominant: None,
        palette: None,
        vector_svg: None,
        checksum_sha256: None,
        meta: serde_json::Value::Null,
        created_by: None,
        created_at: now,
        updated_at: now,
    }
}

fn inter(weight: u16, style: FontStyle) -> Font {
    let now = Utc::now();
    Font {
        id: FontId::new(),
        family: "Inter".into(),
        style,
        weight,
        url: "memory://fonts/inter.woff2".into(),
        fallbacks: vec!["Helvetica".into(), "sans-serif".into()],
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn font_identity_key_ignores_url_and_id() {
    let a = inter(700, FontStyle::Normal);
    let mut b = inter(700, FontStyle::Normal);
    b.url = "memory://fonts/other.woff2".into();
    assert_eq!(a.identity_key(), b.identity_key());

    assert_ne!(a.identity_key(), inter(400, FontStyle::Normal).identity_key());
    assert_ne!(a.identity_key(), inter(700, FontStyle::Italic).identity_key());
}

#[test]
fn family_stack_lists_family_then_fallbacks() {
    let font = inter(400, FontStyle::Normal);
    assert_eq!(font.family_stack(), vec!["Inter", "Helvetica", "sans-serif"]);

    let mut bare = inter(400, FontStyle::Normal);
    bare.fallbacks.clear();
    assert_eq!(bare.family_stack(), vec!["Inter"]);
}

#[test]
fn catalog_resolves_known_assets() {
    let asset = raster_asset("mark");
    let id = asset.id;
    let mut catalog = AssetCatalog::new();
    catalog.insert_asset(asset.clone());

    assert_eq!(catalog.require_asset(id).unwrap(), &asset);
    assert_eq!(catalog.asset_count(), 1);
}

#[test]
fn catalog_misses_are_typed_not_found() {
    let catalog = AssetCatalog::new();
    let id = AssetId::new();
    let err = catalog.require_asset(id).unwrap_err();
    assert!(matches!(
        err,
        EmblemError::NotFound { ref entity, .. } if *entity =="asset"
    ));
    assert_eq!(err.to_string(), format!("not found: asset '{id}'"));
}

#[test]
fn catalog_font_lookup_is_optional() {
    let font = inter(500, FontStyle::Normal);
    let id = font.id;
    let mut catalog = AssetCatalog::new();
    catalog.insert_font(font);

    assert!(catalog.font(id).is_some());
    assert!(catalog.font(FontId::new()).is_none());
    assert_eq!(catalog.font_count(), 1);
}

#[test]
fn asset_json_omits_unset_fields() {
    let mut asset = raster_asset("mark");
    asset.provider_id = None;
    asset.byte_size = None;
    asset.has_alpha = None;
    let json = serde_json::to_value(&asset).unwrap();

    let keys = json.as_object().unwrap();
    assert!(!keys.contains_key("provider_id"));
    assert!(!keys.contains_key("byte_size"));
    assert!(!keys.contains_key("has_alpha"));
    assert!(!keys.contains_key("vector_svg"));
    assert!(!keys.contains_key("meta"));
    assert_eq!(json["kind"], "raster");
    assert_eq!(json["storage"], "memory");

    let back: Asset = serde_json::from_value(json).unwrap();
    assert_eq!(back, asset);
}

#[test]
fn font_style_defaults_to_normal_in_json() {
    let json = serde_json::json!({
        "id": uuid::Uuid::new_v4().to_string(),
        "family": "Inter",
        "weight": 400,
        "url": "memory://fonts/inter.woff2",
        "created_at": "2024-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    });
    let font: Font = serde_json::from_value(json).unwrap();
    assert_eq!(font.style, FontStyle::Normal);
    assert!(font.fallbacks.is_empty());
}
