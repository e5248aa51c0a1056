use std::time::Duration;

use super::*;
use crate::foundation::core::{AssetId, Canvas, Deadline, FontId, Paint, Rgb, UserId};
use crate::model::dsl::{
    LayerBuilder, LogoBuilder, circle_shape, icon_layer, solid_background, text_layer,
};
use crate::model::logo::LayerPayload;
use crate::store::logo::MemoryLogoStore;
use crate::store::media::MemoryMediaStore;

/// A red background with a blue circle on a canvas of the given size.
fn seeded(canvas: Canvas) -> (MemoryLogoStore, MemoryMediaStore, Logo) {
    let store = MemoryLogoStore::new();
    let media = MemoryMediaStore::new();
    let (logo, layers) = LogoBuilder::new(UserId::new(), "export me")
        .canvas(canvas)
        .layer(LayerBuilder::new("bg", solid_background(Rgb::new(255, 0, 0))))
        .layer(LayerBuilder::new(
            "mark",
            circle_shape(Paint::solid(Rgb::new(0, 0, 255))),
        ))
        .build()
        .unwrap();
    store.insert_logo_with_layers(&logo, &layers).unwrap();
    (store, media, logo)
}

fn small() -> (MemoryLogoStore, MemoryMediaStore, Logo) {
    seeded(Canvas::new(64, 64).unwrap())
}

#[test]
fn export_svg_matches_a_direct_render_of_the_stored_state() {
    let (store, media, logo) = small();
    let service = ExportService::new(&store, &media);
    let options = RenderOptions::default();

    let exported = service.export_svg(logo.id, &options).unwrap();

    let fetched = store.fetch_logo(logo.id).unwrap();
    let layers = store.fetch_layers(logo.id).unwrap();
    let direct = render_svg(&fetched, &layers, &AssetCatalog::new(), &options).unwrap();
    assert_eq!(exported, direct);
    assert_eq!(media.object_count(), 0);
}

#[test]
fn export_png_uploads_a_decodable_rendition() {
    let (store, media, logo) = small();
    let service = ExportService::new(&store, &media);

    let export = service.export_png(logo.id, &RenderOptions::default()).unwrap();
    assert_eq!((export.width, export.height), (64, 64));
    assert!(export.download_url.starts_with("memory://"));
    assert!(export.byte_size > 0);

    assert_eq!(media.object_count(), 1);
    assert_eq!(
        media.object_name(&export.provider_id).unwrap(),
        format!("logo-{}.png", logo.id)
    );
    let bytes = media.fetch_bytes(&export.provider_id).unwrap();
    assert_eq!(bytes.len() as u64, export.byte_size);
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 64));
}

#[test]
fn export_png_honors_an_explicit_size() {
    let (store, media, logo) = small();
    let service = ExportService::new(&store, &media);

    let export = service
        .export_png(logo.id, &RenderOptions::sized(32, 16))
        .unwrap();
    assert_eq!((export.width, export.height), (32, 16));

    let bytes = media.fetch_bytes(&export.provider_id).unwrap();
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (32, 16));
}

#[test]
fn thumbnail_defaults_to_the_standard_edge_and_persists_its_url() {
    let (store, media, logo) = small();
    let service = ExportService::new(&store, &media);
    assert_eq!(logo.thumbnail_url, None);

    let thumb = service.thumbnail(logo.id, &RenderOptions::default()).unwrap();
    assert_eq!((thumb.width, thumb.height), (THUMBNAIL_SIZE, THUMBNAIL_SIZE));

    let updated = store.fetch_logo(logo.id).unwrap();
    assert_eq!(updated.thumbnail_url.as_deref(), Some(thumb.thumbnail_url.as_str()));

    let provider_id = thumb
        .thumbnail_url
        .strip_prefix("memory://")
        .and_then(|rest| rest.strip_suffix(".png"))
        .unwrap();
    assert_eq!(
        media.object_name(provider_id).unwrap(),
        format!("logo-{}-thumb.png", logo.id)
    );
}

#[test]
fn thumbnail_takes_caller_dimensions_over_the_default() {
    let (store, media, logo) = small();
    let service = ExportService::new(&store, &media);

    let thumb = service
        .thumbnail(logo.id, &RenderOptions::sized(100, 50))
        .unwrap();
    assert_eq!((thumb.width, thumb.height), (100, 50));
}

#[test]
fn an_expired_deadline_cancels_before_anything_is_uploaded() {
    let (store, media, logo) = small();
    let service = ExportService::new(&store, &media);
    let expired = RenderOptions::default().deadline(Deadline::within(Duration::ZERO));

    let err = service.export_png(logo.id, &expired).unwrap_err();
    assert!(matches!(err, EmblemError::Canceled(_)));
    assert_eq!(media.object_count(), 0);

    let err = service.thumbnail(logo.id, &expired).unwrap_err();
    assert!(matches!(err, EmblemError::Canceled(_)));
    assert_eq!(media.object_count(), 0);
    assert_eq!(store.fetch_logo(logo.id).unwrap().thumbnail_url, None);
}

#[test]
fn a_dangling_asset_reference_fails_the_export() {
    let store = MemoryLogoStore::new();
    let media = MemoryMediaStore::new();
    let (logo, layers) = LogoBuilder::new(UserId::new(), "broken")
        .layer(LayerBuilder::new("icon", icon_layer(AssetId::new())))
        .build()
        .unwrap();
    store.insert_logo_with_layers(&logo, &layers).unwrap();
    let service = ExportService::new(&store, &media);

    let err = service
        .export_svg(logo.id, &RenderOptions::default())
        .unwrap_err();
    assert!(matches!(err, EmblemError::NotFound { ref entity, .. } if *entity =="asset"));
}

#[test]
fn a_dangling_font_reference_falls_back_to_the_default_face() {
    let store = MemoryLogoStore::new();
    let media = MemoryMediaStore::new();
    let mut payload = text_layer("Acme", 12.0, Paint::solid(Rgb::BLACK));
    if let LayerPayload::Text(text) = &mut payload {
        text.font_id = Some(FontId::new());
    }
    let (logo, layers) = LogoBuilder::new(UserId::new(), "wordmark")
        .layer(LayerBuilder::new("word", payload))
        .build()
        .unwrap();
    store.insert_logo_with_layers(&logo, &layers).unwrap();
    let service = ExportService::new(&store, &media);

    let svg = service.export_svg(logo.id, &RenderOptions::default()).unwrap();
    assert!(!svg.contains("font-family"));
    assert!(svg.contains(">Acme</text>"));
}
