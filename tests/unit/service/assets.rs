use super::*;
use crate::store::logo::MemoryLogoStore;
use crate::store::media::{MemoryMediaStore, sign_params};

fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes
}

fn studio() -> (MemoryLogoStore, MemoryMediaStore) {
    (MemoryLogoStore::new(), MemoryMediaStore::new())
}

#[test]
fn raster_ingest_records_upload_and_row_together() {
    let (store, media) = studio();
    let service = AssetService::new(&store, &media);
    let bytes = tiny_png(64, 32);
    let owner = UserId::new();

    let asset = service
        .ingest(&bytes, "mark.png", "image/png", None, Some(owner))
        .unwrap();

    assert_eq!(asset.kind, AssetKind::Raster);
    assert_eq!(asset.name, "mark.png");
    assert_eq!(asset.mime_type, "image/png");
    assert_eq!(asset.storage, "memory");
    assert!(asset.url.starts_with("memory://"));
    assert_eq!(asset.byte_size, Some(bytes.len() as u64));
    assert_eq!((asset.width, asset.height), (Some(64), Some(32)));
    assert_eq!(asset.has_alpha, Some(true));
    assert_eq!(asset.vector_svg, None);
    assert_eq!(asset.checksum_sha256.as_deref(), Some(hex_digest(&bytes).as_str()));
    assert_eq!(asset.created_by, Some(owner));

    assert_eq!(store.fetch_asset(asset.id).unwrap(), asset);
    assert_eq!(media.object_count(), 1);
    let provider_id = asset.provider_id.as_deref().unwrap();
    assert_eq!(media.fetch_bytes(provider_id).unwrap(), bytes);
}

#[test]
fn svg_ingest_keeps_the_markup_inline() {
    let (store, media) = studio();
    let service = AssetService::new(&store, &media);
    let markup = r##"<svg xmlns="http://www.w3.org/2000/svg"><rect fill="#123456"/></svg>"##;

    let asset = service
        .ingest(markup.as_bytes(), "glyph.svg", "image/svg+xml", None, None)
        .unwrap();

    assert_eq!(asset.kind, AssetKind::Vector);
    assert_eq!(asset.vector_svg.as_deref(), Some(markup));
    assert_eq!(asset.has_alpha, Some(true));
    assert_eq!((asset.width, asset.height), (None, None));
    assert_eq!(media.object_count(), 1);
}

#[test]
fn a_pinned_kind_overrides_detection() {
    let (store, media) = studio();
    let service = AssetService::new(&store, &media);

    let asset = service
        .ingest(
            &tiny_png(8, 8),
            "weave.png",
            "image/png",
            Some(AssetKind::Pattern),
            None,
        )
        .unwrap();
    assert_eq!(asset.kind, AssetKind::Pattern);
}

#[test]
fn invalid_vector_bytes_never_reach_the_provider() {
    let (store, media) = studio();
    let service = AssetService::new(&store, &media);

    let err = service
        .ingest(&[0xff, 0xfe, 0x00, 0x80], "bad.svg", "image/svg+xml", None, None)
        .unwrap_err();
    assert!(matches!(
        err,
        EmblemError::Validation { ref field, .. } if field == "asset.vector_svg"
    ));
    assert_eq!(media.object_count(), 0);
}

#[test]
fn delete_removes_record_and_object() {
    let (store, media) = studio();
    let service = AssetService::new(&store, &media);
    let asset = service
        .ingest(&tiny_png(4, 4), "gone.png", "image/png", None, None)
        .unwrap();
    let provider_id = asset.provider_id.clone().unwrap();

    service.delete(asset.id).unwrap();
    assert!(store.fetch_asset(asset.id).is_err());
    assert!(media.fetch_bytes(&provider_id).is_err());
    assert_eq!(media.object_count(), 0);
}

#[test]
fn delete_survives_a_provider_that_already_dropped_the_object() {
    let (store, media) = studio();
    let service = AssetService::new(&store, &media);
    let asset = service
        .ingest(&tiny_png(4, 4), "flaky.png", "image/png", None, None)
        .unwrap();

    // the provider object vanishes out from under us
    media.delete(asset.provider_id.as_deref().unwrap()).unwrap();

    service.delete(asset.id).unwrap();
    assert!(store.fetch_asset(asset.id).is_err());
}

#[test]
fn deleting_an_unknown_asset_is_not_found() {
    let (store, media) = studio();
    let service = AssetService::new(&store, &media);
    assert!(matches!(
        service.delete(AssetId::new()).unwrap_err(),
        EmblemError::NotFound { ref entity, .. } if *entity =="asset"
    ));
}

#[test]
fn direct_upload_signatures_verify_against_the_secret() {
    let store = MemoryLogoStore::new();
    let media = MemoryMediaStore::with_secret("test");
    let service = AssetService::new(&store, &media);

    let request = SignRequest {
        public_id: Some("replace-me".into()),
        ..SignRequest::default()
    };
    let signed = service.sign_direct_upload(&request).unwrap();

    assert_eq!(signed.params.get("folder").map(String::as_str), Some(DEFAULT_FOLDER));
    assert_eq!(
        signed.params.get("public_id").map(String::as_str),
        Some("replace-me")
    );
    assert_eq!(
        signed.params.get("timestamp").map(String::as_str),
        Some(signed.timestamp.to_string().as_str())
    );
    assert_eq!(signed.signature, sign_params(&signed.params, "test"));
}
