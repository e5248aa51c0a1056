use super::*;

/// Minimal PNG header: signature plus an IHDR carrying the dimensions.
fn tiny_png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = PNG_SIGNATURE.to_vec();
    bytes.extend_from_slice(&13u32.to_be_bytes());
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    bytes
}

#[test]
fn uploads_are_content_addressed() {
    let store = MemoryMediaStore::new();
    let first = store
        .upload(b"same bytes", "a.png", "image/png", DEFAULT_FOLDER)
        .unwrap();
    let again = store
        .upload(b"same bytes", "b.png", "image/png", DEFAULT_FOLDER)
        .unwrap();

    assert_eq!(first.provider_id, again.provider_id);
    assert_eq!(first.url, again.url);
    assert_eq!(store.object_count(), 1);

    let expected_id = format!("{DEFAULT_FOLDER}/{}", &hex_digest(b"same bytes")[..16]);
    assert_eq!(first.provider_id, expected_id);
    assert_eq!(first.url, format!("memory://{expected_id}.png"));
    assert_eq!(first.byte_size, 10);
}

#[test]
fn different_bytes_become_different_objects() {
    let store = MemoryMediaStore::new();
    let a = store.upload(b"aaa", "a.bin", "application/x-blob", "f").unwrap();
    let b = store.upload(b"bbb", "b.bin", "application/x-blob", "f").unwrap();
    assert_ne!(a.provider_id, b.provider_id);
    assert_eq!(store.object_count(), 2);
    // unknown content types fall back to a .bin extension
    assert!(a.url.ends_with(".bin"));
    assert_eq!(a.format, None);
}

#[test]
fn empty_payloads_are_rejected() {
    let store = MemoryMediaStore::new();
    let err = store.upload(b"", "x.png", "image/png", "f").unwrap_err();
    assert!(matches!(
        err,
        EmblemError::Validation { field, .. } if field == "media.bytes"
    ));
    assert_eq!(store.object_count(), 0);
}

#[test]
fn png_dimensions_are_sniffed_from_ihdr() {
    let store = MemoryMediaStore::new();
    let uploaded = store
        .upload(&tiny_png(640, 360), "dims.png", "image/png", "f")
        .unwrap();
    assert_eq!(uploaded.width, Some(640));
    assert_eq!(uploaded.height, Some(360));
    assert_eq!(uploaded.format.as_deref(), Some("png"));

    // non-PNG bytes carry no dimensions even under a png content type
    let opaque = store.upload(b"not a png", "no.png", "image/png", "f").unwrap();
    assert_eq!(opaque.width, None);
    assert_eq!(opaque.height, None);
}

#[test]
fn svg_uploads_keep_their_extension() {
    let store = MemoryMediaStore::new();
    let uploaded = store
        .upload(b"<svg/>", "mark.svg", "image/svg+xml", "f")
        .unwrap();
    assert!(uploaded.url.ends_with(".svg"));
    assert_eq!(uploaded.format.as_deref(), Some("svg"));
}

#[test]
fn stored_bytes_and_names_can_be_read_back() {
    let store = MemoryMediaStore::new();
    let uploaded = store.upload(b"payload", "orig.png", "image/png", "f").unwrap();

    assert_eq!(store.fetch_bytes(&uploaded.provider_id).unwrap(), b"payload");
    assert_eq!(store.object_name(&uploaded.provider_id).unwrap(), "orig.png");

    let err = store.fetch_bytes("f/does-not-exist").unwrap_err();
    assert!(matches!(err, EmblemError::NotFound { ref entity, .. } if *entity =="media object"));
}

#[test]
fn delete_removes_the_object_once() {
    let store = MemoryMediaStore::new();
    let uploaded = store.upload(b"gone soon", "g.png", "image/png", "f").unwrap();

    store.delete(&uploaded.provider_id).unwrap();
    assert_eq!(store.object_count(), 0);

    let err = store.delete(&uploaded.provider_id).unwrap_err();
    assert!(matches!(err, EmblemError::Media(_)));
    assert!(err.to_string().starts_with("media error:"));
}

#[test]
fn identity_transforms_return_the_original_url() {
    let store = MemoryMediaStore::new();
    let uploaded = store.upload(b"pic", "p.png", "image/png", "f").unwrap();
    let url = store
        .transformed_url(&uploaded.provider_id, &TransformOptions::default())
        .unwrap();
    assert_eq!(url, uploaded.url);
}

#[test]
fn transforms_encode_their_parameters() {
    let store = MemoryMediaStore::new();
    let uploaded = store.upload(b"pic", "p.png", "image/png", "f").unwrap();

    let options = TransformOptions::sized(300, 150)
        .quality(80)
        .format(RasterFormat::Jpeg);
    let url = store.transformed_url(&uploaded.provider_id, &options).unwrap();
    assert_eq!(url, format!("{}?w=300&h=150&q=80&f=jpg", uploaded.url));

    assert!(store
        .transformed_url("f/missing", &TransformOptions::default())
        .is_err());
}

#[test]
fn sign_params_hashes_the_canonical_string() {
    let mut params = BTreeMap::new();
    params.insert("b".to_string(), "2".to_string());
    params.insert("a".to_string(), "1".to_string());

    // BTreeMap iteration sorts the keys, so the canonical form is a=1&b=2
    assert_eq!(sign_params(&params, "s"), hex_digest(b"a=1&b=2s"));
}

#[test]
fn signed_uploads_verify_against_the_secret() {
    let store = MemoryMediaStore::with_secret("test");
    let signed = store.sign_upload(&SignRequest::default()).unwrap();

    assert_eq!(signed.params.get("folder").map(String::as_str), Some(DEFAULT_FOLDER));
    assert_eq!(signed.params.get("resource_type").map(String::as_str), Some("auto"));
    assert_eq!(
        signed.params.get("timestamp").map(String::as_str),
        Some(signed.timestamp.to_string().as_str())
    );
    assert!(!signed.params.contains_key("public_id"));
    assert_eq!(signed.signature, sign_params(&signed.params, "test"));
}

#[test]
fn signing_covers_the_requested_public_id() {
    let store = MemoryMediaStore::with_secret("test");
    let request = SignRequest {
        public_id: Some("assets/pinned".to_string()),
        ..SignRequest::default()
    };
    let signed = store.sign_upload(&request).unwrap();
    assert_eq!(
        signed.params.get("public_id").map(String::as_str),
        Some("assets/pinned")
    );
    assert_eq!(signed.signature, sign_params(&signed.params, "test"));
}

#[test]
fn the_backend_tag_is_memory() {
    assert_eq!(MemoryMediaStore::new().backend(), "memory");
}
