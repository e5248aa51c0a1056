use super::*;
use crate::foundation::core::{AssetId, Paint, Rgb};
use crate::model::dsl::{
    LayerBuilder, LogoBuilder, circle_shape, icon_layer, image_layer, solid_background,
    text_layer,
};
use crate::model::logo::LayerPayload;

fn five_kind_fixture() -> (Logo, Vec<Layer>) {
    let ink = Paint::solid(Rgb::new(30, 30, 30));
    LogoBuilder::new(UserId::new(), "everything")
        .dpi(300)
        .layer(LayerBuilder::new("bg", solid_background(Rgb::WHITE)))
        .layer(LayerBuilder::new("word", text_layer("all", 20.0, ink)))
        .layer(LayerBuilder::new("dot", circle_shape(ink)))
        .layer(LayerBuilder::new("mark", icon_layer(AssetId::new())))
        .layer(LayerBuilder::new("photo", image_layer(AssetId::new())))
        .build()
        .unwrap()
}

#[test]
fn capture_orders_layers_ascending_by_z() {
    let (logo, mut layers) = five_kind_fixture();
    layers.reverse();

    let snapshot = Snapshot::capture(&logo, &layers).unwrap();
    let zs: Vec<u32> = snapshot.layers.iter().map(|l| l.z_index).collect();
    assert_eq!(zs, vec![0, 1, 2, 3, 4]);
    assert_eq!(snapshot.id, logo.id);
    assert_eq!(snapshot.title, "everything");
    assert_eq!((snapshot.canvas_w, snapshot.canvas_h), (1080, 1080));
    assert_eq!(snapshot.dpi, Some(300));
}

#[test]
fn capture_refuses_a_corrupt_stack() {
    let (logo, mut layers) = five_kind_fixture();
    layers[3].z_index = 1;
    assert!(matches!(
        Snapshot::capture(&logo, &layers).unwrap_err(),
        EmblemError::Conflict(_)
    ));
}

#[test]
fn documents_round_trip_through_json() {
    let (logo, layers) = five_kind_fixture();
    let snapshot = Snapshot::capture(&logo, &layers).unwrap();

    let json = snapshot.to_json().unwrap();
    assert_eq!(json["title"], "everything");
    assert_eq!(json["layers"].as_array().unwrap().len(), 5);

    let back = Snapshot::from_json(json).unwrap();
    assert_eq!(back, snapshot);
}

#[test]
fn garbage_documents_fail_to_parse() {
    let err = Snapshot::from_json(serde_json::json!({"title": 42})).unwrap_err();
    assert!(matches!(err, EmblemError::Serde(_)));
}

#[test]
fn instantiate_mints_fresh_identities() {
    let (logo, layers) = five_kind_fixture();
    let snapshot = Snapshot::capture(&logo, &layers).unwrap();

    let owner = UserId::new();
    let (copy, copy_layers) = snapshot.instantiate(owner, "fresh").unwrap();

    assert_ne!(copy.id, logo.id);
    assert_eq!(copy.owner_id, owner);
    assert_eq!(copy.title, "fresh");
    assert_eq!(copy_layers.len(), layers.len());
    for (new, old) in copy_layers.iter().zip(&layers) {
        assert_ne!(new.id, old.id);
        assert_eq!(new.logo_id, copy.id);
        assert_eq!(new.z_index, old.z_index);
        assert_eq!(new.name, old.name);
        assert_eq!(new.payload, old.payload);
        assert_eq!((new.x_norm, new.y_norm), (old.x_norm, old.y_norm));
    }
}

#[test]
fn instantiate_shares_asset_references() {
    let shared = AssetId::new();
    let (logo, layers) = LogoBuilder::new(UserId::new(), "shared media")
        .layer(LayerBuilder::new("mark", icon_layer(shared)))
        .build()
        .unwrap();

    let snapshot = Snapshot::capture(&logo, &layers).unwrap();
    let (_, copy_layers) = snapshot.instantiate(UserId::new(), "copy").unwrap();
    match &copy_layers[0].payload {
        LayerPayload::Icon(icon) => assert_eq!(icon.asset_id, shared),
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn instantiate_drops_source_only_fields() {
    let (mut logo, layers) = five_kind_fixture();
    logo.thumbnail_url = Some("memory://thumbs/src.png".into());
    logo.category_id = Some(CategoryId::new());
    logo.is_template = true;

    let snapshot = Snapshot::capture(&logo, &layers).unwrap();
    assert_eq!(snapshot.thumbnail_url.as_deref(), Some("memory://thumbs/src.png"));

    let (copy, _) = snapshot.instantiate(UserId::new(), "plain copy").unwrap();
    assert_eq!(copy.thumbnail_url, None);
    assert_eq!(copy.category_id, None);
    assert!(!copy.is_template);
    assert_eq!(copy.dpi, Some(300));
}

#[test]
fn instantiate_validates_the_stored_canvas() {
    let (logo, layers) = five_kind_fixture();
    let mut snapshot = Snapshot::capture(&logo, &layers).unwrap();
    snapshot.canvas_w = 0;
    assert!(snapshot.instantiate(UserId::new(), "broken").is_err());
}

#[test]
fn empty_stacks_are_capturable() {
    let (logo, layers) = LogoBuilder::new(UserId::new(), "blank").build().unwrap();
    let snapshot = Snapshot::capture(&logo, &layers).unwrap();
    assert!(snapshot.layers.is_empty());
    let (_, copy_layers) = snapshot.instantiate(UserId::new(), "still blank").unwrap();
    assert!(copy_layers.is_empty());
}
