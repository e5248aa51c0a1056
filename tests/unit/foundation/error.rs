use super::*;

#[test]
fn constructors_build_the_matching_variants() {
    assert!(matches!(
        EmblemError::validation("layer.opacity", "too big"),
        EmblemError::Validation { field, message } if field == "layer.opacity" && message == "too big"
    ));
    assert!(matches!(
        EmblemError::not_found("logo", "abc"),
        EmblemError::NotFound { entity: "logo", id } if id == "abc"
    ));
    assert!(matches!(
        EmblemError::out_of_range(9, 3),
        EmblemError::OutOfRange { index: 9, len: 3 }
    ));
    assert!(matches!(EmblemError::conflict("raced"), EmblemError::Conflict(m) if m == "raced"));
    assert!(matches!(EmblemError::media("gone"), EmblemError::Media(m) if m == "gone"));
    assert!(matches!(EmblemError::canceled("late"), EmblemError::Canceled(m) if m == "late"));
    assert!(matches!(EmblemError::serde("bad json"), EmblemError::Serde(m) if m == "bad json"));
}

#[test]
fn display_messages_carry_the_details() {
    assert_eq!(
        EmblemError::validation("layer.scale", "must be > 0").to_string(),
        "validation error: layer.scale: must be > 0"
    );
    assert_eq!(
        EmblemError::not_found("asset", "a-1").to_string(),
        "not found: asset 'a-1'"
    );
    assert_eq!(
        EmblemError::out_of_range(4, 4).to_string(),
        "z-index 4 out of range for stack of 4"
    );
    assert_eq!(
        EmblemError::conflict("duplicate z-index 2").to_string(),
        "conflict: duplicate z-index 2"
    );
}

#[test]
fn anyhow_errors_pass_through_transparently() {
    fn inner() -> EmblemResult<()> {
        Err(anyhow::anyhow!("disk on fire").into())
    }

    let err = inner().unwrap_err();
    assert!(matches!(err, EmblemError::Other(_)));
    assert_eq!(err.to_string(), "disk on fire");
}
