//! Tests for the effect catalog adapter

mod common;

use common::*;

#[test]
fn test_directory_lists_models() {
    let catalog = CatalogDirectory::open(fixture_catalog_dir()).unwrap();
    assert_eq!(catalog.models(), vec!["H6008", "H6199"]);
    assert!(catalog.document("H6199").is_some());
    assert!(catalog.document("README").is_none());
}

#[test]
fn test_malformed_sibling_is_skipped() {
    let catalog = CatalogDirectory::open(fixture_catalog_dir()).unwrap();
    assert!(fixture_catalog_dir().join("H9999.json").is_file());
    assert!(catalog.document("H9999").is_none());
    assert!(catalog.effects("H9999").is_empty());

    let params = catalog.lookup("H6199", EffectRef::new(0, 0, 0, 0)).unwrap();
    assert_eq!(params.len(), 10);
    assert!(matches!(
        catalog.lookup("H9999", EffectRef::new(0, 0, 0, 0)),
        Err(GoveeError::EffectNotFound { .. })
    ));
}

#[test]
fn test_missing_directory_is_io_error() {
    let result = CatalogDirectory::open(fixture_catalog_dir().join("does-not-exist"));
    assert!(matches!(result, Err(GoveeError::Io(_))));
}

#[test]
fn test_effect_names() {
    let catalog = CatalogDirectory::open(fixture_catalog_dir()).unwrap();
    let names: Vec<String> = catalog.effects("H6199").into_iter().map(|e| e.name).collect();
    assert_eq!(
        names,
        vec![
            "Life - Sunrise - Sunrise [0/0/0/0]",
            "Life - Aurora - Aurora A [0/1/0/0]",
            "Life - Aurora - Aurora A [0/1/0/1]",
            "Festival - Party - Party [1/0/0/0]",
        ]
    );
    assert!(catalog.effects("H9999").is_empty());
}

#[test]
fn test_effect_names_parse_back() {
    let catalog = CatalogDirectory::open(fixture_catalog_dir()).unwrap();
    for entry in catalog.effects("H6199") {
        let parsed: EffectRef = entry.name.parse().unwrap();
        assert_eq!(parsed, entry.effect, "{}", entry.name);
    }
}

#[test]
fn test_effect_ref_parsing() {
    assert_eq!("[3/2/1/0]".parse::<EffectRef>().unwrap(), EffectRef::new(3, 2, 1, 0));
    assert_eq!(EffectRef::new(3, 2, 1, 0).to_string(), "[3/2/1/0]");

    for bad in ["Sunrise", "[1/2/3]", "[a/b/c/d]", "1/2/3/4", "[1/2/3/99999999999999999999999]"] {
        assert!(
            matches!(bad.parse::<EffectRef>(), Err(GoveeError::InvalidEffectName(_))),
            "{:?} should not parse",
            bad
        );
    }
}

#[test]
fn test_lookup_decodes_base64() {
    let catalog = CatalogDirectory::open(fixture_catalog_dir()).unwrap();
    let params = catalog.lookup("H6199", EffectRef::new(0, 0, 0, 0)).unwrap();
    assert_eq!(&params[..], hex::decode("0100027f0f0001020304").unwrap().as_slice());

    let params = catalog.lookup("H6008", EffectRef::new(0, 0, 0, 0)).unwrap();
    assert_eq!(params.len(), 10);
}

#[test]
fn test_lookup_malformed_blob_is_not_found() {
    let catalog = CatalogDirectory::open(fixture_catalog_dir()).unwrap();
    let result = catalog.lookup("H6199", EffectRef::new(0, 1, 0, 1));
    assert!(matches!(result, Err(GoveeError::EffectNotFound { .. })));
}

#[test]
fn test_lookup_empty_blob_is_one_opening_frame() {
    let catalog = CatalogDirectory::open(fixture_catalog_dir()).unwrap();
    let params = catalog.lookup("H6199", EffectRef::new(1, 0, 0, 0)).unwrap();
    assert!(params.is_empty());

    let frames = govee_ble_lib::multipacket::split_into_frames(MARKER_MULTI_FRAME, &[SUBTYPE_EFFECT_DATA], &params)
        .unwrap();
    assert_eq!(frames.len(), 1);
}

#[test]
fn test_document_from_json() {
    let json = r#"{
        "data": {
            "categories": [
                { "categoryName": "Mood", "scenes": [
                    { "sceneName": "Calm", "lightEffects": [
                        { "scenceName": "Calm", "specialEffect": [ { "scenceParam": "AQID" } ] }
                    ] }
                ] }
            ]
        }
    }"#;
    let document = CatalogDocument::from_json(json).unwrap();
    assert_eq!(document.effects().len(), 1);
    assert_eq!(&document.params(EffectRef::new(0, 0, 0, 0)).unwrap()[..], &[1u8, 2, 3]);
    assert!(document.params(EffectRef::new(0, 0, 0, 1)).is_none());

    assert!(matches!(CatalogDocument::from_json("{\"data\": {}}"), Err(GoveeError::Json(_))));
}
