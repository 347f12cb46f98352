use gangway::bindings::Bindings;
use std::collections::HashMap;
use std::path::PathBuf;

fn test_file(f: &str) -> PathBuf {
    PathBuf::from(format!("tests/bindings/{}", f))
}

#[test]
fn explicit() {
    let mut explicit_map = HashMap::new();
    explicit_map.insert(String::from("memory"), String::from("scratch"));
    let map = Bindings::ffi(explicit_map);

    let result = map.translate("ffi", "memory").unwrap();
    assert!(result == "scratch");

    let result = map.translate("ffi", "nonexistent");
    assert!(
        result.is_err(),
        "explicit import map returned value for non-existent symbol"
    );
}

#[test]
fn standard_covers_the_memory_import() {
    let map = Bindings::standard();
    let result = map.translate("ffi", "memory").expect("memory has a binding");
    assert!(result == "memory");

    assert!(
        map.translate("env", "memory").is_err(),
        "standard bindings returned value for an unbound namespace"
    );
}

#[test]
fn explicit_from_nonexistent_file() {
    let fail_map = Bindings::from_file(&test_file("nonexistent_bindings.json"));
    assert!(
        fail_map.is_err(),
        "Bindings::from_file did not fail on a non-existent file"
    );
}

#[test]
fn explicit_from_garbage_file() {
    let fail_map = Bindings::from_file(&test_file("garbage.json"));
    assert!(
        fail_map.is_err(),
        "Bindings::from_file did not fail on a garbage file"
    );
}

#[test]
fn explicit_from_file() {
    let map = Bindings::from_file(&test_file("bindings_test.json"))
        .expect("load valid bindings from file");
    let result = map.translate("ffi", "memory").expect("memory has a binding");
    assert!(result == "scratch");

    assert!(
        map.translate("ffi", "nonexistent").is_err(),
        "bindings from file returned value for non-existent symbol"
    );
}

#[test]
fn extend_refuses_conflicts() {
    let mut map = Bindings::standard();

    let mut same = HashMap::new();
    same.insert(String::from("memory"), String::from("memory"));
    map.extend(&Bindings::ffi(same))
        .expect("identical binding is not a conflict");

    let mut conflicting = HashMap::new();
    conflicting.insert(String::from("memory"), String::from("other"));
    assert!(
        map.extend(&Bindings::ffi(conflicting)).is_err(),
        "conflicting re-bind was accepted"
    );
}

#[test]
fn extend_adds_new_namespaces() {
    let mut map = Bindings::standard();
    let other = Bindings::from_str(r#"{ "wasi": { "memory": "wasi_memory" } }"#)
        .expect("valid bindings");
    map.extend(&other).expect("disjoint bindings extend cleanly");

    assert!(map.translate("ffi", "memory").is_ok());
    assert!(map.translate("wasi", "memory").unwrap() == "wasi_memory");
}

#[test]
fn nested_values_must_be_strings() {
    let top: serde_json::Value = serde_json::json!({ "ffi": { "memory": 7 } });
    assert!(Bindings::from_json(&top).is_err());

    let top: serde_json::Value = serde_json::json!({ "ffi": "memory" });
    assert!(Bindings::from_json(&top).is_err());

    let top: serde_json::Value = serde_json::json!(["ffi"]);
    assert!(Bindings::from_json(&top).is_err());
}
