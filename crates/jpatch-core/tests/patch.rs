use jpatch_core::{diff, diff_with_options, DiffOptions, ErrorKind, OpKind, Patch, Value};
use proptest::prop_assert_eq;

fn json(text: &str) -> Value {
    Value::from_json_str(text).unwrap()
}

#[test]
fn apply_from_wire_adds_member() {
    let doc = json(r#"{"foo":"bar"}"#);
    let patch = Patch::from_json_str(r#"[{"op":"add","path":"/baz","value":"qux"}]"#).unwrap();
    let patched = patch.apply(&doc).unwrap();
    assert_eq!(patched.pointer("/baz"), Some(&Value::from("qux")));
    assert_eq!(patched.pointer("/foo"), Some(&Value::from("bar")));
}

#[test]
fn failed_test_aborts_and_keeps_document() {
    let doc = json(r#"{"a":{"b":[1,2]}}"#);
    let patch = Patch::from_json_str(
        r#"[{"op":"remove","path":"/a/b/0"},{"op":"test","path":"/a/b","value":[1]}]"#,
    )
    .unwrap();
    let err = doc.apply_patch(&patch).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TestFailed);
    assert_eq!(err.operation_index(), Some(1));
    assert_eq!(doc, json(r#"{"a":{"b":[1,2]}}"#));
}

#[test]
fn guarded_patch_refuses_drifted_document() {
    let src = json(r#"{"a":[1,2,3]}"#);
    let dst = json(r#"{"a":[1,3]}"#);
    let options = DiffOptions::default().with_test_guards(true);
    let patch = diff_with_options(&src, &dst, &options);
    assert_eq!(patch.operations()[0].kind(), OpKind::Test);
    assert_eq!(patch.apply(&src).unwrap(), dst);

    let drifted = json(r#"{"a":[1,5,3]}"#);
    let err = patch.apply(&drifted).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TestFailed);
    assert!(diff(&src, &dst).apply(&drifted).is_ok());
}

#[test]
fn nested_documents_round_trip() {
    let src = json(r#"{"users":[{"id":1,"tags":["a"]},{"id":2,"tags":[]}],"meta":{"v":1}}"#);
    let dst = json(r#"{"users":[{"id":2,"tags":["b"]},{"id":3}],"meta":{"v":2,"w":null}}"#);
    let patch = diff(&src, &dst);
    assert_eq!(patch.apply(&src).unwrap(), dst);
    let reverse = diff(&dst, &src);
    assert_eq!(reverse.apply(&dst).unwrap(), src);
}

#[test]
fn diff_is_deterministic() {
    let src = json(r#"[1,2,1,2,{"k":[3,3]}]"#);
    let dst = json(r#"[2,1,2,1,{"k":[3]}]"#);
    assert_eq!(diff(&src, &dst), diff(&src, &dst));
    assert_eq!(diff(&src, &dst).to_json_string(), diff(&src, &dst).to_json_string());
}

fn arb_json_value() -> impl proptest::strategy::Strategy<Value = serde_json::Value> {
    use proptest::{collection::btree_map, collection::vec, prelude::*, string::string_regex};

    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        (-3i64..4).prop_map(serde_json::Value::from),
        proptest::num::f64::NORMAL.prop_filter_map("finite", |f| {
            serde_json::Number::from_f64(f).map(serde_json::Value::Number)
        }),
        string_regex("[a-c/~]{0,3}").unwrap().prop_map(serde_json::Value::String),
    ];

    leaf.prop_recursive(3, 24, 5, move |inner| {
        prop_oneof![
            vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            btree_map(string_regex("[a-c/~]{0,2}").unwrap(), inner, 0..4)
                .prop_map(|map| serde_json::Value::Object(map.into_iter().collect())),
        ]
    })
}

proptest::proptest! {
    #[test]
    fn diff_and_patch_roundtrip(a_json in arb_json_value(), b_json in arb_json_value()) {
        let a = Value::from_json_value(a_json).unwrap();
        let b = Value::from_json_value(b_json).unwrap();
        let patch = diff(&a, &b);
        prop_assert_eq!(patch.apply(&a).unwrap(), b.clone());

        let reverse = diff(&b, &a);
        prop_assert_eq!(reverse.apply(&b).unwrap(), a);
    }

    #[test]
    fn guarded_and_limited_patches_roundtrip(a_json in arb_json_value(), b_json in arb_json_value()) {
        let a = Value::from_json_value(a_json).unwrap();
        let b = Value::from_json_value(b_json).unwrap();
        let options = DiffOptions::default()
            .with_test_guards(true)
            .with_lcs_cell_limit(4)
            .unwrap();
        let patch = diff_with_options(&a, &b, &options);
        prop_assert_eq!(patch.apply(&a).unwrap(), b);
    }

    #[test]
    fn self_diff_is_empty(a_json in arb_json_value()) {
        let a = Value::from_json_value(a_json).unwrap();
        proptest::prop_assert!(diff(&a, &a).is_empty());
        proptest::prop_assert!(Patch::empty().apply(&a).unwrap() == a);
    }

    #[test]
    fn wire_form_preserves_patches(a_json in arb_json_value(), b_json in arb_json_value()) {
        let a = Value::from_json_value(a_json).unwrap();
        let b = Value::from_json_value(b_json).unwrap();
        let patch = diff(&a, &b);
        let parsed = Patch::from_json_str(&patch.to_json_string()).unwrap();
        prop_assert_eq!(parsed, patch);
    }
}
