use serde_maml::{from_str, maml, to_string_with_options, EncodeOptions, Number, Value};

#[test]
fn macro_values_match_parsed_documents() {
    let parsed: Value = from_str(
        r#"
        {
          name: "demo"
          limits: { cpu: 2, memory: 512 }
          tags: ["a", "b"]
          debug: null
        }
        "#,
    )
    .unwrap();

    let built = maml!({
        "name": "demo",
        "limits": { "cpu": 2, "memory": 512 },
        "tags": ["a", "b"],
        "debug": null
    });

    assert_eq!(parsed, built);
}

#[test]
fn macro_values_encode() {
    let value = maml!({
        "enabled": true,
        "ratio": 0.5,
        "steps": [1, 2, 3]
    });

    let out = to_string_with_options(&value, EncodeOptions::compact()).unwrap();
    assert_eq!(out, "{enabled:true,ratio:0.5,steps:[1,2,3]}");
}

#[test]
fn macro_nested_values() {
    let value = maml!([{ "a": 1 }, [true, null], "end"]);
    let arr = match value {
        Value::Array(arr) => arr,
        other => panic!("expected array, got {other:?}"),
    };
    assert_eq!(arr.len(), 3);
    assert_eq!(
        arr[0].get("a"),
        Some(&Value::Number(Number::Integer(1)))
    );
    assert_eq!(arr[2], Value::String("end".to_string()));
}
