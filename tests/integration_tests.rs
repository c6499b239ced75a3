use serde::{Deserialize, Serialize};
use serde_maml::{
    format_document, from_str, from_str_with_options, parse_str_with_comments, to_string,
    to_string_with_options, to_value, DecodeOptions, EncodeOptions, Value,
};

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct User {
    id: u32,
    name: String,
    active: bool,
    tags: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Spec {
    version: i64,
    author: String,
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Project {
    project: String,
    tags: Vec<String>,
    spec: Spec,
}

#[test]
fn string_scalar_roundtrip() {
    let value: String = from_str("\"hello world\"").unwrap();
    assert_eq!(value, "hello world");

    let out = to_string_with_options(&value, EncodeOptions::compact()).unwrap();
    assert_eq!(out, "\"hello world\"");
}

#[test]
fn nested_record_decodes_and_reencodes() {
    let input = r#"
    {
      project: "MAML"
      tags: [ "minimal", "readable" ]
      spec: { version: 1, author: "Anton Medvedev" }
    }
    "#;

    let project: Project = from_str(input).unwrap();
    assert_eq!(project.project, "MAML");
    assert_eq!(project.tags, vec!["minimal", "readable"]);
    assert_eq!(project.spec.version, 1);
    assert_eq!(project.spec.author, "Anton Medvedev");

    let out =
        to_string_with_options(&project, EncodeOptions::new().with_field_commas()).unwrap();
    let expected = "{\n  project: \"MAML\",\n  tags: [\n    \"minimal\",\n    \"readable\"\n  ],\n  spec: {\n    version: 1,\n    author: \"Anton Medvedev\"\n  }\n}";
    assert_eq!(out, expected);
}

#[derive(Serialize, Debug, Default, PartialEq)]
struct Address {
    #[serde(rename = "City")]
    city: String,
    #[serde(rename = "PostalCode")]
    postal_code: String,
}

// serde's flatten machinery matches embedded field names exactly, so the
// embedded record rebinds its keys through the MAML field resolver to keep
// the case-insensitive fallback.
impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize, Default)]
        #[serde(default)]
        struct Def {
            #[serde(rename = "City")]
            city: String,
            #[serde(rename = "PostalCode")]
            postal_code: String,
        }
        let def: Def = serde_maml::de::embedded(deserializer)?;
        Ok(Address {
            city: def.city,
            postal_code: def.postal_code,
        })
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Contact {
    #[serde(rename = "Name")]
    name: String,
    #[serde(flatten)]
    address: Address,
}

#[test]
fn embedded_record_is_flattened() {
    // The embedded City is matched case-insensitively from the bare `city`
    // key; PostalCode matches exactly.
    let input = r#"
    {
      Name: "Jane Doe"
      city: "London"
      PostalCode: "SW1A 0AA"
    }
    "#;

    let contact: Contact = from_str(input).unwrap();
    assert_eq!(contact.name, "Jane Doe");
    assert_eq!(contact.address.city, "London");
    assert_eq!(contact.address.postal_code, "SW1A 0AA");

    // Flattened fields re-emit at the outer level under their canonical
    // names. A struct containing a flattened member serializes through the
    // map path, so its keys come out sorted.
    let out = to_string_with_options(&contact, EncodeOptions::compact()).unwrap();
    assert_eq!(
        out,
        r#"{City:"London",Name:"Jane Doe",PostalCode:"SW1A 0AA"}"#
    );
}

#[test]
fn embedded_record_accepts_exact_keys_too() {
    let input = r#"
    {
      Name: "John Doe"
      City: "New York"
      PostalCode: "10001"
    }
    "#;

    let contact: Contact = from_str(input).unwrap();
    assert_eq!(contact.address.city, "New York");
    assert_eq!(contact.address.postal_code, "10001");
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Shadowing {
    #[serde(rename = "City")]
    city: String,
    #[serde(flatten)]
    address: Address,
}

#[test]
fn outer_field_shadows_embedded_field() {
    let input = r#"
    {
      City: "Outer City"
      PostalCode: "99999"
    }
    "#;

    let value: Shadowing = from_str(input).unwrap();
    assert_eq!(value.city, "Outer City");
    // The embedded City is shadowed by the outer field and stays at its
    // zero value.
    assert_eq!(value.address.city, "");
    assert_eq!(value.address.postal_code, "99999");
}

#[derive(Deserialize, Debug, PartialEq)]
struct CasedFields {
    name: String,
    postal_code: String,
}

#[test]
fn field_matching_falls_back_to_case_insensitive() {
    let value: CasedFields = from_str("{ Name: \"Jane\", POSTAL_CODE: \"SW1A\" }").unwrap();
    assert_eq!(value.name, "Jane");
    assert_eq!(value.postal_code, "SW1A");
}

#[test]
fn unknown_fields_are_ignored_by_default() {
    let value: CasedFields =
        from_str("{ name: \"x\", postal_code: \"y\", extra: [1, 2] }").unwrap();
    assert_eq!(value.name, "x");
}

#[test]
fn strict_mode_rejects_unknown_fields() {
    let opts = DecodeOptions::new().deny_unknown_fields();
    let err = from_str_with_options::<CasedFields>(
        "{ name: \"x\", postal_code: \"y\", extra: 1 }",
        opts,
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown field \"extra\""));

    // Case-insensitive matches are not unknown.
    let opts = DecodeOptions::new().deny_unknown_fields();
    let value: CasedFields =
        from_str_with_options("{ NAME: \"x\", postal_code: \"y\" }", opts).unwrap();
    assert_eq!(value.name, "x");
}

#[test]
fn integer_overflow_names_value_and_target() {
    let err = from_str::<i8>("128").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("128"), "message was: {msg}");
    assert!(msg.contains("i8"), "message was: {msg}");

    assert_eq!(from_str::<i8>("127").unwrap(), 127);
    assert_eq!(from_str::<i8>("-128").unwrap(), -128);
}

#[test]
fn float_overflow_is_reported() {
    let err = from_str::<f32>("3.5e38").unwrap_err();
    assert!(err.to_string().contains("overflows f32"));

    assert!(from_str::<f32>("3.5").unwrap() - 3.5 < f32::EPSILON);
}

#[test]
fn fixed_length_mismatch_names_both_lengths() {
    let err = from_str::<[i64; 2]>("[1, 2, 3]").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains('2'), "message was: {msg}");
    assert!(msg.contains('3'), "message was: {msg}");

    assert_eq!(from_str::<[i64; 3]>("[1, 2, 3]").unwrap(), [1, 2, 3]);
}

#[test]
fn null_binds_to_absent_or_zero() {
    assert_eq!(from_str::<Option<i32>>("null").unwrap(), None);
    assert_eq!(from_str::<Option<i32>>("5").unwrap(), Some(5));
    assert_eq!(from_str::<i32>("null").unwrap(), 0);
    assert_eq!(from_str::<bool>("null").unwrap(), false);
    assert_eq!(from_str::<String>("null").unwrap(), "");
    assert_eq!(from_str::<Vec<i32>>("null").unwrap(), Vec::<i32>::new());
}

#[test]
fn empty_containers_decode_non_null() {
    let v: Vec<i32> = from_str("[]").unwrap();
    assert!(v.is_empty());

    let m: std::collections::HashMap<String, i32> = from_str("{}").unwrap();
    assert!(m.is_empty());
}

#[test]
fn bare_identifier_binds_to_string() {
    let value: String = from_str("hello").unwrap();
    assert_eq!(value, "hello");

    let value: Value = from_str("{ mode: fast }").unwrap();
    assert_eq!(value.get("mode").and_then(|v| v.as_str()), Some("fast"));
}

#[test]
fn type_mismatches_carry_positions() {
    let err = from_str::<i64>("{\n  a: 1\n}").unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("cannot unmarshal object into i64"), "message was: {msg}");
    assert!(msg.contains("line 1"), "message was: {msg}");

    let err = from_str::<f64>("7").unwrap_err();
    assert!(err
        .to_string()
        .contains("cannot unmarshal integer into f64"));
}

#[test]
fn recursion_limit_is_enforced() {
    let deep = format!("{}{}", "[".repeat(20), "]".repeat(20));
    let opts = DecodeOptions::new().with_max_depth(10);
    let err = from_str_with_options::<Value>(&deep, opts).unwrap_err();
    assert!(err.to_string().contains("reached max recursion depth"));

    let opts = DecodeOptions::new().with_max_depth(100);
    assert!(from_str_with_options::<Value>(&deep, opts).is_ok());
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct Sparse {
    required: i32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    optional: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    list: Vec<i32>,
}

#[test]
fn empty_fields_can_be_omitted() {
    let sparse = Sparse {
        required: 1,
        optional: None,
        list: vec![],
    };
    let out = to_string_with_options(&sparse, EncodeOptions::compact()).unwrap();
    assert_eq!(out, "{required:1}");

    let back: Sparse = from_str(&out).unwrap();
    assert_eq!(back, sparse);

    let full = Sparse {
        required: 2,
        optional: Some("x".to_string()),
        list: vec![3],
    };
    let out = to_string_with_options(&full, EncodeOptions::compact()).unwrap();
    assert_eq!(out, "{required:2,optional:\"x\",list:[3]}");
}

#[derive(Serialize, Deserialize, Debug, PartialEq)]
enum Mode {
    Off,
    Level(u8),
    Custom { name: String, gain: f64 },
}

#[test]
fn enum_representations() {
    assert_eq!(
        to_string_with_options(&Mode::Off, EncodeOptions::compact()).unwrap(),
        "\"Off\""
    );
    assert_eq!(from_str::<Mode>("\"Off\"").unwrap(), Mode::Off);
    // A bare word resolves to the unit variant too.
    assert_eq!(from_str::<Mode>("Off").unwrap(), Mode::Off);

    let level = Mode::Level(3);
    let out = to_string_with_options(&level, EncodeOptions::compact()).unwrap();
    assert_eq!(out, "{Level:3}");
    assert_eq!(from_str::<Mode>(&out).unwrap(), level);

    let custom = Mode::Custom {
        name: "voice".to_string(),
        gain: 1.5,
    };
    let out = to_string_with_options(&custom, EncodeOptions::compact()).unwrap();
    assert_eq!(out, "{Custom:{name:\"voice\",gain:1.5}}");
    assert_eq!(from_str::<Mode>(&out).unwrap(), custom);
}

/// A type with hand-written serde impls, standing in for a custom
/// marshal/unmarshal hook pair.
#[derive(Debug, PartialEq)]
struct Celsius(i32);

impl Serialize for Celsius {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{}C", self.0))
    }
}

impl<'de> Deserialize<'de> for Celsius {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s
            .strip_suffix('C')
            .ok_or_else(|| serde::de::Error::custom("missing C suffix"))?;
        digits
            .parse()
            .map(Celsius)
            .map_err(serde::de::Error::custom)
    }
}

#[test]
fn custom_impls_control_their_representation() {
    let out = to_string_with_options(&Celsius(25), EncodeOptions::compact()).unwrap();
    assert_eq!(out, "\"25C\"");
    assert_eq!(from_str::<Celsius>("\"25C\"").unwrap(), Celsius(25));

    let err = from_str::<Celsius>("\"hot\"").unwrap_err();
    assert!(err.to_string().contains("missing C suffix"));
}

#[test]
fn comment_roundtrip() {
    let source = "# head\n{\n  key: \"value\" # line\n  # foot\n}";
    let doc = parse_str_with_comments(source).unwrap();

    let mut out = Vec::new();
    format_document(&doc, &EncodeOptions::new(), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), source);
}

#[test]
fn blank_line_grouping_survives_reformat() {
    let source = "{\n  a: 1\n\n\n  b: 2\n}";
    let doc = parse_str_with_comments(source).unwrap();

    let mut out = Vec::new();
    format_document(&doc, &EncodeOptions::new(), &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), source);
}

#[test]
fn document_level_roundtrip_is_structural() {
    let input = r#"
    {
      name: "svc"
      replicas: 3
      ratios: [0.25, 0.75]
      env: { DEBUG: "1", PATH: "/bin" }
      features: [fast, "slow mode", null, true]
    }
    "#;

    let first: Value = from_str(input).unwrap();
    let encoded = to_string(&first).unwrap();
    let second: Value = from_str(&encoded).unwrap();
    assert_eq!(first, second);
}

#[test]
fn decoded_user_matches_and_roundtrips() {
    let input = r#"
    {
      id: 123
      name: "Alice"
      active: true
      tags: ["admin", "developer"]
    }
    "#;
    let user: User = from_str(input).unwrap();
    assert_eq!(
        user,
        User {
            id: 123,
            name: "Alice".to_string(),
            active: true,
            tags: vec!["admin".to_string(), "developer".to_string()],
        }
    );

    let out = to_string(&user).unwrap();
    let back: User = from_str(&out).unwrap();
    assert_eq!(back, user);
}

#[test]
fn to_value_sorts_map_keys() {
    let mut map = std::collections::HashMap::new();
    map.insert("zebra".to_string(), 1);
    map.insert("apple".to_string(), 2);

    let value = to_value(&map).unwrap();
    let keys: Vec<_> = value.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, vec!["apple", "zebra"]);
}

#[test]
fn crlf_documents_parse() {
    let input = "{\r\n  a: 1\r\n  b: 2\r\n}";
    let value: Value = from_str(input).unwrap();
    assert_eq!(value.get("a").and_then(|v| v.as_i64()), Some(1));
    assert_eq!(value.get("b").and_then(|v| v.as_i64()), Some(2));
}
