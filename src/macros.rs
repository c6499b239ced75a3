/// Builds a [`Value`](crate::Value) from a MAML-like literal.
///
/// ```rust
/// use serde_maml::maml;
///
/// let config = maml!({
///     "project": "demo",
///     "tags": ["minimal", "readable"],
///     "retries": 3
/// });
/// assert_eq!(config.get("project").and_then(|v| v.as_str()), Some("demo"));
/// ```
#[macro_export]
macro_rules! maml {
    // Handle null
    (null) => {
        $crate::Value::Null
    };

    // Handle true
    (true) => {
        $crate::Value::Bool(true)
    };

    // Handle false
    (false) => {
        $crate::Value::Bool(false)
    };

    // Handle empty array
    ([]) => {
        $crate::Value::Array(vec![])
    };

    // Handle non-empty array
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Array(vec![$($crate::maml!($elem)),*])
    };

    // Handle empty object
    ({}) => {
        $crate::Value::Object($crate::MamlMap::new())
    };

    // Handle non-empty object
    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut object = $crate::MamlMap::new();
        $(
            object.insert($key.to_string(), $crate::maml!($value));
        )*
        $crate::Value::Object(object)
    }};

    // Fallback for any other expression
    ($other:expr) => {{
        $crate::to_value(&$other).unwrap_or($crate::Value::Null)
    }};
}
