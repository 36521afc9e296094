//! Manipulate the JSON values found in GraphQL responses.

use serde_json_bytes::ByteString;
use serde_json_bytes::Map;
pub use serde_json_bytes::Value;

/// A JSON object as returned in GraphQL response data.
pub type Object = Map<ByteString, Value>;

/// Extension trait for [`Value`].
pub(crate) trait ValueExt {
    /// The JSON kind of this value, for error messages.
    fn json_kind(&self) -> &'static str;
}

impl ValueExt for Value {
    fn json_kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "a boolean",
            Value::Number(_) => "a number",
            Value::String(_) => "a string",
            Value::Array(_) => "an array",
            Value::Object(_) => "an object",
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json_bytes::json;

    use super::*;

    #[test]
    fn json_kinds_are_described_in_words() {
        assert_eq!(json!(null).json_kind(), "null");
        assert_eq!(json!(true).json_kind(), "a boolean");
        assert_eq!(json!(3).json_kind(), "a number");
        assert_eq!(json!("hi").json_kind(), "a string");
        assert_eq!(json!([1, 2]).json_kind(), "an array");
        assert_eq!(json!({ "a": 1 }).json_kind(), "an object");
    }
}
