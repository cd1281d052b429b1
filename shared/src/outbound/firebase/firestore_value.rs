//! Conversion between plain JSON and Firestore's typed value encoding.

use serde_json::{Map, Number, Value, json};

use crate::domain::ports::DocumentStoreError;

/// Encode a JSON object as a Firestore `fields` map.
pub(super) fn encode_fields(document: &Value) -> Result<Map<String, Value>, DocumentStoreError> {
    let Value::Object(object) = document else {
        return Err(DocumentStoreError::query("documents must be JSON objects"));
    };
    Ok(object
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect())
}

/// Encode one JSON value as a Firestore `Value`.
pub(super) fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(flag) => json!({ "booleanValue": flag }),
        Value::Number(number) => match number.as_i64() {
            Some(integer) => json!({ "integerValue": integer.to_string() }),
            None => json!({ "doubleValue": number.as_f64().unwrap_or_default() }),
        },
        Value::String(text) => json!({ "stringValue": text }),
        Value::Array(items) => {
            json!({ "arrayValue": { "values": items.iter().map(encode_value).collect::<Vec<_>>() } })
        }
        Value::Object(_) => {
            let fields = encode_fields(value).unwrap_or_default();
            json!({ "mapValue": { "fields": fields } })
        }
    }
}

/// Decode a Firestore `fields` map into a plain JSON object.
pub(super) fn decode_fields(fields: Option<&Value>) -> Result<Value, DocumentStoreError> {
    let Some(fields) = fields else {
        return Ok(Value::Object(Map::new()));
    };
    let Value::Object(object) = fields else {
        return Err(DocumentStoreError::decode("document fields must be an object"));
    };
    object
        .iter()
        .map(|(key, value)| decode_value(value).map(|decoded| (key.clone(), decoded)))
        .collect::<Result<Map<_, _>, _>>()
        .map(Value::Object)
}

/// Decode one Firestore `Value` into plain JSON.
pub(super) fn decode_value(value: &Value) -> Result<Value, DocumentStoreError> {
    let Some((kind, inner)) = value.as_object().and_then(|object| object.iter().next()) else {
        return Err(DocumentStoreError::decode(format!(
            "unrecognised firestore value: {value}"
        )));
    };

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or_default())),
        "integerValue" => decode_integer(inner),
        "doubleValue" => Ok(inner
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => {
            Ok(Value::String(inner.as_str().unwrap_or_default().to_owned()))
        }
        "geoPointValue" => Ok(json!({
            "latitude": inner.get("latitude").and_then(Value::as_f64).unwrap_or_default(),
            "longitude": inner.get("longitude").and_then(Value::as_f64).unwrap_or_default(),
        })),
        "arrayValue" => inner
            .get("values")
            .and_then(Value::as_array)
            .map_or(&[][..], Vec::as_slice)
            .iter()
            .map(decode_value)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        "mapValue" => decode_fields(inner.get("fields")),
        other => Err(DocumentStoreError::decode(format!(
            "unsupported firestore value type '{other}'"
        ))),
    }
}

fn decode_integer(inner: &Value) -> Result<Value, DocumentStoreError> {
    let parsed = match inner {
        Value::String(text) => text.parse::<i64>().ok(),
        Value::Number(number) => number.as_i64(),
        _ => None,
    };
    parsed
        .map(|integer| Value::Number(integer.into()))
        .ok_or_else(|| DocumentStoreError::decode(format!("invalid integerValue: {inner}")))
}
