//! Decoding of raw telemetry message bodies.
//!
//! A body must be UTF-8 JSON whose top level is an object. Keys naming a
//! recognized [`Parameter`] are extracted as numbers (`null` counts as not
//! reported); every other key is dropped. The raw text is kept alongside the
//! extracted values so it can be stored for audit.

use serde_json::Value;

use crate::parameters::{Parameter, SensorValues};

/// A successfully decoded message body.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    /// The body exactly as received.
    pub raw: String,
    /// Values of the recognized parameters.
    pub values: SensorValues,
}

/// Reasons a message body is rejected.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("parameter '{0}' must be a number or null")]
    NonNumeric(Parameter),
}

/// Decode a message body into a [`DecodedPayload`].
pub fn decode(body: &[u8]) -> Result<DecodedPayload, DecodeError> {
    let raw = std::str::from_utf8(body)?;
    let json: Value = serde_json::from_str(raw)?;

    let Value::Object(object) = json else {
        return Err(DecodeError::NotAnObject(json_kind(&json)));
    };

    let mut values = SensorValues::default();
    for param in Parameter::ALL {
        match object.get(param.as_str()) {
            None | Some(Value::Null) => {}
            Some(Value::Number(n)) => values.set(param, n.as_f64()),
            Some(_) => return Err(DecodeError::NonNumeric(param)),
        }
    }

    Ok(DecodedPayload {
        raw: raw.to_string(),
        values,
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_recognized_numbers() {
        let body = br#"{"temperature": 95.2, "voltage": 270, "current": 5}"#;
        let decoded = decode(body).unwrap();

        assert_eq!(decoded.values.temperature, Some(95.2));
        assert_eq!(decoded.values.voltage, Some(270.0));
        assert_eq!(decoded.values.current, Some(5.0));
        assert_eq!(decoded.values.humidity, None);
        assert_eq!(decoded.raw, std::str::from_utf8(body).unwrap());
    }

    #[test]
    fn drops_unrecognized_keys() {
        let decoded = decode(br#"{"power": 1200, "device": "meter-7", "humidity": 40}"#).unwrap();
        assert_eq!(decoded.values.reported_count(), 1);
        assert_eq!(decoded.values.humidity, Some(40.0));
    }

    #[test]
    fn empty_object_decodes_with_no_values() {
        let decoded = decode(b"{}").unwrap();
        assert_eq!(decoded.values, SensorValues::default());
        assert_eq!(decoded.raw, "{}");
    }

    #[test]
    fn null_is_treated_as_absent() {
        let decoded = decode(br#"{"pressure": null, "current": 2.5}"#).unwrap();
        assert_eq!(decoded.values.pressure, None);
        assert_eq!(decoded.values.current, Some(2.5));
    }

    #[test]
    fn rejects_non_json() {
        assert!(matches!(decode(b"not-json"), Err(DecodeError::InvalidJson(_))));
    }

    #[test]
    fn rejects_invalid_utf8() {
        assert!(matches!(
            decode(&[0x7b, 0xff, 0xfe, 0x7d]),
            Err(DecodeError::InvalidUtf8(_))
        ));
    }

    #[test]
    fn rejects_non_object_json() {
        assert!(matches!(decode(b"[1, 2, 3]"), Err(DecodeError::NotAnObject("an array"))));
        assert!(matches!(decode(b"42"), Err(DecodeError::NotAnObject("a number"))));
    }

    #[test]
    fn rejects_non_numeric_recognized_value() {
        let err = decode(br#"{"temperature": "hot"}"#).unwrap_err();
        assert!(matches!(err, DecodeError::NonNumeric(Parameter::Temperature)));
        assert_eq!(err.to_string(), "parameter 'temperature' must be a number or null");
    }
}
