//! Execution outcomes returned by the VM runner

use crate::types::{Balance, StorageUsage};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// What a contract method returned.
///
/// On the wire, `None` is the bare JSON string `"None"`, while the tagged
/// variants are single-key objects. Deserialization maps *any* bare string to
/// `None`: a plain-string return carries no payload and stands for the empty
/// successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnData {
    /// A direct value, as a string payload
    Value(String),
    /// The real answer is whatever the receipt at this local index returns
    ReceiptIndex(u64),
    /// No return value
    None,
}

impl ReturnData {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            ReturnData::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl Serialize for ReturnData {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ReturnData::Value(value) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Value", value)?;
                map.end()
            }
            ReturnData::ReceiptIndex(index) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("ReceiptIndex", index)?;
                map.end()
            }
            ReturnData::None => serializer.serialize_str("None"),
        }
    }
}

impl<'de> Deserialize<'de> for ReturnData {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        enum Tagged {
            Value(String),
            ReceiptIndex(u64),
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire {
            Text(String),
            Tagged(Tagged),
        }

        match Wire::deserialize(deserializer)? {
            // Any bare string is the empty return value
            Wire::Text(_) => Ok(ReturnData::None),
            Wire::Tagged(Tagged::Value(value)) => Ok(ReturnData::Value(value)),
            Wire::Tagged(Tagged::ReceiptIndex(index)) => Ok(ReturnData::ReceiptIndex(index)),
        }
    }
}

/// Result of one contract execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outcome {
    /// Log lines emitted during execution, in order
    #[serde(default)]
    pub logs: Vec<String>,
    /// The executing account's balance after the call
    #[serde(with = "crate::serialize::u128_dec_format")]
    pub balance: Balance,
    /// The executing account's storage usage after the call
    pub storage_usage: StorageUsage,
    /// What the method returned
    pub return_data: ReturnData,
    /// Contract-level error, if the execution failed
    #[serde(default)]
    pub err: Option<serde_json::Value>,
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        self.err.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_data_round_trip() {
        let value = ReturnData::Value(r#"{"x":7}"#.to_string());
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"Value":"{\"x\":7}"}"#);
        assert_eq!(serde_json::from_str::<ReturnData>(&json).unwrap(), value);

        let forward = ReturnData::ReceiptIndex(2);
        let json = serde_json::to_string(&forward).unwrap();
        assert_eq!(json, r#"{"ReceiptIndex":2}"#);
        assert_eq!(serde_json::from_str::<ReturnData>(&json).unwrap(), forward);

        let json = serde_json::to_string(&ReturnData::None).unwrap();
        assert_eq!(json, r#""None""#);
        assert_eq!(
            serde_json::from_str::<ReturnData>(&json).unwrap(),
            ReturnData::None
        );
    }

    #[test]
    fn test_any_bare_string_is_none() {
        assert_eq!(
            serde_json::from_str::<ReturnData>(r#""logging only""#).unwrap(),
            ReturnData::None
        );
    }

    #[test]
    fn test_outcome_from_runner_json() {
        let outcome: Outcome = serde_json::from_str(
            r#"{
                "logs": ["hello"],
                "balance": "999999999999",
                "storage_usage": 72,
                "return_data": {"Value": "6"}
            }"#,
        )
        .unwrap();

        assert_eq!(outcome.logs, vec!["hello".to_string()]);
        assert_eq!(outcome.balance, 999_999_999_999);
        assert_eq!(outcome.storage_usage, 72);
        assert_eq!(outcome.return_data.as_value(), Some("6"));
        assert!(!outcome.is_failure());
    }
}
