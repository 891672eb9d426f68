use serde::Deserialize;
use serde_json::Value;

use crate::error::{PushError, Result};

/// Ordered device tokens a send is addressed to.
///
/// Built from a token list, a comma-separated string, or a JSON value holding
/// either. Comma-separated segments are trimmed and empty ones dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Value")]
pub struct Recipients(Vec<String>);

impl Recipients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a comma-separated token string
    pub fn parse(tokens: &str) -> Self {
        Self(
            tokens
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for Recipients {
    fn from(tokens: Vec<String>) -> Self {
        Self(tokens)
    }
}

impl From<&[String]> for Recipients {
    fn from(tokens: &[String]) -> Self {
        Self(tokens.to_vec())
    }
}

impl From<&[&str]> for Recipients {
    fn from(tokens: &[&str]) -> Self {
        Self(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Recipients {
    fn from(tokens: [&str; N]) -> Self {
        Self(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl From<&str> for Recipients {
    fn from(tokens: &str) -> Self {
        Self::parse(tokens)
    }
}

impl From<String> for Recipients {
    fn from(tokens: String) -> Self {
        Self::parse(&tokens)
    }
}

impl TryFrom<Value> for Recipients {
    type Error = PushError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::String(tokens) => Ok(Self::parse(&tokens)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(token) => Ok(token),
                    other => Err(PushError::Validation(format!(
                        "Device tokens must be strings, got {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Self),
            other => Err(PushError::Validation(format!(
                "Tokens must be an array or a comma-separated string, got {}",
                other
            ))),
        }
    }
}

impl IntoIterator for Recipients {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_comma_string_keeps_order() {
        let recipients = Recipients::from("tokA,tokB");
        assert_eq!(recipients.as_slice(), ["tokA", "tokB"]);
        assert_eq!(recipients.into_vec(), vec!["tokA".to_string(), "tokB".to_string()]);
    }

    #[test]
    fn test_comma_string_trims_and_drops_empty() {
        let recipients = Recipients::from(" tokA , ,tokB,");
        assert_eq!(recipients.as_slice(), ["tokA", "tokB"]);
        assert!(Recipients::from("").is_empty());
    }

    #[test]
    fn test_from_json_value() {
        let recipients = Recipients::try_from(json!(["a", "b"])).unwrap();
        assert_eq!(recipients.len(), 2);

        let recipients = Recipients::try_from(json!("a,b,c")).unwrap();
        assert_eq!(recipients.len(), 3);
    }

    #[test]
    fn test_invalid_shapes_rejected() {
        assert!(matches!(
            Recipients::try_from(json!(42)),
            Err(PushError::Validation(_))
        ));
        assert!(matches!(
            Recipients::try_from(Value::Null),
            Err(PushError::Validation(_))
        ));
        assert!(matches!(
            Recipients::try_from(json!(["a", 1])),
            Err(PushError::Validation(_))
        ));
    }

    #[test]
    fn test_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            tokens: Recipients,
        }

        let parsed: Wrapper = serde_json::from_str(r#"{"tokens": "x,y"}"#).unwrap();
        assert_eq!(parsed.tokens.as_slice(), ["x", "y"]);

        assert!(serde_json::from_str::<Wrapper>(r#"{"tokens": 42}"#).is_err());
    }
}
