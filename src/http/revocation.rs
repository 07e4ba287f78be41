//! Detection of the server's "credential revoked" marker in 401 bodies.

use serde::{Deserialize, Serialize};

/// A `(field, value)` pair identifying a revoked (not merely expired) credential.
///
/// Matches when the JSON body has `field == value` at the top level or under
/// an `error` object, or when a plain-text body equals `value`.
///
/// # Example
/// ```
/// use salon_client::http::RevocationMarker;
///
/// let marker = RevocationMarker::default();
/// assert!(marker.matches(r#"{"code":"TOKEN_REVOKED"}"#));
/// assert!(!marker.matches(r#"{"code":"TOKEN_EXPIRED"}"#));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationMarker {
    pub field: String,
    pub value: String,
}

impl Default for RevocationMarker {
    fn default() -> Self {
        Self {
            field: "code".to_string(),
            value: "TOKEN_REVOKED".to_string(),
        }
    }
}

impl RevocationMarker {
    pub fn new(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matches(&self, body: &str) -> bool {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            return false;
        }
        match serde_json::from_str::<serde_json::Value>(trimmed) {
            Ok(json) => {
                self.field_matches(&json)
                    || json
                        .get("error")
                        .is_some_and(|nested| self.field_matches(nested))
            }
            Err(_) => trimmed == self.value,
        }
    }

    fn field_matches(&self, value: &serde_json::Value) -> bool {
        value
            .get(&self.field)
            .and_then(|v| v.as_str())
            .is_some_and(|v| v == self.value)
    }
}
