//! Structured rejection bodies written by the admission filter.

use serde::Serialize;
use serde_json::Value;

/// HTTP status code for a rejected request.
pub const STATUS_TOO_MANY_REQUESTS: u16 = 429;

/// Fixed message returned with every rejection.
pub const MESSAGE_TOO_MANY_REQUESTS: &str = "Too many requests. Please try again later.";

/// Body of a rejection response.
///
/// Serializes to `{"status": 429, "message": "...", "data": null}`, the
/// same envelope the surrounding service uses for its error responses, with
/// `data` always null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rejection {
    /// HTTP status code
    pub status: u16,
    /// Human-readable explanation
    pub message: String,
    /// Always null; present so the envelope shape is uniform
    pub data: Value,
}

impl Rejection {
    /// A too-many-requests rejection with the fixed message.
    pub fn too_many_requests() -> Self {
        Self {
            status: STATUS_TOO_MANY_REQUESTS,
            message: MESSAGE_TOO_MANY_REQUESTS.to_string(),
            data: Value::Null,
        }
    }

    /// The body as a JSON value.
    pub fn to_value(&self) -> Value {
        serde_json::json!({
            "status": self.status,
            "message": self.message,
            "data": Value::Null,
        })
    }

    /// The body in wire form.
    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_body_shape() {
        let rejection = Rejection::too_many_requests();

        assert_eq!(rejection.status, 429);
        assert!(!rejection.message.is_empty());
        assert_eq!(rejection.data, Value::Null);
    }

    #[test]
    fn test_rejection_wire_form() {
        let body: Value = serde_json::from_str(&Rejection::too_many_requests().to_json()).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "status": 429,
                "message": "Too many requests. Please try again later.",
                "data": null,
            })
        );
    }

    #[test]
    fn test_serialize_matches_to_value() {
        let rejection = Rejection::too_many_requests();
        let direct = serde_json::to_value(&rejection).unwrap();
        assert_eq!(direct, rejection.to_value());
    }
}
