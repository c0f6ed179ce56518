//! Request and response bodies for the redeem and transfer endpoints

use serde::{Deserialize, Serialize};

/// Body of `POST /api/rewards/redeem`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub points: i64,
    pub description: String,
}

/// Body of `POST /api/rewards/transfer`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest {
    pub points: i64,
    pub recipient_email: String,
    pub description: String,
}

/// Success payload of a mutation.
///
/// The server does not commit to a shape here, so every field is optional
/// and unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub new_balance: Option<i64>,
}

/// Error body returned on non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// First non-empty message field
    pub fn into_message(self) -> Option<String> {
        self.error
            .into_iter()
            .chain(self.message)
            .find(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_body_uses_camel_case() {
        let body = TransferRequest {
            points: 300,
            recipient_email: "guest@example.com".to_string(),
            description: "Gift".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["recipientEmail"], "guest@example.com");
        assert_eq!(json["points"], 300);
    }

    #[test]
    fn test_mutation_response_is_lenient() {
        let resp: MutationResponse =
            serde_json::from_str(r#"{"transactionId": "t-1", "newBalance": 700}"#).unwrap();
        assert_eq!(resp.new_balance, Some(700));
        assert!(resp.success.is_none());

        let empty: MutationResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, MutationResponse::default());
    }

    #[test]
    fn test_error_body_message_preference() {
        let body: ApiErrorBody =
            serde_json::from_str(r#"{"error": "", "message": "Not enough points"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Not enough points"));

        let body: ApiErrorBody = serde_json::from_str("{}").unwrap();
        assert!(body.into_message().is_none());
    }
}
