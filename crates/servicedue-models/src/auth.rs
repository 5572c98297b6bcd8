//! Request and response bodies of the `/api/auth/*` endpoints.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/auth/signin`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /api/auth/signup`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub dealership_name: String,
}

/// Body of `POST /api/auth/reset-password`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ResetPasswordRequest {
    pub email: String,
}

/// The signed-in dealership user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    #[serde(default, deserialize_with = "id_as_string")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub dealership_name: String,
}

impl User {
    /// `First Last`, or the email when no name is on record.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}

/// Response of sign-in and sign-up.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Error body returned by the backend on failed requests.
///
/// `detail` is usually a string but validation failures may carry a list
/// of structured entries, so it is kept as raw JSON.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ApiErrorBody {
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    /// Human-readable form of `detail`.
    pub fn message(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            serde_json::Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.get("msg")
                        .and_then(|m| m.as_str())
                        .map_or_else(|| item.to_string(), ToString::to_string)
                })
                .collect::<Vec<_>>()
                .join("; "),
            other => other.to_string(),
        }
    }
}

fn id_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_response_decodes_numeric_user_id() {
        let json = r#"{
            "token": "tok-123",
            "user": {
                "id": 9,
                "email": "owner@dealer.in",
                "first_name": "Sunil",
                "last_name": "Rao",
                "dealership_name": "Rao Motors"
            }
        }"#;
        let resp: AuthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.token, "tok-123");
        assert_eq!(resp.user.id, "9");
        assert_eq!(resp.user.display_name(), "Sunil Rao");
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user = User {
            email: "a@b.co".into(),
            ..User::default()
        };
        assert_eq!(user.display_name(), "a@b.co");
    }

    #[test]
    fn error_detail_string() {
        let body: ApiErrorBody = serde_json::from_str(r#"{"detail":"Invalid credentials"}"#).unwrap();
        assert_eq!(body.message(), "Invalid credentials");
    }

    #[test]
    fn error_detail_list() {
        let body: ApiErrorBody = serde_json::from_str(
            r#"{"detail":[{"loc":["body","email"],"msg":"value is not a valid email address"},{"msg":"field required"}]}"#,
        )
        .unwrap();
        assert_eq!(
            body.message(),
            "value is not a valid email address; field required"
        );
    }

    #[test]
    fn signup_request_uses_snake_case() {
        let req = SignUpRequest {
            email: "a@b.co".into(),
            password: "secret123".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            dealership_name: "AB Motors".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["dealership_name"], "AB Motors");
        assert_eq!(json["first_name"], "A");
    }
}
