//! Device registration for push notifications.
//!
//! Obtaining the platform push token is the caller's job (it requires OS
//! permission flows); this module only registers an already-obtained token
//! with the server. Registration failing is non-fatal — callers log and
//! carry on without push.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::http_client::{ApiClient, ApiError};

/// Registration endpoint.
pub const REGISTER_PATH: &str = "/devices/register";

/// Platform issuing the push token. Wire names are exactly
/// `"Android"`, `"iOS"`, `"Web"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    Android,
    #[serde(rename = "iOS")]
    Ios,
    Web,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Android => write!(f, "Android"),
            Self::Ios => write!(f, "iOS"),
            Self::Web => write!(f, "Web"),
        }
    }
}

/// Request body for `POST /devices/register`.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterDeviceRequest {
    pub token: String,
    pub platform: Platform,
}

/// Response from `POST /devices/register`.
///
/// `success` is required: a response that omits the flag fails to decode
/// instead of being silently treated as success.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterDeviceResponse {
    pub success: bool,
    pub message: Option<String>,
}

/// Register a device push token with the server.
pub async fn register_device(
    client: &ApiClient,
    token: &str,
    platform: Platform,
) -> Result<RegisterDeviceResponse, ApiError> {
    let request = RegisterDeviceRequest {
        token: token.to_string(),
        platform,
    };
    tracing::info!(%platform, "registering device for push notifications");

    let response: RegisterDeviceResponse = client.post(REGISTER_PATH, &request).await?;
    if !response.success {
        tracing::warn!(message = ?response.message, "server declined device registration");
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_wire_names() {
        assert_eq!(serde_json::to_string(&Platform::Android).unwrap(), r#""Android""#);
        assert_eq!(serde_json::to_string(&Platform::Ios).unwrap(), r#""iOS""#);
        assert_eq!(serde_json::to_string(&Platform::Web).unwrap(), r#""Web""#);
    }

    #[test]
    fn test_register_request_serialization() {
        let request = RegisterDeviceRequest {
            token: "abc".to_string(),
            platform: Platform::Android,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["token"], "abc");
        assert_eq!(json["platform"], "Android");
    }

    #[test]
    fn test_register_response_with_message() {
        let response: RegisterDeviceResponse =
            serde_json::from_str(r#"{"success":true,"message":"registered"}"#).unwrap();
        assert!(response.success);
        assert_eq!(response.message.as_deref(), Some("registered"));
    }

    #[test]
    fn test_register_response_without_message() {
        let response: RegisterDeviceResponse =
            serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!response.success);
        assert!(response.message.is_none());
    }

    #[test]
    fn test_register_response_requires_explicit_success() {
        // An absent success flag must not default to true.
        let result = serde_json::from_str::<RegisterDeviceResponse>(r#"{"message":"ok"}"#);
        assert!(result.is_err());
    }
}
