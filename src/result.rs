use serde::{Deserialize, Serialize};

/// 统一响应信封
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResult<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl<T: Serialize> ApiResult<T> {
    pub fn success(message: &str, data: T) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            payload: Some(data),
        }
    }
}

impl<T> ApiResult<T> {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            message,
            payload: None,
        }
    }

    pub fn ack(message: &str) -> Self {
        Self {
            success: true,
            message: message.to_string(),
            payload: None,
        }
    }
}
