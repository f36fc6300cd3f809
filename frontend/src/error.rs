use crate::booking::Stage;
use autoserve_shared::ValidationError;
use thiserror::Error;

const GENERIC_FAILURE: &str = "Something went wrong. Please try again.";
const NETWORK_FAILURE: &str = "Unable to reach the server. Please try again later.";

/// 客户端错误
///
/// 所有失败都在调用点被捕获，转换为一条错误提示并复位本地加载标志，
/// 不会以未处理异常的形式冒泡。
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// 需要登录的操作在未登录状态下被触发
    #[error("no active session")]
    Unauthenticated,

    /// 客户端校验失败，未发出任何请求
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// 请求没有得到响应
    #[error("network error: {0}")]
    Network(String),

    /// 服务端拒绝（非 2xx 或信封标记失败）
    #[error("request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// 响应无法解析
    #[error("malformed response: {0}")]
    Malformed(String),

    /// 会话令牌无法解码（只记录日志）
    #[error("token decode failed: {0}")]
    Decode(String),

    #[error("a submission is already in progress")]
    AlreadySubmitting,

    #[error("cannot {action} from the {stage} step")]
    InvalidTransition { action: &'static str, stage: Stage },
}

impl ClientError {
    pub fn rejected(status: u16, message: Option<String>) -> Self {
        Self::Rejected {
            status,
            message: message.filter(|m| !m.trim().is_empty()),
        }
    }

    /// 展示给用户的文本
    ///
    /// 服务端给出的消息原样展示，其余情况使用通用文案。
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthenticated => "Please log in to continue.".to_string(),
            Self::Validation(err) => err.to_string(),
            Self::Network(_) => NETWORK_FAILURE.to_string(),
            Self::Rejected {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Rejected { message: None, .. } | Self::Malformed(_) => {
                GENERIC_FAILURE.to_string()
            }
            Self::Decode(_) => "Your session could not be read. Please log in again.".to_string(),
            Self::AlreadySubmitting => "Your order is already being submitted.".to_string(),
            Self::InvalidTransition { .. } => GENERIC_FAILURE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_message_is_shown_verbatim() {
        let err = ClientError::rejected(400, Some("Vehicle not found".to_string()));
        assert_eq!(err.user_message(), "Vehicle not found");
    }

    #[test]
    fn test_blank_server_message_falls_back() {
        let err = ClientError::rejected(500, Some("  ".to_string()));
        assert_eq!(err, ClientError::Rejected { status: 500, message: None });
        assert_eq!(err.user_message(), GENERIC_FAILURE);
    }

    #[test]
    fn test_network_failure_message() {
        let err = ClientError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), NETWORK_FAILURE);
    }

    #[test]
    fn test_validation_message_comes_from_shared() {
        let err: ClientError = ValidationError::MissingVehicle.into();
        assert_eq!(err.user_message(), "Please select a vehicle");
    }
}
