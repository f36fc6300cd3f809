use crate::account::{NewService, NewVehicle, Service, UserProfile, Vehicle};
use crate::order::{NewOrder, Order, OrderStatus};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use urlencoding::encode;

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// GET / DELETE 不携带请求体
    pub fn has_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
///
/// 路径参数字段使用 `#[serde(skip)]`，其余字段序列化为 JSON 请求体。
pub trait ApiRequest: Serialize {
    /// The type carried in the envelope's `data` field.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path, relative to the API base URL.
    fn path(&self) -> String;
}

// =========================================================
// 响应信封
// =========================================================

/// 后端统一响应信封
///
/// 各端点不一致：有的用 `success: bool`，有的用 `status: bool`（偶尔是字符串），
/// 登录接口把 token 放在顶层。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: Option<bool>,
    pub status: Option<Value>,
    pub message: Option<String>,
    pub data: Option<T>,
    pub token: Option<String>,
}

impl<T> ApiEnvelope<T> {
    /// 同时检查 `success` 与 `status`；两者都缺失时视为成功（由 HTTP 状态码决定）
    pub fn is_success(&self) -> bool {
        if let Some(success) = self.success {
            return success;
        }
        match &self.status {
            Some(Value::Bool(ok)) => *ok,
            Some(Value::String(s)) => matches!(s.to_ascii_lowercase().as_str(), "success" | "ok"),
            _ => true,
        }
    }
}

// =========================================================
// Request Definitions
// =========================================================

/// 客户登录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for UserLoginRequest {
    type Response = UserProfile;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/users/login".to_string()
    }
}

/// 管理员登录
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

impl ApiRequest for AdminLoginRequest {
    type Response = UserProfile;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/admin/login".to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
}

impl ApiRequest for SignupRequest {
    type Response = Value;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/users/signup".to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyOtpRequest {
    pub email: String,
    pub otp: String,
}

impl ApiRequest for VerifyOtpRequest {
    type Response = Value;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/users/verify-otp".to_string()
    }
}

/// 列出用户的车辆
#[derive(Debug, Clone, Serialize)]
pub struct ListVehiclesRequest {
    #[serde(skip)]
    pub user_id: String,
}

impl ApiRequest for ListVehiclesRequest {
    type Response = Vec<Vehicle>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/cars/user/{}", encode(&self.user_id))
    }
}

impl ApiRequest for NewVehicle {
    type Response = Vehicle;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/cars/add".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteVehicleRequest {
    #[serde(skip)]
    pub car_id: String,
}

impl ApiRequest for DeleteVehicleRequest {
    type Response = Value;
    const METHOD: HttpMethod = HttpMethod::Delete;
    fn path(&self) -> String {
        format!("/cars/{}", encode(&self.car_id))
    }
}

/// 列出服务目录
#[derive(Debug, Clone, Serialize)]
pub struct ListServicesRequest;

impl ApiRequest for ListServicesRequest {
    type Response = Vec<Service>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/services".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetServiceRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for GetServiceRequest {
    type Response = Service;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/services/{}", encode(&self.id))
    }
}

impl ApiRequest for NewService {
    type Response = Service;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/services".to_string()
    }
}

impl ApiRequest for NewOrder {
    type Response = Order;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/orders/create".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ListOrdersRequest;

impl ApiRequest for ListOrdersRequest {
    type Response = Vec<Order>;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        "/orders".to_string()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetOrderRequest {
    #[serde(skip)]
    pub id: String,
}

impl ApiRequest for GetOrderRequest {
    type Response = Order;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/orders/{}", encode(&self.id))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateOrderStatusRequest {
    #[serde(skip)]
    pub id: String,
    pub status: OrderStatus,
}

impl ApiRequest for UpdateOrderStatusRequest {
    type Response = Order;
    const METHOD: HttpMethod = HttpMethod::Patch;
    fn path(&self) -> String {
        format!("/orders/{}/status", encode(&self.id))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderNotesRequest {
    #[serde(skip)]
    pub id: String,
    pub admin_notes: String,
}

impl ApiRequest for UpdateOrderNotesRequest {
    type Response = Order;
    const METHOD: HttpMethod = HttpMethod::Patch;
    fn path(&self) -> String {
        format!("/orders/{}/notes", encode(&self.id))
    }
}

/// 支付完成后按支付会话查找订单
#[derive(Debug, Clone, Serialize)]
pub struct OrderBySessionRequest {
    #[serde(skip)]
    pub session_id: String,
}

impl ApiRequest for OrderBySessionRequest {
    type Response = Order;
    const METHOD: HttpMethod = HttpMethod::Get;
    fn path(&self) -> String {
        format!("/orders/session/{}", encode(&self.session_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_success_flag_variants() {
        let a: ApiEnvelope<Value> = serde_json::from_str(r#"{"success":true,"data":[]}"#).unwrap();
        assert!(a.is_success());

        let b: ApiEnvelope<Value> = serde_json::from_str(r#"{"status":false,"message":"Invalid credentials"}"#).unwrap();
        assert!(!b.is_success());
        assert_eq!(b.message.as_deref(), Some("Invalid credentials"));

        let c: ApiEnvelope<Value> = serde_json::from_str(r#"{"status":"success","token":"t"}"#).unwrap();
        assert!(c.is_success());
        assert_eq!(c.token.as_deref(), Some("t"));

        // success 优先于 status
        let d: ApiEnvelope<Value> = serde_json::from_str(r#"{"success":false,"status":true}"#).unwrap();
        assert!(!d.is_success());
    }

    #[test]
    fn test_path_params_are_not_serialized() {
        let req = UpdateOrderNotesRequest {
            id: "o1".to_string(),
            admin_notes: "Called customer".to_string(),
        };
        assert_eq!(req.path(), "/orders/o1/notes");
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            serde_json::json!({"adminNotes": "Called customer"})
        );

        let status = UpdateOrderStatusRequest {
            id: "o1".to_string(),
            status: OrderStatus::InProgress,
        };
        assert_eq!(
            serde_json::to_value(&status).unwrap(),
            serde_json::json!({"status": "in-progress"})
        );
    }

    #[test]
    fn test_envelope_data_needs_no_default() {
        #[derive(Debug, Deserialize)]
        struct Receipt {
            id: String,
        }

        let empty: ApiEnvelope<Receipt> = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(empty.data.is_none());

        let full: ApiEnvelope<Receipt> = serde_json::from_str(r#"{"success":true,"data":{"id":"r1"}}"#).unwrap();
        assert_eq!(full.data.map(|r| r.id).as_deref(), Some("r1"));
    }

    #[test]
    fn test_path_params_are_percent_encoded() {
        let req = OrderBySessionRequest {
            session_id: "cs_test/a1?b=2".to_string(),
        };
        assert_eq!(req.path(), "/orders/session/cs_test%2Fa1%3Fb%3D2");

        let req = GetOrderRequest { id: "o 1".to_string() };
        assert_eq!(req.path(), "/orders/o%201");
    }

    #[test]
    fn test_methods_with_body() {
        assert!(NewOrder::METHOD.has_body());
        assert!(UpdateOrderStatusRequest::METHOD.has_body());
        assert!(!ListOrdersRequest::METHOD.has_body());
        assert!(!DeleteVehicleRequest::METHOD.has_body());
    }
}
