//! 后端 API 客户端
//!
//! 每个端点对应 `autoserve_shared::protocol` 中的一个请求类型，
//! 这里只负责拼 URL、加认证头、解信封与错误分类。

use crate::error::ClientError;
use crate::request::{HttpClient, HttpRequest};
use crate::session::decode_claims;
use autoserve_shared::protocol::*;
use autoserve_shared::{
    HEADER_AUTHORIZATION, NewOrder, NewService, NewVehicle, Order, OrderStatus, Service,
    UserProfile, Vehicle,
};
use serde_json::Value;
use std::rc::Rc;

/// 登录成功后的结果
#[derive(Debug, Clone, PartialEq)]
pub struct LoginOutcome {
    pub token: String,
    pub profile: UserProfile,
}

/// 后端 API 客户端（克隆共享同一个底层 HTTP 客户端）
pub struct MarketplaceApi<C: HttpClient> {
    base_url: String,
    client: Rc<C>,
}

impl<C: HttpClient> Clone for MarketplaceApi<C> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            client: Rc::clone(&self.client),
        }
    }
}

impl<C: HttpClient> MarketplaceApi<C> {
    pub fn new(base_url: &str, client: C) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Rc::new(client),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// 发送一个类型化请求并解开响应信封
    ///
    /// - 没有收到响应 => `Network`
    /// - 非 2xx 或信封标记失败 => `Rejected`（带服务端消息）
    /// - 2xx 但无法解析 => `Malformed`
    pub async fn call<R: ApiRequest>(
        &self,
        req: &R,
        token: Option<&str>,
    ) -> Result<ApiEnvelope<R::Response>, ClientError> {
        let url = self.url(&req.path());
        let mut http = HttpRequest::new(&url, R::METHOD);

        if let Some(token) = token.filter(|t| !t.is_empty()) {
            http = http.with_header(HEADER_AUTHORIZATION, &format!("Bearer {token}"));
        }

        if R::METHOD.has_body() {
            let body = serde_json::to_value(req)
                .map_err(|e| ClientError::Malformed(format!("request encode failed: {e}")))?;
            http = http.with_body(body);
        }

        tracing::debug!("{} {}", R::METHOD.as_str(), url);
        let response = self.client.send(http).await.inspect_err(|e| {
            tracing::warn!("{} {} failed: {e}", R::METHOD.as_str(), url);
        })?;

        if !response.ok() {
            // 失败响应的 data 形状不可信，只取 message
            let message = serde_json::from_str::<ApiEnvelope<Value>>(&response.body)
                .ok()
                .and_then(|env| env.message);
            tracing::warn!("{} {} rejected with {}", R::METHOD.as_str(), url, response.status);
            return Err(ClientError::rejected(response.status, message));
        }

        let envelope: ApiEnvelope<R::Response> = response.json()?;
        if !envelope.is_success() {
            return Err(ClientError::rejected(response.status, envelope.message));
        }
        Ok(envelope)
    }

    /// 与 `call` 相同，但要求信封中带有 `data`
    pub async fn fetch<R: ApiRequest>(
        &self,
        req: &R,
        token: Option<&str>,
    ) -> Result<R::Response, ClientError> {
        self.call(req, token)
            .await?
            .data
            .ok_or_else(|| ClientError::Malformed(format!("{} returned no data", req.path())))
    }

    // =========================================================
    // 认证
    // =========================================================

    pub async fn login_user(&self, email: &str, password: &str) -> Result<LoginOutcome, ClientError> {
        let req = UserLoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let envelope = self.call(&req, None).await?;
        login_outcome(envelope)
    }

    pub async fn login_admin(&self, email: &str, password: &str) -> Result<LoginOutcome, ClientError> {
        let req = AdminLoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let envelope = self.call(&req, None).await?;
        login_outcome(envelope)
    }

    /// 注册；成功时返回服务端消息
    pub async fn signup(&self, req: &SignupRequest) -> Result<Option<String>, ClientError> {
        Ok(self.call(req, None).await?.message)
    }

    pub async fn verify_otp(&self, email: &str, otp: &str) -> Result<Option<String>, ClientError> {
        let req = VerifyOtpRequest {
            email: email.trim().to_string(),
            otp: otp.trim().to_string(),
        };
        Ok(self.call(&req, None).await?.message)
    }

    // =========================================================
    // 车辆
    // =========================================================

    pub async fn list_vehicles(&self, user_id: &str, token: &str) -> Result<Vec<Vehicle>, ClientError> {
        let req = ListVehiclesRequest {
            user_id: user_id.to_string(),
        };
        // 没有车辆时部分后端版本省略 data
        Ok(self.call(&req, Some(token)).await?.data.unwrap_or_default())
    }

    pub async fn add_vehicle(&self, vehicle: &NewVehicle, token: &str) -> Result<Option<Vehicle>, ClientError> {
        Ok(self.call(vehicle, Some(token)).await?.data)
    }

    pub async fn delete_vehicle(&self, car_id: &str, token: &str) -> Result<(), ClientError> {
        let req = DeleteVehicleRequest {
            car_id: car_id.to_string(),
        };
        self.call(&req, Some(token)).await.map(|_| ())
    }

    // =========================================================
    // 服务目录
    // =========================================================

    pub async fn list_services(&self, token: Option<&str>) -> Result<Vec<Service>, ClientError> {
        Ok(self.call(&ListServicesRequest, token).await?.data.unwrap_or_default())
    }

    pub async fn get_service(&self, id: &str, token: Option<&str>) -> Result<Service, ClientError> {
        let req = GetServiceRequest { id: id.to_string() };
        self.fetch(&req, token).await
    }

    pub async fn create_service(&self, service: &NewService, token: &str) -> Result<Service, ClientError> {
        self.fetch(service, Some(token)).await
    }

    // =========================================================
    // 订单
    // =========================================================

    /// 下单；部分后端版本不回传订单对象
    pub async fn create_order(&self, order: &NewOrder, token: &str) -> Result<Option<Order>, ClientError> {
        Ok(self.call(order, Some(token)).await?.data)
    }

    pub async fn list_orders(&self, token: &str) -> Result<Vec<Order>, ClientError> {
        Ok(self.call(&ListOrdersRequest, Some(token)).await?.data.unwrap_or_default())
    }

    pub async fn get_order(&self, id: &str, token: &str) -> Result<Order, ClientError> {
        let req = GetOrderRequest { id: id.to_string() };
        self.fetch(&req, Some(token)).await
    }

    pub async fn update_order_status(
        &self,
        id: &str,
        status: OrderStatus,
        token: &str,
    ) -> Result<Option<Order>, ClientError> {
        let req = UpdateOrderStatusRequest {
            id: id.to_string(),
            status,
        };
        Ok(self.call(&req, Some(token)).await?.data)
    }

    pub async fn update_order_notes(
        &self,
        id: &str,
        notes: &str,
        token: &str,
    ) -> Result<Option<Order>, ClientError> {
        let req = UpdateOrderNotesRequest {
            id: id.to_string(),
            admin_notes: notes.to_string(),
        };
        Ok(self.call(&req, Some(token)).await?.data)
    }

    pub async fn order_by_session(&self, session_id: &str, token: Option<&str>) -> Result<Order, ClientError> {
        let req = OrderBySessionRequest {
            session_id: session_id.to_string(),
        };
        self.fetch(&req, token).await
    }
}

/// 登录响应：token 在顶层，资料在 data；资料缺失的字段从 token 载荷中补齐
fn login_outcome(envelope: ApiEnvelope<UserProfile>) -> Result<LoginOutcome, ClientError> {
    let token = envelope
        .token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClientError::Malformed("login response carried no token".to_string()))?;

    let claims = decode_claims(&token).map(UserProfile::from);
    let profile = match (envelope.data, claims) {
        (Some(mut data), Some(claims)) => {
            if data.id.is_empty() {
                data.id = claims.id;
            }
            if data.name.is_empty() {
                data.name = claims.name;
            }
            if data.email.is_empty() {
                data.email = claims.email;
            }
            data
        }
        (Some(data), None) => data,
        (None, claims) => claims.unwrap_or_default(),
    };

    Ok(LoginOutcome { token, profile })
}

#[cfg(test)]
mod tests;
