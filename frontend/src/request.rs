use crate::error::ClientError;
use autoserve_shared::protocol::HttpMethod;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

#[cfg(test)]
use std::cell::RefCell;
#[cfg(test)]
use std::collections::VecDeque;

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

/// 通用 HTTP 请求结构
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self.with_header("Content-Type", "application/json")
    }
}

/// 通用 HTTP 响应结构
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    /// 检查响应是否成功 (2xx)
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        serde_json::from_str(&self.body).map_err(|e| ClientError::Malformed(e.to_string()))
    }
}

/// HTTP 客户端特性 (Trait)
///
/// (?Send) 是因为浏览器环境下的 future 不是 Send 的。
/// 连接失败（没有收到响应）返回 `ClientError::Network`，
/// 任何收到的响应（包括非 2xx）都返回 `Ok`。
#[async_trait::async_trait(?Send)]
pub trait HttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ClientError>;
}

// =========================================================
// 实现层: 浏览器 fetch 客户端 (Production)
// =========================================================

#[cfg(target_arch = "wasm32")]
pub use fetch::FetchHttpClient;

#[cfg(target_arch = "wasm32")]
mod fetch {
    use super::*;
    use gloo_net::http::{Request, RequestBuilder};

    #[derive(Debug, Clone, Copy, Default)]
    pub struct FetchHttpClient;

    #[async_trait::async_trait(?Send)]
    impl HttpClient for FetchHttpClient {
        async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
            let mut builder: RequestBuilder = match req.method {
                HttpMethod::Get => Request::get(&req.url),
                HttpMethod::Post => Request::post(&req.url),
                HttpMethod::Put => Request::put(&req.url),
                HttpMethod::Delete => Request::delete(&req.url),
                HttpMethod::Patch => Request::patch(&req.url),
            };

            for (k, v) in &req.headers {
                builder = builder.header(k, v);
            }

            let request = match req.body {
                Some(body) => builder.body(body),
                None => builder.build(),
            }
            .map_err(|e| ClientError::Network(format!("request build failed: {e}")))?;

            let response = request
                .send()
                .await
                .map_err(|e| ClientError::Network(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| ClientError::Malformed(e.to_string()))?;

            Ok(HttpResponse { status, body })
        }
    }
}

// =========================================================
// 测试工具: MockHttpClient
// =========================================================

#[cfg(test)]
#[derive(Debug, Clone)]
pub enum MockReply {
    Respond(u16, String),
    Fail(String),
}

/// 记录下来的请求
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

#[cfg(test)]
impl RecordedRequest {
    pub fn json_body(&self) -> serde_json::Value {
        self.body
            .as_deref()
            .map(|b| serde_json::from_str(b).unwrap())
            .unwrap_or(serde_json::Value::Null)
    }
}

/// 按 "METHOD URL" 匹配的 mock 客户端
///
/// 同一个键可以排队多个响应，最后一个响应会被重复使用。
#[cfg(test)]
#[derive(Default)]
pub struct MockHttpClient {
    responses: RefCell<HashMap<String, VecDeque<MockReply>>>,
    pub requests: RefCell<Vec<RecordedRequest>>,
}

#[cfg(test)]
impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method.as_str(), url)
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.responses
            .borrow_mut()
            .entry(Self::key(method, url))
            .or_default()
            .push_back(MockReply::Respond(status, body.to_string()));
    }

    pub fn mock_failure(&self, method: HttpMethod, url: &str, reason: &str) {
        self.responses
            .borrow_mut()
            .entry(Self::key(method, url))
            .or_default()
            .push_back(MockReply::Fail(reason.to_string()));
    }

    /// 发往某个端点的请求数
    pub fn count(&self, method: HttpMethod, url: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.borrow().last().cloned()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpClient for MockHttpClient {
    async fn send(&self, req: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.requests.borrow_mut().push(RecordedRequest {
            method: req.method,
            url: req.url.clone(),
            headers: req.headers.clone(),
            body: req.body.clone(),
        });

        let mut responses = self.responses.borrow_mut();
        let reply = match responses.get_mut(&Self::key(req.method, &req.url)) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match reply {
            Some(MockReply::Respond(status, body)) => Ok(HttpResponse { status, body }),
            Some(MockReply::Fail(reason)) => Err(ClientError::Network(reason)),
            None => Ok(HttpResponse {
                status: 404,
                body: r#"{"success":false,"message":"Not Found"}"#.to_string(),
            }),
        }
    }
}
