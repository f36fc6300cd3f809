use super::*;
use crate::request::MockHttpClient;
use crate::session::test_tokens::jwt;
use serde_json::json;

const API: &str = "http://localhost:5000/api/";

fn api() -> MarketplaceApi<MockHttpClient> {
    MarketplaceApi::new(API, MockHttpClient::new())
}

fn url(path: &str) -> String {
    format!("http://localhost:5000/api{path}")
}

#[tokio::test]
async fn test_user_login_uses_top_level_token() {
    let api = api();
    api.client().mock_response(
        HttpMethod::Post,
        &url("/users/login"),
        200,
        json!({
            "status": true,
            "message": "Login successful",
            "token": "abc.def.ghi",
            "data": {"_id": "u1", "name": "Ana", "email": "ana@x.io", "phone": "5550100"}
        }),
    );

    let outcome = api.login_user(" ana@x.io ", "secret1").await.unwrap();
    assert_eq!(outcome.token, "abc.def.ghi");
    assert_eq!(outcome.profile.id, "u1");
    assert_eq!(outcome.profile.phone.as_deref(), Some("5550100"));

    let request = api.client().last_request().unwrap();
    assert_eq!(
        request.json_body(),
        json!({"email": "ana@x.io", "password": "secret1"})
    );
    assert!(!request.headers.contains_key("Authorization"));
}

#[tokio::test]
async fn test_admin_login_without_data_decodes_token() {
    let api = api();
    let token = jwt(json!({"id": "a1", "name": "Root", "email": "root@x.io"}));
    api.client().mock_response(
        HttpMethod::Post,
        &url("/admin/login"),
        200,
        json!({"success": true, "token": token}),
    );

    let outcome = api.login_admin("root@x.io", "pw").await.unwrap();
    assert_eq!(outcome.profile.name, "Root");
    assert_eq!(outcome.profile.id, "a1");
}

#[tokio::test]
async fn test_login_rejection_carries_server_message() {
    let api = api();
    api.client().mock_response(
        HttpMethod::Post,
        &url("/users/login"),
        200,
        json!({"status": false, "message": "Invalid credentials"}),
    );
    let err = api.login_user("ana@x.io", "wrong").await.unwrap_err();
    assert_eq!(err.user_message(), "Invalid credentials");

    api.client().mock_response(
        HttpMethod::Post,
        &url("/admin/login"),
        401,
        json!({"success": false, "message": "Unauthorized"}),
    );
    let err = api.login_admin("x@x.io", "pw").await.unwrap_err();
    assert_eq!(
        err,
        ClientError::Rejected {
            status: 401,
            message: Some("Unauthorized".to_string())
        }
    );
}

#[tokio::test]
async fn test_login_without_token_is_malformed() {
    let api = api();
    api.client().mock_response(
        HttpMethod::Post,
        &url("/users/login"),
        200,
        json!({"status": "success", "data": {"_id": "u1"}}),
    );
    assert!(matches!(
        api.login_user("a@x.io", "pw").await,
        Err(ClientError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_non_json_error_body_uses_generic_message() {
    let api = api();
    api.client().mock_response(
        HttpMethod::Get,
        &url("/orders"),
        502,
        json!("Bad Gateway"),
    );
    let err = api.list_orders("adm").await.unwrap_err();
    assert_eq!(err, ClientError::Rejected { status: 502, message: None });
    assert_eq!(err.user_message(), "Something went wrong. Please try again.");
}

#[tokio::test]
async fn test_bearer_token_and_path_params() {
    let api = api();
    api.client().mock_response(
        HttpMethod::Get,
        &url("/cars/user/u1"),
        200,
        json!({"success": true, "data": [
            {"_id": "c1", "make": "Honda", "model": "Civic", "year": 2020, "licensePlate": "XYZ-9"}
        ]}),
    );

    let vehicles = api.list_vehicles("u1", "tok").await.unwrap();
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0].make, "Honda");

    let request = api.client().last_request().unwrap();
    assert_eq!(request.headers.get("Authorization").map(String::as_str), Some("Bearer tok"));
    assert_eq!(request.body, None);
}

#[tokio::test]
async fn test_missing_data_defaults_to_empty_list() {
    let api = api();
    api.client().mock_response(
        HttpMethod::Get,
        &url("/services"),
        200,
        json!({"success": true, "message": "No services"}),
    );
    assert!(api.list_services(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_fetch_requires_data() {
    let api = api();
    api.client().mock_response(
        HttpMethod::Get,
        &url("/orders/o1"),
        200,
        json!({"success": true}),
    );
    assert!(matches!(
        api.get_order("o1", "adm").await,
        Err(ClientError::Malformed(_))
    ));
}

#[tokio::test]
async fn test_order_updates_send_patch_bodies() {
    let api = api();
    api.client().mock_response(
        HttpMethod::Patch,
        &url("/orders/o1/status"),
        200,
        json!({"success": true, "data": {"_id": "o1", "status": "approved"}}),
    );
    api.client().mock_response(
        HttpMethod::Patch,
        &url("/orders/o1/notes"),
        200,
        json!({"success": true}),
    );

    let updated = api
        .update_order_status("o1", OrderStatus::Approved, "adm")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.status, OrderStatus::Approved);
    assert_eq!(
        api.client().last_request().unwrap().json_body(),
        json!({"status": "approved"})
    );

    assert_eq!(api.update_order_notes("o1", "VIP", "adm").await.unwrap(), None);
    assert_eq!(
        api.client().last_request().unwrap().json_body(),
        json!({"adminNotes": "VIP"})
    );
}

#[tokio::test]
async fn test_network_failure_is_classified() {
    let api = api();
    api.client()
        .mock_failure(HttpMethod::Delete, &url("/cars/c1"), "offline");
    assert!(matches!(
        api.delete_vehicle("c1", "tok").await,
        Err(ClientError::Network(_))
    ));
}

#[tokio::test]
async fn test_signup_and_otp_return_server_message() {
    let api = api();
    api.client().mock_response(
        HttpMethod::Post,
        &url("/users/signup"),
        201,
        json!({"status": true, "message": "OTP sent to your email"}),
    );
    api.client().mock_response(
        HttpMethod::Post,
        &url("/users/verify-otp"),
        200,
        json!({"success": true, "message": "Account verified"}),
    );

    let req = SignupRequest {
        name: "Ana".to_string(),
        email: "ana@x.io".to_string(),
        phone: "5550100".to_string(),
        password: "secret1".to_string(),
    };
    assert_eq!(
        api.signup(&req).await.unwrap().as_deref(),
        Some("OTP sent to your email")
    );
    assert_eq!(
        api.verify_otp("ana@x.io", "123456").await.unwrap().as_deref(),
        Some("Account verified")
    );
    assert_eq!(
        api.client().last_request().unwrap().json_body(),
        json!({"email": "ana@x.io", "otp": "123456"})
    );
}

#[tokio::test]
async fn test_order_by_session_carries_customer_token() {
    let api = api();
    api.client().mock_response(
        HttpMethod::Get,
        &url("/orders/session/cs_42"),
        200,
        json!({"success": true, "data": {"_id": "o9", "status": "pending", "totalAmount": 45.0}}),
    );

    let order = api.order_by_session("cs_42", Some("tok")).await.unwrap();
    assert_eq!(order.id, "o9");
    assert_eq!(
        api.client().last_request().unwrap().headers.get("Authorization").map(String::as_str),
        Some("Bearer tok")
    );
}
