use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::ServiceExt;

use fitdesk::{api, config::Settings, repository::AdminRepository, service::ServiceContext};

const ADMIN_MOBILE: &str = "+911234567890";

async fn test_app() -> anyhow::Result<Router> {
    let pool = SqlitePool::connect(":memory:").await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let settings = Settings::default();
    let service_context = Arc::new(ServiceContext::new(&settings, pool));
    service_context
        .admin_repo
        .seed_if_absent(ADMIN_MOBILE, "Test Admin")
        .await?;

    Ok(api::create_app(service_context, Arc::new(settings)))
}

async fn body_json(response: axum::response::Response) -> anyhow::Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn login(app: &Router) -> anyhow::Result<String> {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/send-otp",
            json!({ "mobile": ADMIN_MOBILE }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    // Default settings expose the code for development
    let otp = body["otp"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/auth/verify-otp",
            json!({ "mobile": ADMIN_MOBILE, "otp": otp }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    Ok(body["token"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn test_health_endpoints() -> anyhow::Result<()> {
    let app = test_app().await?;

    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn test_public_signup_and_protected_listing() -> anyhow::Result<()> {
    let app = test_app().await?;

    // Signup requires no token
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/members",
            json!({
                "name": "Walk-in Member",
                "mobile": "+919876543210",
                "month": 3,
                "fees": 1500.0
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await?;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["member"]["status"], json!("approved"));

    // Listing without a token is rejected
    let response = app
        .clone()
        .oneshot(Request::get("/api/members").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // With a token the envelope carries members plus pagination
    let token = login(&app).await?;
    let response = app
        .oneshot(
            Request::get("/api/members")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["pagination"]["totalMembers"], json!(1));
    assert_eq!(body["pagination"]["current"], json!(1));
    assert_eq!(body["members"][0]["name"], json!("Walk-in Member"));

    Ok(())
}

#[tokio::test]
async fn test_signup_validation_errors() -> anyhow::Result<()> {
    let app = test_app().await?;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/members",
            json!({
                "name": "Bad Mobile",
                "mobile": "12",
                "month": 3
            }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["success"], json!(false));

    Ok(())
}

#[tokio::test]
async fn test_invalid_status_patch_rejected() -> anyhow::Result<()> {
    let app = test_app().await?;
    let token = login(&app).await?;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/members",
            json!({ "name": "Patched", "mobile": "+919876543210", "month": 1 }),
        ))
        .await?;
    let body = body_json(response).await?;
    let id = body["member"]["id"].as_str().unwrap().to_string();

    let mut request = json_request(
        "PUT",
        &format!("/api/members/{}", id),
        json!({ "status": "frozen" }),
    );
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token).parse().unwrap(),
    );
    let response = app.oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await?;
    assert_eq!(body["message"], json!("Invalid status value"));

    Ok(())
}

#[tokio::test]
async fn test_dashboard_requires_auth() -> anyhow::Result<()> {
    let app = test_app().await?;

    let response = app
        .clone()
        .oneshot(Request::get("/api/analytics/dashboard").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let token = login(&app).await?;
    let response = app
        .oneshot(
            Request::get("/api/analytics/dashboard")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())?,
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["analytics"]["totalMembers"], json!(0));
    assert_eq!(body["analytics"]["monthlyStats"].as_array().unwrap().len(), 6);

    Ok(())
}

#[tokio::test]
async fn test_diet_plan_crud_over_http() -> anyhow::Result<()> {
    let app = test_app().await?;
    let token = login(&app).await?;
    let auth = |mut request: Request<Body>| {
        request.headers_mut().insert(
            header::AUTHORIZATION,
            format!("Bearer {}", token).parse().unwrap(),
        );
        request
    };

    let response = app
        .clone()
        .oneshot(auth(json_request(
            "POST",
            "/api/diet",
            json!({
                "title": "Lean Plan",
                "targetAudience": "weight_loss",
                "meals": [{
                    "name": "Breakfast",
                    "items": [{ "food": "Oats", "calories": 300.0, "protein": 10.0 }]
                }]
            }),
        )))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await?;
    // No PDF pipeline configured in tests
    assert_eq!(body["pdfGenerated"], json!(false));
    assert_eq!(body["dietPlan"]["totalCalories"], json!(300.0));
    let id = body["dietPlan"]["id"].as_str().unwrap().to_string();

    let response = app
        .clone()
        .oneshot(auth(Request::get("/api/diet").body(Body::empty())?))
        .await?;
    let body = body_json(response).await?;
    assert_eq!(body["pagination"]["totalPlans"], json!(1));

    let response = app
        .clone()
        .oneshot(auth(
            Request::delete(format!("/api/diet/{}", id)).body(Body::empty())?,
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(auth(
            Request::get(format!("/api/diet/{}", id)).body(Body::empty())?,
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_transformations_read_is_public_but_writes_are_not() -> anyhow::Result<()> {
    let app = test_app().await?;

    // The home-page gallery is readable without a token.
    let response = app
        .clone()
        .oneshot(Request::get("/api/transformations/home").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await?;
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["transformations"], json!([]));

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/transformations/home",
            json!({ "transformations": [] }),
        ))
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}
