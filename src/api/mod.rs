pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    Router,
    routing::{get, post, put, delete},
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use std::sync::Arc;

use crate::{config::Settings, service::ServiceContext};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))

        // API routes
        .nest("/api", api_routes(app_state.clone()))

        // Add state to the router
        .with_state(app_state)

        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive()) // Configure properly for production
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/members", member_routes(state.clone()))
        .nest("/analytics", analytics_routes(state.clone()))
        .nest("/diet", diet_plan_routes(state.clone()))
        .nest("/transformations", transformation_routes(state))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/send-otp", post(handlers::auth::send_otp))
        .route("/verify-otp", post(handlers::auth::verify_otp))
}

fn member_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public signup (no auth required)
        .route("/", post(handlers::members::create))
        // Protected routes - wrapped in a nested router with auth middleware
        .nest("/", Router::new()
            .route("/", get(handlers::members::list))
            .route("/:id", put(handlers::members::update))
            .route("/:id", delete(handlers::members::delete))
            .route("/bulk-delete", post(handlers::members::bulk_delete))
            .route("/send-message", post(handlers::members::send_message))
            .route("/expired-sweep", post(handlers::members::sweep_expired))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_admin,
            ))
        )
}

fn analytics_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(handlers::analytics::dashboard))
        .route("/expiring-members", get(handlers::analytics::expiring_members))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}

fn transformation_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Public gallery read for the site home page
        .route("/home", get(handlers::transformations::home_gallery))
        .nest("/", Router::new()
            .route("/home", post(handlers::transformations::upsert_home_gallery))
            .route_layer(axum::middleware::from_fn_with_state(
                state,
                middleware::auth::require_admin,
            ))
        )
}

fn diet_plan_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::diet_plans::list))
        .route("/", post(handlers::diet_plans::create))
        .route("/:id", get(handlers::diet_plans::get))
        .route("/:id", put(handlers::diet_plans::update))
        .route("/:id", delete(handlers::diet_plans::delete))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
