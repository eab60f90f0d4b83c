pub mod handlers;
pub mod middleware;
pub mod state;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Settings, service::ServiceContext};
use state::AppState;

pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        // Root and health endpoints
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        // Auth routes
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/signup", post(handlers::auth::signup))
        // Public routes (catalog and enquiries, no login needed)
        .nest("/public", public_routes())
        // Logged-in routes
        .nest("/api", api_routes(app_state.clone()))
        // Admin routes
        .nest("/api/admin", admin_routes(app_state.clone()))
        // Add state to the router
        .with_state(app_state)
        // Middleware
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/courses", get(handlers::courses::list))
        .route("/courses/search", get(handlers::courses::search))
        .route("/courses/:id", get(handlers::courses::get))
        .route("/enquiries", post(handlers::enquiries::submit))
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/enrollments", post(handlers::enrollments::enroll))
        .route("/enrollments", get(handlers::enrollments::list_mine))
        .route("/enrollments/dues", get(handlers::enrollments::my_dues))
        .route("/enrollments/:id/due", get(handlers::enrollments::due))
        .route("/enrollments/:id/unenroll", post(handlers::enrollments::unenroll))
        .route("/payments", post(handlers::payments::pay))
        .route("/payments", get(handlers::payments::list_mine))
        .route("/notifications", get(handlers::notifications::list))
        .route("/notifications", delete(handlers::notifications::clear_all))
        .route("/notifications/unread", get(handlers::notifications::list_unread))
        .route("/notifications/read_all", post(handlers::notifications::mark_all_read))
        .route("/notifications/:id/read", post(handlers::notifications::mark_read))
        .route("/referrals/me", get(handlers::referrals::get_mine))
        .route("/referrals", post(handlers::referrals::generate))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_auth,
        ))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/stats", get(handlers::admin::stats))
        .route("/dues", get(handlers::admin::dues))
        // User management
        .route("/users", get(handlers::users::list))
        .route("/users", post(handlers::users::create_student))
        .route("/admins", post(handlers::users::create_admin))
        .route("/users/:id", get(handlers::users::get))
        .route("/users/:id", put(handlers::users::update))
        .route("/users/:id", delete(handlers::users::delete))
        .route("/users/:id/approve", post(handlers::users::approve))
        .route("/users/:id/reject", post(handlers::users::reject))
        // Course management
        .route("/courses", post(handlers::courses::create))
        .route("/courses/:id", put(handlers::courses::update))
        .route("/courses/:id", delete(handlers::courses::delete))
        // Enrollment decisions
        .route("/enrollments", get(handlers::enrollments::list_all))
        .route("/enrollments/:id/approve", post(handlers::enrollments::approve))
        .route("/enrollments/:id/reject", post(handlers::enrollments::reject))
        .route("/enrollments/:id/unenroll", post(handlers::enrollments::unenroll))
        // Payments
        .route("/payments", get(handlers::payments::list_all))
        .route("/payments/offline", post(handlers::payments::add_offline))
        // Enquiries
        .route("/enquiries", get(handlers::enquiries::list))
        .route("/enquiries/:id/contacted", post(handlers::enquiries::mark_contacted))
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
