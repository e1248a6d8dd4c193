//! Route definitions for the Blending Operations Suite

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/templates", template_routes())
        .nest("/batches", batch_routes())
}

/// Formula template routes
fn template_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_templates).post(handlers::create_template))
        .route("/:template_id", get(handlers::get_template))
}

/// Sample and production batch routes
fn batch_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_batches).post(handlers::create_batch))
        .route("/:batch_id", get(handlers::get_batch))
        .route("/:batch_id/ingredients", put(handlers::replace_ingredients))
        // Calculation
        .route("/:batch_id/preview", post(handlers::preview_calculation))
        .route("/:batch_id/calculate", post(handlers::calculate_batch))
        // Lifecycle
        .route("/:batch_id/complete", post(handlers::complete_batch))
        .route("/:batch_id/bill", post(handlers::bill_batch))
        // Reports
        .route("/:batch_id/report", get(handlers::get_report))
        .route("/:batch_id/report.html", get(handlers::get_report_html))
        .route("/:batch_id/report.txt", get(handlers::get_report_print))
        .route("/:batch_id/export.xlsx", get(handlers::export_xlsx))
        .route("/:batch_id/export.csv", get(handlers::export_csv))
}
