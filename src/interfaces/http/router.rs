//! API router with Swagger documentation

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::modules::{
    dashboard, expenses, health, maintenance, members, metrics, rates, request_id,
};
use super::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::handlers::health_check,
        members::handlers::list_members,
        members::handlers::get_member,
        members::handlers::create_member,
        members::handlers::bulk_create_members,
        members::handlers::update_member,
        members::handlers::delete_member,
        rates::handlers::get_schedule,
        rates::handlers::get_maintenance_rate,
        rates::handlers::create_maintenance_rate,
        rates::handlers::update_maintenance_rate,
        rates::handlers::delete_maintenance_rate,
        rates::handlers::get_water_rate,
        rates::handlers::create_water_rate,
        rates::handlers::update_water_rate,
        rates::handlers::delete_water_rate,
        maintenance::handlers::list_records,
        maintenance::handlers::get_record,
        maintenance::handlers::preview_record,
        maintenance::handlers::create_record,
        maintenance::handlers::update_record,
        maintenance::handlers::delete_record,
        expenses::handlers::list_expenses,
        expenses::handlers::get_expense,
        expenses::handlers::create_expense,
        expenses::handlers::update_expense,
        expenses::handlers::delete_expense,
        dashboard::handlers::get_dashboard,
    ),
    components(
        schemas(
            health::HealthResponse,
            health::handlers::ComponentHealth,
            members::MemberResponse,
            members::CreateMemberRequest,
            members::UpdateMemberRequest,
            members::BulkCreateMembersRequest,
            members::BulkCreateMembersResponse,
            members::BulkFailureResponse,
            rates::MaintenanceRateResponse,
            rates::WaterRateResponse,
            rates::RateScheduleResponse,
            rates::CreateMaintenanceRateRequest,
            rates::UpdateMaintenanceRateRequest,
            rates::WaterRateRequest,
            maintenance::MaintenanceRecordResponse,
            maintenance::InvoicePreviewResponse,
            maintenance::CreateMaintenanceRequest,
            maintenance::UpdateMaintenanceRequest,
            maintenance::UpdateHistoryResponse,
            maintenance::FieldChangeResponse,
            expenses::ExpenseResponse,
            expenses::CreateExpenseRequest,
            expenses::UpdateExpenseRequest,
            dashboard::DashboardResponse,
            dashboard::MonthlyCollectionResponse,
        )
    ),
    tags(
        (name = "Health", description = "Service health check"),
        (name = "Members", description = "Flat registry: owners and tenants with meter and balance state"),
        (name = "Rates", description = "Fixed maintenance and water unit rates"),
        (name = "Maintenance", description = "Monthly maintenance invoices and payments"),
        (name = "Expenses", description = "Bills paid out by the society"),
        (name = "Dashboard", description = "Collection and expense summaries by period"),
    ),
    info(
        title = "Society Billing API",
        version = "1.0.0",
        description = "Maintenance billing for a housing society: water usage, fixed charges, fines and carried-forward balances",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Optional router pieces supplied by the server.
#[derive(Default)]
pub struct RouterOptions {
    /// Allowed CORS origins; empty allows any origin.
    pub cors_origins: Vec<String>,
    /// Mounts `GET /metrics` when present.
    pub metrics: Option<PrometheusHandle>,
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = o.as_str(), "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(parsed)
}

/// Create the API router with all routes
pub fn create_api_router(
    state: AppState,
    health_state: health::HealthState,
    options: RouterOptions,
) -> Router {
    let member_routes = Router::new()
        .route(
            "/",
            get(members::list_members).post(members::create_member),
        )
        .route("/bulk", post(members::bulk_create_members))
        .route(
            "/{id}",
            get(members::get_member)
                .put(members::update_member)
                .delete(members::delete_member),
        );

    let rate_routes = Router::new()
        .route("/", get(rates::get_schedule))
        .route(
            "/maintenance",
            get(rates::get_maintenance_rate).post(rates::create_maintenance_rate),
        )
        .route(
            "/maintenance/{id}",
            put(rates::update_maintenance_rate).delete(rates::delete_maintenance_rate),
        )
        .route(
            "/water",
            get(rates::get_water_rate).post(rates::create_water_rate),
        )
        .route(
            "/water/{id}",
            put(rates::update_water_rate).delete(rates::delete_water_rate),
        );

    let maintenance_routes = Router::new()
        .route(
            "/",
            get(maintenance::list_records).post(maintenance::create_record),
        )
        .route("/preview", post(maintenance::preview_record))
        .route(
            "/{id}",
            get(maintenance::get_record)
                .put(maintenance::update_record)
                .delete(maintenance::delete_record),
        );

    let expense_routes = Router::new()
        .route(
            "/",
            get(expenses::list_expenses).post(expenses::create_expense),
        )
        .route(
            "/{id}",
            get(expenses::get_expense)
                .put(expenses::update_expense)
                .delete(expenses::delete_expense),
        );

    let api = Router::new()
        .nest("/api/v1/members", member_routes)
        .nest("/api/v1/rates", rate_routes)
        .nest("/api/v1/maintenance", maintenance_routes)
        .nest("/api/v1/expenses", expense_routes)
        .route("/api/v1/dashboard", get(dashboard::get_dashboard))
        .with_state(state);

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state);

    let mut router = Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(health_routes)
        .merge(api);

    if let Some(handle) = options.metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics::prometheus_metrics))
                .with_state(metrics::MetricsState { handle }),
        );
    }

    router
        .layer(middleware::from_fn(metrics::http_metrics_middleware))
        .layer(middleware::from_fn(request_id::request_id_middleware))
        .layer(cors_layer(&options.cors_origins))
        .layer(TraceLayer::new_for_http())
}
