use axum::Router;
use depot_kernel::server::{ApiState, system_router};
use depot_uploads::uploads_router;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "Depot", description = "File upload and retrieval API"))]
struct ApiDoc;

pub(crate) fn init(state: ApiState) -> Router {
    let uploads = uploads_router(&state.config);

    let (routes, api_doc) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .merge(system_router())
        .merge(uploads)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .split_for_parts();

    Router::new().merge(routes).merge(Scalar::with_url("/api", api_doc))
}
