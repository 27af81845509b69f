use crate::handlers;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use depot_domain::config::ApiConfig;
use depot_domain::constants::MIB;
use depot_domain::policy::Policies;
use depot_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Largest request body the upload route accepts: the biggest category ceiling plus room for
/// multipart framing and metadata fields. Per-category ceilings are enforced while streaming.
#[must_use]
pub fn body_limit(policies: &Policies) -> usize {
    usize::try_from(policies.max_ceiling().saturating_add(MIB)).unwrap_or(usize::MAX)
}

/// Upload, retrieval, and listing routes.
///
/// The public rewrite route `/<public_prefix>/{*path}` is only mounted when a prefix is set.
pub fn uploads_router(config: &ApiConfig) -> OpenApiRouter<ApiState> {
    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::upload_handler))
        .layer(DefaultBodyLimit::max(body_limit(&config.policies)));

    let router = OpenApiRouter::new()
        .merge(upload)
        .routes(routes!(handlers::file_handler))
        .routes(routes!(handlers::image_handler))
        .routes(routes!(handlers::list_handler));

    let prefix = config.storage.public_prefix.trim_matches('/');
    if prefix.is_empty() {
        router
    } else {
        router.route(&format!("/{prefix}/{{*path}}"), get(handlers::public_file_handler))
    }
}
