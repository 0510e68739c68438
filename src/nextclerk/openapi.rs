use crate::identity::User;
use crate::nextclerk::handlers::{health, health::__path_health, me::__path_me};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(health, me),
    components(schemas(health::Health, User)),
    tags(
        (name = "nextclerk", description = "Landing page, profile settings and session gate"),
        (name = "health", description = "Liveness and build information"),
        (name = "me", description = "Signed-in user")
    )
)]
struct ApiDoc;

/// `OpenAPI` document of the JSON endpoints. HTML pages are not described.
#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
