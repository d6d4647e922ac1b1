use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

pub const JOB_TAG: &str = "Jobs";
pub const SEARCH_TAG: &str = "Search";
pub const USER_TAG: &str = "Users";
pub const ALERT_TAG: &str = "Alerts";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Jobhub",
        description = "Job listing search, saved jobs, applications and job alerts",
    ),
    modifiers(&SecurityAddon),
    components(
        schemas(
            crate::api::dto::ErrorResponse,
            crate::error::ValidationFieldError,
            crate::search::PageMeta,
        )
    ),
    tags(
        (name = JOB_TAG, description = "Job listing, search and tracking endpoints"),
        (name = SEARCH_TAG, description = "Relevance search, trending skills and filter values"),
        (name = USER_TAG, description = "Account and profile endpoints"),
        (name = ALERT_TAG, description = "Saved search alert endpoints"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token returned by login or registration"))
                    .build(),
            ),
        )
    }
}
