use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Précis API",
        version = "0.1.0",
        description = "Stores website URLs and summarizes their content with an LLM."
    ),
    paths(
        crate::routes::welcome,
        crate::routes::submit_url,
        crate::routes::get_summary,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::SubmitUrlRequest,
        crate::dto::SubmitUrlResponse,
        crate::dto::UrlRecordResponse,
        crate::dto::SummaryResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "summaries", description = "URL submission and summarization"),
        (name = "system", description = "Welcome and health"),
    )
)]
pub struct ApiDoc;
