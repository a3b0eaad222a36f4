use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashboardError {
    /// Store unreachable or credentials rejected. Fatal at startup.
    #[error("Cannot reach the sales database: {0}")]
    Connectivity(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Database connection unavailable: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Query `{0}` returned an empty aggregate")]
    NullAggregate(&'static str),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl DashboardError {
    /// Failures that a page can absorb by rendering an empty section.
    pub fn is_data_access(&self) -> bool {
        matches!(
            self,
            DashboardError::Pool(_) | DashboardError::Query(_) | DashboardError::NullAggregate(_)
        )
    }
}

impl ResponseError for DashboardError {
    fn status_code(&self) -> StatusCode {
        match self {
            DashboardError::BadRequest(_) => StatusCode::BAD_REQUEST,
            DashboardError::Pool(_) | DashboardError::Connectivity(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            DashboardError::Query(_)
            | DashboardError::NullAggregate(_)
            | DashboardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
