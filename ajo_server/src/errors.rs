use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use ajo_engine::{GroupApiError, ReconciliationError};
use log::error;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
    #[error("Could not read request body: {0}")]
    InvalidRequestBody(String),
    #[error("Could not read request path: {0}")]
    InvalidRequestPath(String),
    #[error("An I/O error happened in the server. {0}")]
    IOError(#[from] std::io::Error),
    #[error("UnspecifiedError. {0}")]
    Unspecified(String),
    #[error("Not authenticated. {0}")]
    Unauthenticated(String),
    #[error("The data was not found. {0}")]
    NoRecordFound(String),
    #[error("Insufficient Permissions. {0}")]
    InsufficientPermissions(String),
    #[error("Conflict. {0}")]
    Conflict(String),
    #[error("The payment gateway could not complete the request. {0}")]
    GatewayError(String),
    #[error("Webhook signature is missing or invalid")]
    InvalidSignature,
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequestBody(_) => StatusCode::BAD_REQUEST,
            Self::InvalidRequestPath(_) => StatusCode::BAD_REQUEST,
            Self::InvalidSignature => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientPermissions(_) => StatusCode::FORBIDDEN,
            Self::NoRecordFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::GatewayError(_) => StatusCode::BAD_GATEWAY,
            Self::InitializeError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::IOError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Unspecified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(serde_json::json!({ "error": self.to_string() }).to_string())
    }
}

impl From<ReconciliationError> for ServerError {
    fn from(e: ReconciliationError) -> Self {
        match e {
            ReconciliationError::Gateway(e) => Self::GatewayError(e.to_string()),
            ReconciliationError::InvalidSignature => Self::InvalidSignature,
            ReconciliationError::NotFound(s) => Self::NoRecordFound(s),
            ReconciliationError::AmountMismatch { .. } => Self::Conflict(e.to_string()),
            ReconciliationError::MalformedPayload(s) => Self::InvalidRequestBody(s),
            ReconciliationError::DuplicateReference(_) => {
                error!("💻️ {e}");
                Self::BackendError(e.to_string())
            },
            ReconciliationError::Database(s) => Self::BackendError(format!("Database error: {s}")),
        }
    }
}

impl From<GroupApiError> for ServerError {
    fn from(e: GroupApiError) -> Self {
        match e {
            GroupApiError::NotFound(s) => Self::NoRecordFound(s),
            GroupApiError::AlreadyMember { .. } | GroupApiError::AlreadyPaidOut { .. } => Self::Conflict(e.to_string()),
            GroupApiError::NotOrganizer | GroupApiError::NotMember(_) => Self::InsufficientPermissions(e.to_string()),
            GroupApiError::InvalidInput(s) => Self::InvalidRequestBody(s),
            GroupApiError::ReferralCodeExhausted(_) => Self::BackendError(e.to_string()),
            GroupApiError::Database(s) => Self::BackendError(format!("Database error: {s}")),
        }
    }
}
