use thiserror::Error;

#[derive(Debug, Error)]
pub enum PaystackApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid REST response: {0}")]
    RestResponseError(String),
    #[error("The request to Paystack timed out")]
    Timeout,
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Paystack declined the request: {0}")]
    Unsuccessful(String),
    #[error("Paystack returned a successful response without any data")]
    EmptyResponse,
}

impl From<reqwest::Error> for PaystackApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::RestResponseError(e.to_string())
        }
    }
}
