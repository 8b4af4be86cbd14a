use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use chq_query::{NotExist, ValidationError};


pub enum ApiError {
    NotFound,
    UserError(String),
    Internal(anyhow::Error)
}


impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => {
                (
                    StatusCode::NOT_FOUND,
                    "no data for the given filter".to_string()
                ).into_response()
            },
            ApiError::UserError(msg) => {
                (
                    StatusCode::BAD_REQUEST,
                    msg
                ).into_response()
            },
            ApiError::Internal(err) => {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("{:?}", err)
                ).into_response()
            }
        }
    }
}


impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        let err = err.into();
        if err.chain().any(|cause| cause.is::<NotExist>()) {
            return ApiError::NotFound
        }
        if let Some(validation) = err.chain().find_map(|cause| cause.downcast_ref::<ValidationError>()) {
            return ApiError::UserError(validation.to_string())
        }
        ApiError::Internal(err)
    }
}
