//! The user-facing JSON web server. One inference route, one health route,
//! and the application state they share.

use crate::config::Settings;
use crate::preprocess::{self, InvalidImage, Preprocessor};
use crate::torch::{self, LazyModel, Prediction};
use actix_multipart::MultipartError;
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};
use protocol::ErrorDetail;
use thiserror::Error;
use tracing::*;

pub mod protocol;
pub mod routes;
pub mod source;

/// Everything that can go wrong while serving a prediction
#[derive(Debug, Error)]
pub enum PredictError {
    /// The request did not carry a decodable image
    #[error("invalid image file")]
    InvalidImage,

    /// Model loading or inference failed after the image was accepted
    #[error("inference failed: {0:#}")]
    Model(#[from] anyhow::Error),
}

impl From<InvalidImage> for PredictError {
    fn from(err: InvalidImage) -> Self {
        debug!("rejecting request: {err}");
        PredictError::InvalidImage
    }
}

impl From<MultipartError> for PredictError {
    fn from(err: MultipartError) -> Self {
        debug!("rejecting malformed multipart request: {err}");
        PredictError::InvalidImage
    }
}

impl actix_web::error::ResponseError for PredictError {
    fn error_response(&self) -> HttpResponse {
        let detail = match self {
            PredictError::InvalidImage => ErrorDetail::INVALID_IMAGE,
            PredictError::Model(_) => ErrorDetail::INTERNAL,
        };
        HttpResponse::build(self.status_code()).json(detail)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            PredictError::InvalidImage => StatusCode::BAD_REQUEST,
            PredictError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// State shared by every worker
#[derive(Debug)]
pub struct AppState {
    pub model: LazyModel,
    pub preprocessor: Preprocessor,
}

impl AppState {
    pub fn new(model: LazyModel, preprocessor: Preprocessor) -> Self {
        AppState {
            model,
            preprocessor,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            LazyModel::torchscript(&settings.model),
            Preprocessor::from(&settings.preprocess),
        )
    }

    /// Decode, preprocess and classify an encoded image. CPU-bound, run it
    /// off the async workers
    pub fn predict(&self, image: &[u8]) -> Result<Prediction, PredictError> {
        let image = preprocess::decode(image)?;
        let input = self.preprocessor.to_tensor(&image);
        let model = self.model.get()?;
        Ok(torch::predict(model, &input)?)
    }
}

/// Register the routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::health).service(routes::predict);
}
