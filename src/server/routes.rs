use super::protocol::{Health, PredictResponse};
use super::source::ImageSource;
use super::{AppState, PredictError};
use actix_web::{get, post, web, HttpRequest, Responder};
use anyhow::anyhow;
use tracing::*;

type Result<T> = std::result::Result<T, PredictError>;

/// Liveness check, never touches the model
#[get("/")]
pub async fn health() -> impl Responder {
    web::Json(Health::OK)
}

/// Classify a face photo sent as a multipart upload or as the raw body
#[post("/predict")]
pub async fn predict(
    req: HttpRequest,
    body: web::Bytes,
    state: web::Data<AppState>,
) -> Result<impl Responder> {
    let source = ImageSource::resolve(&req, body).await?;
    debug!("got {} image of {} bytes", source.kind(), source.bytes().len());

    let prediction = web::block(move || state.predict(source.bytes()))
        .await
        .map_err(|e| {
            error!("inference task failed: {e}");
            anyhow!("inference task failed: {e}")
        })?
        .map_err(|e| {
            if let PredictError::Model(ref err) = e {
                error!("prediction failed: {err:#}");
            }
            e
        })?;

    info!(
        "predicted {} with confidence {:.4}",
        prediction.class.name(),
        prediction.confidence
    );

    Ok(web::Json(PredictResponse::from(prediction)))
}
