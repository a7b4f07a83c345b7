//! Where the image bytes of a `/predict` request come from

use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::error::PayloadError;
use actix_web::http::header::HeaderMap;
use actix_web::mime;
use actix_web::web::{Bytes, BytesMut};
use actix_web::{HttpMessage, HttpRequest};
use futures_util::{future, stream, TryStreamExt};

/// Name of the form field an upload is expected under
pub const FILE_FIELD: &str = "file";

/// The image bytes of a request: a multipart upload (browser forms, API
/// explorers) or the whole raw body (webhook relays posting
/// `application/octet-stream`)
#[derive(Debug, Clone, PartialEq)]
pub enum ImageSource {
    Upload(Bytes),
    RawBody(Bytes),
}

impl ImageSource {
    /// Pick the source for a request. An uploaded part wins over the raw
    /// body; a multipart request without one falls back to the raw body
    pub async fn resolve(req: &HttpRequest, body: Bytes) -> Result<Self, MultipartError> {
        if !is_multipart(req) {
            return Ok(ImageSource::RawBody(body));
        }

        match read_file_part(req.headers(), body.clone()).await? {
            Some(upload) => Ok(ImageSource::Upload(upload)),
            None => Ok(ImageSource::RawBody(body)),
        }
    }

    pub fn bytes(&self) -> &Bytes {
        match self {
            ImageSource::Upload(bytes) | ImageSource::RawBody(bytes) => bytes,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ImageSource::Upload(_) => "upload",
            ImageSource::RawBody(_) => "raw body",
        }
    }
}

fn is_multipart(req: &HttpRequest) -> bool {
    match req.mime_type() {
        Ok(Some(ct)) => ct.type_() == mime::MULTIPART && ct.subtype() == mime::FORM_DATA,
        _ => false,
    }
}

/// Parse an already buffered multipart body and return the upload: the part
/// named `FILE_FIELD`, or failing that the first part carrying a filename
async fn read_file_part(headers: &HeaderMap, body: Bytes) -> Result<Option<Bytes>, MultipartError> {
    let payload = stream::once(future::ready(Ok::<_, PayloadError>(body)));
    let mut multipart = Multipart::new(headers, payload);
    let mut first_attachment = None;

    while let Some(mut field) = multipart.try_next().await? {
        let disposition = field.content_disposition();
        if disposition.get_name() == Some(FILE_FIELD) {
            return Ok(Some(read_field(&mut field).await?));
        }
        if first_attachment.is_none() && disposition.get_filename().is_some() {
            first_attachment = Some(read_field(&mut field).await?);
        }
    }

    Ok(first_attachment)
}

async fn read_field(field: &mut Field) -> Result<Bytes, MultipartError> {
    let mut data = BytesMut::new();
    while let Some(chunk) = field.try_next().await? {
        data.extend_from_slice(&chunk);
    }
    Ok(data.freeze())
}
