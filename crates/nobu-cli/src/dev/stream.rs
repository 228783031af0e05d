//! Conversions between response body streams and text.
//!
//! Transforming stages need a whole file as a string; everything else
//! passes the body through untouched as a stream.

use crate::dev::error::ReadError;
use axum::BoxError;
use axum::body::{Body, Bytes};
use std::convert::Infallible;
use tokio_stream::{Stream, StreamExt};

/// Drains `stream` and decodes the concatenated chunks as UTF-8.
///
/// Chunk boundaries may split a multi-byte character; decoding happens once
/// at the end. An error from the stream is returned as-is.
pub async fn to_text<S, E>(stream: S) -> Result<String, ReadError>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    tokio::pin!(stream);

    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| ReadError::Stream(e.into()))?;
        buffer.extend_from_slice(&chunk);
    }

    Ok(String::from_utf8(buffer)?)
}

/// A stream that yields `text` as a single chunk and ends.
pub fn into_stream(text: String) -> impl Stream<Item = Result<Bytes, Infallible>> + Send + 'static {
    tokio_stream::once(Ok(Bytes::from(text)))
}

/// Reads a response body to text.
pub async fn body_to_text(body: Body) -> Result<String, ReadError> {
    to_text(body.into_data_stream()).await
}

/// Wraps text as a streaming response body.
pub fn text_to_body(text: String) -> Body {
    Body::from_stream(into_stream(text))
}
