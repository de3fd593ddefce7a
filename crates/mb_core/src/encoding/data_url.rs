//! Base64 `data:` URLs.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use thiserror::Error;

use crate::models::DecodedMedia;

const PREFIX: &str = "data:";
const MARKER: &str = ";base64,";

/// Errors from parsing a data URL.
#[derive(Error, Debug)]
pub enum DataUrlError {
    #[error("Invalid data URL: missing 'data:' prefix")]
    MissingPrefix,

    #[error("Invalid data URL: payload is not base64")]
    NotBase64,

    #[error("Invalid data URL: empty MIME type")]
    EmptyMime,

    #[error("Invalid data URL payload: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Result type for data URL operations.
pub type DataUrlResult<T> = Result<T, DataUrlError>;

/// Encode bytes as `data:<mime>;base64,<payload>`.
pub fn to_data_url(mime: &str, bytes: &[u8]) -> String {
    let mut out = String::with_capacity(data_url_len(mime, bytes.len()));
    out.push_str(PREFIX);
    out.push_str(mime);
    out.push_str(MARKER);
    STANDARD.encode_string(bytes, &mut out);
    out
}

/// Length of the data URL [`to_data_url`] would produce, without encoding.
pub fn data_url_len(mime: &str, byte_len: usize) -> usize {
    PREFIX.len() + mime.len() + MARKER.len() + byte_len.div_ceil(3) * 4
}

/// Split a data URL into its MIME type and base64 payload.
///
/// The MIME type runs up to the first `;base64,` marker, so parameters
/// such as `video/webm;codecs=vp8` are kept.
pub fn split_data_url(data_url: &str) -> DataUrlResult<(&str, &str)> {
    let rest = data_url
        .strip_prefix(PREFIX)
        .ok_or(DataUrlError::MissingPrefix)?;
    let (mime, payload) = rest.split_once(MARKER).ok_or(DataUrlError::NotBase64)?;
    if mime.trim().is_empty() {
        return Err(DataUrlError::EmptyMime);
    }
    Ok((mime, payload))
}

/// Decode a data URL into its MIME type and bytes.
pub fn parse_data_url(data_url: &str) -> DataUrlResult<DecodedMedia> {
    let (mime, payload) = split_data_url(data_url)?;
    let bytes = STANDARD.decode(payload.trim())?;
    Ok(DecodedMedia {
        mime: mime.to_string(),
        bytes,
    })
}
