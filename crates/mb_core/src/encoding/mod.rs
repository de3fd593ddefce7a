//! Conversion of raw media into embeddable text.
//!
//! - `data_url`: base64 `data:` URL encoding and decoding
//! - `timed`: the timeout-bounded encoder used by the ingestion pipeline

mod data_url;
mod timed;

pub use data_url::{
    data_url_len, parse_data_url, split_data_url, to_data_url, DataUrlError, DataUrlResult,
};
pub use timed::{encode, EncodeError, EncodeResult, TimedEncoder};
