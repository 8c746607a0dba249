//! Network collaborators
//!
//! Nothing in the parsers or generators calls into this module. It gives
//! callers a latency probe for decoded nodes and a way to fetch subscription
//! bodies before handing them to [`crate::explode_sub`].

mod dns;
mod http;
mod ping;

use std::path::PathBuf;

use thiserror::Error;

pub use http::{download_file, get_raw_data, HttpOptions, DEFAULT_TIMEOUT_MS};
pub use ping::{ping, PING_FAILED};

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("cannot build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("cannot get url {url}: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("bad http status {status} from {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("cannot write file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
