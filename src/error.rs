use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by acquisition, persistence and export.
///
/// Every remote-side variant carries the directory operation name and the
/// entity id it was called with, so a failed multi-thousand-call run can be
/// diagnosed from the error alone. Unrecognized classification codes are
/// deliberately *not* represented here: the code tables are total and fall
/// back to their `Unknown`/`None` members.
#[derive(Debug, Error)]
pub enum Error {
    /// The directory service call failed at the transport level.
    #[error("{call} failed for id {entity}: {source}")]
    RemoteCall {
        call: &'static str,
        entity: i64,
        #[source]
        source: reqwest::Error,
    },

    /// The directory service answered with a non-success HTTP status.
    #[error("{call} returned HTTP {status} for id {entity}")]
    RemoteStatus {
        call: &'static str,
        entity: i64,
        status: reqwest::StatusCode,
    },

    /// The response body could not be decoded into the expected shape,
    /// e.g. a record with its identifier missing.
    #[error("{call} returned a malformed response for id {entity}: {source}")]
    MalformedResponse {
        call: &'static str,
        entity: i64,
        #[source]
        source: serde_json::Error,
    },

    /// A database snapshot could not be encoded or decoded.
    #[error("invalid database snapshot at {path}: {source}")]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing a file failed. In-memory state is unaffected and
    /// no partially written output is left behind.
    #[error("failed to read or write {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file did not parse as the expected TOML shape.
    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The playlist document could not be rendered.
    #[error("failed to render playlist XML: {0}")]
    Xml(#[from] quick_xml::Error),
}
