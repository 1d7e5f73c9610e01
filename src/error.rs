use thiserror::Error;

/// Errors that can occur when converting a custom editor format into a canonical `Graph`.
///
/// Note that compilation itself is total: once a `Graph` value exists, `compile`
/// always produces a program. Only the conversion edge can fail, and only on
/// input that is not a graph at all (e.g. unparseable JSON).
#[derive(Error, Debug, Clone)]
pub enum GraphConversionError {
    #[error("Failed to parse flow JSON: {0}")]
    JsonParseError(String),

    #[error("Invalid flow data: {0}")]
    ValidationError(String),
}

/// Errors produced by the callback payload codec.
///
/// Encoding during compilation never surfaces these (collisions are resolved by
/// deterministic disambiguation and reported as diagnostics); decoding a payload
/// string, as the tests and external tooling do, can fail on malformed input.
#[derive(Error, Debug, Clone)]
pub enum CodecError {
    #[error("Malformed callback payload '{0}'")]
    Malformed(String),

    #[error(
        "Permission flags '{first}' and '{second}' collide after truncation to {prefix_len} characters"
    )]
    PrefixCollision {
        first: String,
        second: String,
        prefix_len: usize,
    },

    #[error("Callback payload '{payload}' is {len} bytes, exceeding the {limit}-byte limit")]
    PayloadTooLong {
        payload: String,
        len: usize,
        limit: usize,
    },
}

/// Errors that can occur when persisting or loading a compiled artifact.
#[derive(Error, Debug, Clone)]
pub enum ArtifactError {
    #[error("{0}")]
    Generic(String),
}
