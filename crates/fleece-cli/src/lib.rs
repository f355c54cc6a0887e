//! Core logic behind the `fleece-dump` binary: decode a stored record, with
//! an optional shared-key header, and render it as JSON.

use std::io::Read;

use fleece::{DecodeError, DecodeOptions, FleeceDecoder, SharedKeys};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CliError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to decode shared keys: {0}")]
    SharedKeys(DecodeError),
    #[error("failed to decode record: {0}")]
    Record(DecodeError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// How a record should be decoded and printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DumpOptions {
    /// Tag offset to start from; the root when `None`.
    pub offset: Option<isize>,
    /// Read a pointer at `offset` as 4 bytes.
    pub wide: bool,
    /// Limits passed to the decoder.
    pub decode: DecodeOptions,
    /// Print on a single line instead of pretty-printing.
    pub compact: bool,
}

/// Reads a whole file, or stdin when `path` is `-`.
pub fn read_input(path: &str) -> Result<Vec<u8>, CliError> {
    let io_err = |source| CliError::Io {
        path: path.to_owned(),
        source,
    };
    if path == "-" {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).map_err(io_err)?;
        Ok(buf)
    } else {
        std::fs::read(path).map_err(io_err)
    }
}

/// Decodes `record` (and `header` as its shared-key table, if given) to JSON.
pub fn dump(record: &[u8], header: Option<&[u8]>, options: &DumpOptions) -> Result<String, CliError> {
    let shared_keys = header
        .map(SharedKeys::from_header)
        .transpose()
        .map_err(CliError::SharedKeys)?;
    if let Some(keys) = &shared_keys {
        debug!(count = keys.len(), "loaded shared keys");
    }
    let value = FleeceDecoder::new(record, shared_keys.as_ref().map(SharedKeys::as_slice))
        .with_options(options.decode)
        .decode_at(options.offset, options.wide)
        .map_err(CliError::Record)?;
    info!(kind = value.type_name(), bytes = record.len(), "decoded record");
    let json = Value::from(value);
    let out = if options.compact {
        serde_json::to_string(&json)?
    } else {
        serde_json::to_string_pretty(&json)?
    };
    Ok(out)
}
