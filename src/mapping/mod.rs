//! Mapping document parsing.
//!
//! Two wire formats are supported, detected from the header line: the legacy
//! flat `v1` format and the hierarchical `tiny` v2 format. Both deliver their
//! accepted records through a [`MappingSink`], each record exactly once. A
//! parse failure invalidates everything already delivered; callers must
//! discard partial sink state.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use thiserror::Error;

use crate::model::MemberKey;

pub mod resolver;
pub mod v1;
pub mod v2;

#[derive(Debug, Error)]
pub enum MappingError {
    /// The stream ended before a header line could be read: "no document",
    /// as opposed to "bad document".
    #[error("empty mapping stream, no header line")]
    UnexpectedEof,

    /// Structural violation: bad header, wrong column count, unknown escape,
    /// unresolvable namespace name.
    #[error("line {line}: {message}")]
    Format { line: usize, message: String },

    /// Structurally valid but unsupported construct (tiny v2 `v` rows).
    #[error("unsupported mapping construct: {0}")]
    Unsupported(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl MappingError {
    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        MappingError::Format {
            line,
            message: message.into(),
        }
    }
}

/// Four-channel output of a parse. All channels default to no-ops so callers
/// only implement what they consume.
///
/// Class renames are (source name, target name) pairs; member renames carry a
/// [`MemberKey`] in source coordinates; local tables carry a key in renamed
/// (target) coordinates and a slot-indexed sparse name sequence.
pub trait MappingSink {
    fn accept_class(&mut self, _from: &str, _to: &str) {}
    fn accept_field(&mut self, _key: MemberKey, _to: &str) {}
    fn accept_method(&mut self, _key: MemberKey, _to: &str) {}
    fn accept_locals(&mut self, _key: MemberKey, _names: Vec<Option<String>>) {}
}

/// Parses a mapping document from `reader`, translating from namespace `from`
/// to namespace `to` and delivering records to `sink`.
pub fn read<R: BufRead, S: MappingSink>(
    reader: R,
    from: &str,
    to: &str,
    sink: &mut S,
) -> Result<(), MappingError> {
    let mut lines = reader.lines();

    let header = match lines.next() {
        Some(line) => line?,
        None => return Err(MappingError::UnexpectedEof),
    };

    if header.starts_with("v1\t") {
        v1::read(&header, lines, from, to, sink)
    } else if header.starts_with("tiny\t2\t") {
        v2::read(&header, lines, from, to, sink)
    } else {
        Err(MappingError::format(1, "unrecognized mapping header"))
    }
}

/// Like [`read`], sourcing the document from a file path. Files with a `.gz`
/// suffix are decompressed transparently.
pub fn read_path<S: MappingSink>(
    path: &Path,
    from: &str,
    to: &str,
    sink: &mut S,
) -> Result<(), MappingError> {
    let file = File::open(path)?;

    if path.extension().is_some_and(|ext| ext == "gz") {
        read(BufReader::new(GzDecoder::new(file)), from, to, sink)
    } else {
        read(BufReader::new(file), from, to, sink)
    }
}

/// Resolves a requested namespace name to its index, or fails the parse.
pub(crate) fn namespace_index(
    namespaces: &[&str],
    requested: &str,
) -> Result<usize, MappingError> {
    namespaces
        .iter()
        .position(|ns| *ns == requested)
        .ok_or_else(|| {
            MappingError::format(1, format!("could not find namespace '{}'", requested))
        })
}
