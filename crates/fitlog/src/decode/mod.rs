//! Recording decoders
//!
//! A decoder turns one file into a [`DecodedFile`]: the messages it holds,
//! grouped by kind. Ingestion only asks for `session`, `lap` and `record`
//! messages; anything else a decoder yields is ignored.

mod json;

#[cfg(feature = "fit")]
mod fit;

use std::collections::BTreeMap;
use std::path::Path;

use crate::error::Result;
use crate::models::Message;

pub use json::JsonDecoder;

#[cfg(feature = "fit")]
pub use fit::FitDecoder;

/// Per-activity summary message
pub const SESSION: &str = "session";
/// Lap split message
pub const LAP: &str = "lap";
/// Time-series sample message
pub const RECORD: &str = "record";

/// Messages decoded from one file, in file order within each kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodedFile {
    messages: BTreeMap<String, Vec<Message>>,
}

impl DecodedFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: impl Into<String>, message: Message) {
        self.messages.entry(kind.into()).or_default().push(message);
    }

    /// All messages of a kind; empty if the file had none
    pub fn messages(&self, kind: &str) -> &[Message] {
        self.messages.get(kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn first(&self, kind: &str) -> Option<&Message> {
        self.messages(kind).first()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }
}

/// Something that can read a recording file
pub trait Decoder {
    fn decode(&self, path: &Path) -> Result<DecodedFile>;
}

/// Picks a decoder from the file extension.
///
/// `.fit` files go to the binary decoder when the `fit` feature is enabled;
/// everything else is read as a JSON message dump.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoDecoder;

impl Decoder for AutoDecoder {
    fn decode(&self, path: &Path) -> Result<DecodedFile> {
        let is_fit = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("fit"));

        if is_fit {
            decode_fit(path)
        } else {
            JsonDecoder.decode(path)
        }
    }
}

#[cfg(feature = "fit")]
fn decode_fit(path: &Path) -> Result<DecodedFile> {
    FitDecoder.decode(path)
}

#[cfg(not(feature = "fit"))]
fn decode_fit(path: &Path) -> Result<DecodedFile> {
    Err(crate::error::FitlogError::decode(
        path.display().to_string(),
        "binary .fit support not compiled in (enable the `fit` feature)",
    ))
}
