//! Response messages and the writer that frames them.

use std::collections::BTreeMap;
use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Target stream for diagnostic output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamTarget {
    /// Standard error stream.
    Stderr,
}

/// Messages sent from a serving surface back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ServiceMessage {
    /// Diagnostic text for the caller.
    Stream {
        /// Target stream on the client side.
        stream: StreamTarget,
        /// Text payload.
        data: String,
    },
    /// Result body of a successful call.
    Reply {
        /// Method-specific payload.
        body: Value,
    },
    /// Terminal message carrying the call's status.
    Exit {
        /// `0` on success.
        status: i32,
        /// Classification of a rejected request.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<Fault>,
    },
}

/// Machine-readable description of a rejected request.
///
/// `code` names the error class, for example `not-found`; `fields` carries
/// the values needed to rebuild the error on the calling side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fault {
    /// Stable error class.
    pub code: String,
    /// Class-specific values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, String>,
}

impl Fault {
    /// Creates a fault with no fields.
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds one field.
    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.insert(key.to_owned(), value.into());
        self
    }

    /// Looks up a field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }
}

impl ServiceMessage {
    /// Creates a stderr stream message.
    pub fn stderr(data: impl Into<String>) -> Self {
        Self::Stream {
            stream: StreamTarget::Stderr,
            data: data.into(),
        }
    }
}

/// Serialises [`ServiceMessage`]s as JSONL lines.
pub struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    /// Wraps an output stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one message followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub fn write_message(&mut self, message: &ServiceMessage) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, message)?;
        self.writer.write_all(b"\n")
    }

    /// Writes diagnostic text to the caller's stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_stderr(&mut self, data: impl Into<String>) -> io::Result<()> {
        self.write_message(&ServiceMessage::stderr(data))
    }

    /// Writes a reply body.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_reply(&mut self, body: Value) -> io::Result<()> {
        self.write_message(&ServiceMessage::Reply { body })
    }

    /// Writes the terminal exit message and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if writing or flushing fails.
    pub fn write_exit(&mut self, status: i32) -> io::Result<()> {
        self.finish(status, None)
    }

    /// Writes an error description followed by an exit with `status`.
    ///
    /// `fault`, when present, rides on the exit message so the caller can
    /// tell error classes apart without parsing the text.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_failure(
        &mut self,
        message: &str,
        status: i32,
        fault: Option<Fault>,
    ) -> io::Result<()> {
        self.write_stderr(format!("error: {message}\n"))?;
        self.finish(status, fault)
    }

    fn finish(&mut self, status: i32, error: Option<Fault>) -> io::Result<()> {
        self.write_message(&ServiceMessage::Exit { status, error })?;
        self.writer.flush()
    }
}
