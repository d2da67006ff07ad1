//! Multipart form data handling
//!
//! Each `-F` entry becomes one `multipart/form-data` part. Entries are
//! parsed and their files opened up front, so a bad entry fails before any
//! network I/O. The body itself is produced by a background task writing
//! into a [`pipe`](super::pipe), so file fields are streamed rather than
//! loaded into memory.

use std::io;
use std::path::PathBuf;

use tokio::fs::File;
use tokio::io::AsyncReadExt;
use tracing::{error, trace, warn};

use crate::errors::CurlError;
use crate::uploads::pipe::{pipe, PipeReader, PipeWriter};

/// Read size used when copying a file field into the pipe
const FILE_CHUNK_SIZE: usize = 64 * 1024;

/// Default content type for file-backed or renamed parts
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Content of a single part
#[derive(Debug)]
pub enum FieldSource {
    /// Literal field value
    Text(String),
    /// Opened `@path` file, closed as soon as its bytes are copied
    File { path: PathBuf, file: File },
}

/// One multipart part, parsed from a single `-F` entry
#[derive(Debug)]
pub struct FormField {
    pub name: String,
    pub source: FieldSource,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

/// Backslash-escape `\` and `"` for a quoted Content-Disposition parameter
pub fn escape_quotes(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Split an entry into `key=value` clauses.
///
/// Clauses are separated by `;` and split on their first `=`. Clauses
/// without `=` are logged and skipped.
pub fn parse_clauses(entry: &str) -> Vec<(String, String)> {
    entry
        .split(';')
        .map(str::trim)
        .filter(|clause| !clause.is_empty())
        .filter_map(|clause| match clause.split_once('=') {
            Some((key, value)) => Some((key.trim().to_string(), value.trim().to_string())),
            None => {
                warn!("invalid form entry: {}", clause);
                None
            }
        })
        .collect()
}

impl FormField {
    /// Parse one `name=value[;filename=..][;type=..]` entry.
    ///
    /// A value starting with `@` names a file, which is opened here and used
    /// as the default filename.
    pub async fn parse(entry: &str) -> Result<Self, CurlError> {
        let invalid = || CurlError::InvalidFormEntry(entry.to_string());

        if !entry.contains('=') {
            let err = invalid();
            error!("{}", err);
            return Err(err);
        }

        let mut clauses = parse_clauses(entry).into_iter();
        let (name, value) = clauses.next().ok_or_else(invalid)?;

        let (source, mut filename) = match value.strip_prefix('@') {
            Some(path) => {
                let file = File::open(path).await.map_err(|e| {
                    error!("open file: {} error: {}", path, e);
                    CurlError::file_open(path, e)
                })?;
                let source = FieldSource::File { path: PathBuf::from(path), file };
                (source, Some(path.to_string()))
            }
            None => (FieldSource::Text(value), None),
        };

        let mut content_type = None;
        for (key, value) in clauses {
            match key.as_str() {
                "filename" => filename = Some(value),
                "type" => content_type = Some(value),
                _ => {
                    let err = invalid();
                    error!("{}, unknown attribute: {}", err, key);
                    return Err(err);
                }
            }
        }

        Ok(FormField { name, source, filename, content_type })
    }

    /// The content type written for this part, if any
    pub fn resolved_content_type(&self) -> Option<&str> {
        match (&self.content_type, &self.filename) {
            (Some(ct), _) => Some(ct.as_str()),
            (None, Some(_)) => Some(OCTET_STREAM),
            (None, None) => None,
        }
    }

    /// MIME headers of the part, including the blank line that ends them
    pub fn part_headers(&self) -> String {
        let mut disposition = format!("form-data; name=\"{}\"", escape_quotes(&self.name));
        if let Some(ref filename) = self.filename {
            disposition.push_str(&format!("; filename=\"{}\"", escape_quotes(filename)));
        }
        trace!("set field: {}, Content-Disposition: {}", self.name, disposition);

        let mut headers = format!("Content-Disposition: {}\r\n", disposition);
        if let Some(ct) = self.resolved_content_type() {
            if self.content_type.is_none() {
                warn!(
                    "set field: {}, no Content-Type for file: {}, use {}",
                    self.name,
                    self.filename.as_deref().unwrap_or_default(),
                    OCTET_STREAM
                );
            } else {
                trace!("set field: {}, Content-Type: {}", self.name, ct);
            }
            headers.push_str(&format!("Content-Type: {}\r\n", ct));
        }
        headers.push_str("\r\n");
        headers
    }
}

/// A streamed multipart body and the header describing it
#[derive(Debug)]
pub struct MultipartBody {
    /// `multipart/form-data; boundary=...`
    pub content_type: String,
    pub stream: PipeReader,
}

/// Writes `-F` entries as a `multipart/form-data` body
#[derive(Debug, Clone)]
pub struct FormBodyBuilder {
    boundary: String,
}

impl Default for FormBodyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormBodyBuilder {
    /// Builder with a random 60 hex digit boundary
    pub fn new() -> Self {
        Self::with_boundary(hex::encode(rand::random::<[u8; 30]>()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self { boundary: boundary.into() }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Parse every entry, opening file fields, in command line order
    pub async fn parse_entries(entries: &[String]) -> Result<Vec<FormField>, CurlError> {
        let mut fields = Vec::with_capacity(entries.len());
        for entry in entries {
            fields.push(FormField::parse(entry).await?);
        }
        Ok(fields)
    }

    /// Parse `entries` and start streaming them on a background task
    pub async fn build(self, entries: &[String]) -> Result<MultipartBody, CurlError> {
        let fields = Self::parse_entries(entries).await?;
        let content_type = self.content_type();
        let (writer, stream) = pipe();

        tokio::spawn(async move {
            if let Err(e) = self.write_fields(fields, &writer).await {
                error!("build & write multipart body error: {}", e);
                writer.close_with_error(e).await;
            }
        });

        Ok(MultipartBody { content_type, stream })
    }

    /// Write all parts followed by the closing boundary
    pub async fn write_fields(&self, fields: Vec<FormField>, writer: &PipeWriter) -> io::Result<()> {
        for (index, field) in fields.into_iter().enumerate() {
            let delimiter = if index == 0 {
                format!("--{}\r\n", self.boundary)
            } else {
                format!("\r\n--{}\r\n", self.boundary)
            };
            writer.write(delimiter).await?;
            writer.write(field.part_headers()).await?;

            match field.source {
                FieldSource::Text(value) => writer.write(value).await?,
                FieldSource::File { path, mut file } => {
                    let mut buf = vec![0u8; FILE_CHUNK_SIZE];
                    loop {
                        let n = file.read(&mut buf).await?;
                        if n == 0 {
                            break;
                        }
                        writer.write(bytes::Bytes::copy_from_slice(&buf[..n])).await?;
                    }
                    trace!("copied file field {} from {}", field.name, path.display());
                }
            }
        }
        writer.write(format!("\r\n--{}--\r\n", self.boundary)).await
    }
}
