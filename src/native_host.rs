//! Native messaging host.
//!
//! The browser talks to the host over stdin/stdout. Every message in either
//! direction is a 4-byte length in native byte order followed by that many
//! bytes of UTF-8 JSON. Requests carry an `action`; every response carries
//! `success` plus either the action's result fields or an `error` string.

use std::io::{ErrorKind, Read, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::settings::SettingsStore;
use crate::vault::{Destination, GraphFolder, Position, SaveReceipt, SaveTarget, JOURNALS_FOLDER};

/// Largest request accepted from the browser.
pub const MAX_REQUEST_SIZE: usize = 64 * 1024 * 1024;

/// Largest response the browser accepts from a host.
pub const MAX_RESPONSE_SIZE: usize = 1024 * 1024;

/// Read one frame. `Ok(None)` means the browser closed the stream cleanly.
///
/// # Errors
///
/// [`Error::Protocol`] for a truncated or oversized frame, [`Error::Io`] for
/// stream failures.
pub fn read_message<R: Read>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    let mut len_buf = [0u8; 4];
    let mut filled = 0;
    while filled < len_buf.len() {
        match reader.read(&mut len_buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(None),
            Ok(0) => return Err(Error::Protocol("truncated length prefix".to_string())),
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }

    let len = u32::from_ne_bytes(len_buf) as usize;
    if len > MAX_REQUEST_SIZE {
        return Err(Error::Protocol(format!("message too large: {len} bytes")));
    }

    let mut buf = vec![0u8; len];
    reader.read_exact(&mut buf).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => Error::Protocol(format!("truncated message, expected {len} bytes")),
        _ => e.into(),
    })?;
    Ok(Some(buf))
}

/// Write one frame and flush.
///
/// # Errors
///
/// [`Error::Protocol`] if `data` exceeds [`MAX_RESPONSE_SIZE`].
pub fn write_message<W: Write>(writer: &mut W, data: &[u8]) -> Result<()> {
    if data.len() > MAX_RESPONSE_SIZE {
        return Err(Error::Protocol(format!("response too large: {} bytes", data.len())));
    }
    let len = u32::try_from(data.len()).map_err(|_| Error::Protocol("response too large".to_string()))?;
    writer.write_all(&len.to_ne_bytes())?;
    writer.write_all(data)?;
    writer.flush()?;
    Ok(())
}

/// A request from the browser.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Write clip text into the graph.
    Save {
        #[serde(default)]
        folder: Option<String>,
        #[serde(default)]
        filename: Option<String>,
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        position: Position,
    },
    /// Names of existing pages.
    ListPages,
    GetConfig,
    /// Set one key in the settings file.
    SetConfig { key: String, value: Value },
    Ping,
}

const ACTIONS: &[&str] = &["save", "listPages", "getConfig", "setConfig", "ping"];

/// Reply to a [`Request`]. Absent fields are omitted from the JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl Response {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }
}

/// Request handler bound to a settings file.
#[derive(Debug, Clone)]
pub struct NativeHost {
    settings: SettingsStore,
}

impl NativeHost {
    #[must_use]
    pub fn new(settings: SettingsStore) -> Self {
        Self { settings }
    }

    fn graph_path(&self) -> Result<PathBuf> {
        Ok(self.settings.load()?.resolved_graph_path())
    }

    /// Answer one decoded request. Failures become `success: false`.
    #[must_use]
    pub fn handle(&self, request: Request) -> Response {
        self.try_handle(request).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "request failed");
            Response::failure(e.to_string())
        })
    }

    fn try_handle(&self, request: Request) -> Result<Response> {
        let graph_path = self.graph_path()?;
        let response = match request {
            Request::Save {
                folder,
                filename,
                content,
                position,
            } => {
                let (Some(filename), Some(content)) = (
                    filename.filter(|f| !f.is_empty()),
                    content.filter(|c| !c.is_empty()),
                ) else {
                    return Ok(Response::failure("Missing filename or content"));
                };
                let target = SaveTarget {
                    folder: folder.unwrap_or_else(|| JOURNALS_FOLDER.to_string()),
                    filename,
                    position,
                };
                let path = match GraphFolder::new(&graph_path).save(&target, &content)? {
                    SaveReceipt::Written(path) => path.display().to_string(),
                    SaveReceipt::Link(link) => link,
                };
                Response {
                    path: Some(path),
                    ..Response::ok()
                }
            }
            Request::ListPages => Response {
                pages: Some(GraphFolder::new(&graph_path).list_pages()?),
                ..Response::ok()
            },
            Request::GetConfig => Response {
                graph_path: Some(graph_path.display().to_string()),
                config: Some(Value::Object(serde_json::Map::new())),
                ..Response::ok()
            },
            Request::SetConfig { key, value } => {
                self.settings.set_key(&key, value)?;
                Response::ok()
            }
            Request::Ping => Response {
                message: Some("pong".to_string()),
                graph_path: Some(graph_path.display().to_string()),
                ..Response::ok()
            },
        };
        Ok(response)
    }

    /// Answer one raw JSON message.
    #[must_use]
    pub fn handle_json(&self, message: &[u8]) -> Response {
        let value: Value = match serde_json::from_slice(message) {
            Ok(value) => value,
            Err(e) => return Response::failure(format!("Invalid message: {e}")),
        };
        let action = value.get("action").and_then(Value::as_str).unwrap_or_default().to_owned();
        if !ACTIONS.contains(&action.as_str()) {
            return Response::failure(format!("Unknown action: {action}"));
        }
        match serde_json::from_value::<Request>(value) {
            Ok(request) => {
                tracing::debug!(action = action.as_str(), "request");
                self.handle(request)
            }
            Err(e) => Response::failure(format!("Invalid {action} request: {e}")),
        }
    }

    /// Serve frames from `reader` until it closes.
    ///
    /// # Errors
    ///
    /// Framing and stream errors end the loop; request failures do not.
    pub fn run<R: Read, W: Write>(&self, reader: &mut R, writer: &mut W) -> Result<()> {
        while let Some(message) = read_message(reader)? {
            let response = self.handle_json(&message);
            write_message(writer, &serde_json::to_vec(&response)?)?;
        }
        tracing::debug!("input closed, host exiting");
        Ok(())
    }
}
