//! Server protocol: typed calls over a pluggable [`Transport`].

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    config::Endpoints,
    domain::{MoveIntent, TaskId, TaskMeta},
};

pub mod http;
pub mod scripted;

pub type SyncResult<T> = std::result::Result<T, SyncError>;

/// Why a server call failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The request never produced a response
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-2xx status
    #[error("server answered HTTP {status}")]
    Http { status: u16 },

    /// The server answered 2xx but refused the change
    #[error("server rejected the change")]
    Rejected,

    /// The server answered 2xx with a body that could not be read
    #[error("unreadable response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// One field of a multipart upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Empty,
    Json(serde_json::Value),
    /// `application/x-www-form-urlencoded` fields
    Form(Vec<(String, String)>),
    Multipart(Vec<FormPart>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub method: Method,
    /// Path relative to the server origin, or an absolute URL
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Body,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            headers: Vec::new(),
            body: Body::Empty,
        }
    }

    pub fn post(path: impl Into<String>, body: Body) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Any 2xx, including 204 No Content
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn require_success(self) -> SyncResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SyncError::Http {
                status: self.status,
            })
        }
    }
}

/// Carries requests to the task server.
///
/// The board runs on a single UI thread, so implementations need not be `Send`.
#[async_trait(?Send)]
pub trait Transport {
    /// Sends one request and returns the server's answer, whatever its status
    async fn send(&self, request: Request) -> SyncResult<Response>;
}

/// Body of a `/update_status` answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct StatusAck {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
}

/// Typed client for the task server endpoints
#[derive(Debug, Clone)]
pub struct SyncClient<T> {
    transport: T,
    endpoints: Endpoints,
}

impl<T: Transport> SyncClient<T> {
    pub fn new(transport: T, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Persists a drag-and-drop move.
    ///
    /// Success needs both a 2xx status and `"ok": true` in the JSON body.
    pub async fn commit_move(&self, intent: &MoveIntent) -> SyncResult<StatusAck> {
        let body = serde_json::to_value(intent)
            .map_err(|e| SyncError::InvalidRequest(e.to_string()))?;
        let request = Request::post(self.endpoints.update_status.clone(), Body::Json(body));

        let response = self.transport.send(request).await?.require_success()?;
        let ack: StatusAck =
            serde_json::from_str(&response.body).map_err(|e| SyncError::Decode(e.to_string()))?;
        if !ack.ok {
            warn!(
                task = %intent.task_id,
                reason = ack.error.as_deref().unwrap_or("unspecified"),
                "status update rejected"
            );
            return Err(SyncError::Rejected);
        }

        info!(
            task = %intent.task_id,
            status = %intent.new_status,
            position = intent.new_position,
            "move committed"
        );
        Ok(ack)
    }

    /// Fetches the detail view fragment for a task
    pub async fn fetch_detail(&self, id: TaskId) -> SyncResult<String> {
        let request = Request::get(self.endpoints.task_detail(id));
        let response = self.transport.send(request).await?.require_success()?;
        debug!(task = %id, bytes = response.body.len(), "fetched task detail");
        Ok(response.body)
    }

    pub async fn save_meta(&self, id: TaskId, meta: &TaskMeta) -> SyncResult<()> {
        let request = Request::post(self.endpoints.task_update(id), Body::Form(meta.to_form()));
        self.transport.send(request).await?.require_success()?;
        info!(task = %id, "task metadata saved");
        Ok(())
    }

    pub async fn delete_task(&self, id: TaskId) -> SyncResult<()> {
        let request = Request::post(self.endpoints.task_delete(id), Body::Empty);
        self.transport.send(request).await?.require_success()?;
        info!(task = %id, "task deleted");
        Ok(())
    }

    /// Uploads files to an attachment form's action URL.
    ///
    /// The `X-Requested-With: fetch` header lets the server answer 204
    /// instead of redirecting.
    pub async fn upload_attachments(&self, action: &str, parts: Vec<FormPart>) -> SyncResult<()> {
        let files = parts
            .iter()
            .filter(|p| matches!(p, FormPart::File { .. }))
            .count();
        let request = Request::post(action, Body::Multipart(parts))
            .with_header("X-Requested-With", "fetch");
        self.transport.send(request).await?.require_success()?;
        info!(action, files, "attachments uploaded");
        Ok(())
    }
}
