use async_trait::async_trait;
use reqwest::{
    multipart::{Form, Part},
    Client, Url,
};
use tracing::trace;

use crate::{
    config::ClientConfig,
    sync::{Body, FormPart, Method, Request, Response, SyncError, SyncResult, Transport},
};

/// [`Transport`] backed by `reqwest`. In the browser this rides on `fetch`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
}

impl HttpTransport {
    /// Creates a transport resolving request paths against `base_url`
    pub fn new(base_url: &str) -> SyncResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| SyncError::InvalidRequest(format!("invalid base url {base_url:?}: {e}")))?;
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    pub fn from_config(config: &ClientConfig) -> SyncResult<Self> {
        let base_url = config
            .base_url
            .as_deref()
            .ok_or_else(|| SyncError::InvalidRequest("no base url configured".to_string()))?;
        Self::new(base_url)
    }

    /// Resolves a request path; absolute URLs are kept as they are
    pub fn resolve(&self, path: &str) -> SyncResult<Url> {
        self.base
            .join(path)
            .map_err(|e| SyncError::InvalidRequest(format!("invalid path {path:?}: {e}")))
    }
}

#[async_trait(?Send)]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> SyncResult<Response> {
        let url = self.resolve(&request.path)?;
        trace!(method = ?request.method, %url, "sending request");

        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Form(fields) => builder.form(&fields),
            Body::Multipart(parts) => builder.multipart(multipart_form(parts)?),
        };

        let response = builder
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(Response { status, body })
    }
}

fn multipart_form(parts: Vec<FormPart>) -> SyncResult<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let mut file = Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = mime {
                    file = file
                        .mime_str(&mime)
                        .map_err(|e| SyncError::InvalidRequest(format!("bad mime {mime:?}: {e}")))?;
                }
                form.part(name, file)
            }
        };
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_relative_base() {
        assert!(matches!(
            HttpTransport::new("/not/absolute"),
            Err(SyncError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_from_config_requires_base_url() {
        assert!(HttpTransport::from_config(&ClientConfig::default()).is_err());

        let config = ClientConfig::default().with_base_url("http://127.0.0.1:5000");
        assert!(HttpTransport::from_config(&config).is_ok());
    }

    #[test]
    fn test_resolves_paths_against_origin() {
        let transport = HttpTransport::new("http://localhost:5000/board/").unwrap();

        assert_eq!(
            transport.resolve("/update_status").unwrap().as_str(),
            "http://localhost:5000/update_status"
        );
        assert_eq!(
            transport
                .resolve("http://localhost:5000/tasks/7/attachments")
                .unwrap()
                .as_str(),
            "http://localhost:5000/tasks/7/attachments"
        );
    }

    #[test]
    fn test_multipart_rejects_bad_mime() {
        let parts = vec![FormPart::File {
            name: "files".to_string(),
            file_name: "a.bin".to_string(),
            mime: Some("not a mime".to_string()),
            bytes: vec![1, 2, 3],
        }];
        assert!(multipart_form(parts).is_err());
    }
}
