//! Client configuration.
//!
//! Every field has a default matching the board templates served by the
//! task server, so an empty JSON object is a complete configuration.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    domain::TaskId,
    error::{BoardError, Result},
};

/// Server endpoints. `{id}` is replaced by the task id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub update_status: String,
    pub task_detail: String,
    pub task_update: String,
    pub task_delete: String,
    pub task_attachments: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            update_status: "/update_status".to_string(),
            task_detail: "/tasks/{id}".to_string(),
            task_update: "/tasks/{id}/update".to_string(),
            task_delete: "/tasks/{id}/delete".to_string(),
            task_attachments: "/tasks/{id}/attachments".to_string(),
        }
    }
}

impl Endpoints {
    pub fn task_detail(&self, id: TaskId) -> String {
        fill(&self.task_detail, id)
    }

    pub fn task_update(&self, id: TaskId) -> String {
        fill(&self.task_update, id)
    }

    pub fn task_delete(&self, id: TaskId) -> String {
        fill(&self.task_delete, id)
    }

    pub fn task_attachments(&self, id: TaskId) -> String {
        fill(&self.task_attachments, id)
    }

    /// Reads the task id back out of an upload URL built from
    /// `task_attachments`. Absolute URLs match on their path.
    pub fn attachment_task_id(&self, action: &str) -> Option<TaskId> {
        let pattern = regex::escape(&self.task_attachments).replace(r"\{id\}", r"(\d+)");
        let re = Regex::new(&pattern).ok()?;
        re.captures(action)?.get(1)?.as_str().parse().ok()
    }

    fn templated(&self) -> [(&'static str, &str); 4] {
        [
            ("task_detail", self.task_detail.as_str()),
            ("task_update", self.task_update.as_str()),
            ("task_delete", self.task_delete.as_str()),
            ("task_attachments", self.task_attachments.as_str()),
        ]
    }

    fn all(&self) -> [(&'static str, &str); 5] {
        [
            ("update_status", self.update_status.as_str()),
            ("task_detail", self.task_detail.as_str()),
            ("task_update", self.task_update.as_str()),
            ("task_delete", self.task_delete.as_str()),
            ("task_attachments", self.task_attachments.as_str()),
        ]
    }
}

fn fill(template: &str, id: TaskId) -> String {
    template.replace("{id}", &id.to_string())
}

/// CSS selectors used to find things in the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub card: String,
    pub dropzone: String,
    pub detail_modal: String,
    pub detail_content: String,
    pub close_button: String,
    pub attach_form: String,
    pub meta_form: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            card: ".card.task".to_string(),
            dropzone: ".dropzone".to_string(),
            detail_modal: "#taskDetailModal".to_string(),
            detail_content: "#taskDetailContent".to_string(),
            close_button: "[data-close]".to_string(),
            attach_form: ".attach-form".to_string(),
            meta_form: "#taskMetaForm".to_string(),
        }
    }
}

/// Data attributes and CSS classes the board relies on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Markup {
    pub task_id_attr: String,
    pub status_attr: String,
    pub dragging_class: String,
    pub drop_target_class: String,
    pub hidden_class: String,
}

impl Default for Markup {
    fn default() -> Self {
        Self {
            task_id_attr: "data-task-id".to_string(),
            status_attr: "data-status".to_string(),
            dragging_class: "dragging".to_string(),
            drop_target_class: "over".to_string(),
            hidden_class: "hidden".to_string(),
        }
    }
}

/// User-facing notification texts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub move_failed: String,
    pub save_failed: String,
    pub delete_failed: String,
    pub delete_confirm: String,
    pub upload_failed: String,
    pub detail_failed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            move_failed: "Failed to update status".to_string(),
            save_failed: "Failed to save changes".to_string(),
            delete_failed: "Failed to delete task".to_string(),
            delete_confirm: "Delete this task? This cannot be undone.".to_string(),
            upload_failed: "Upload failed".to_string(),
            detail_failed: "Failed to load task".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin requests are sent to; the browser shell fills in the page origin
    pub base_url: Option<String>,
    pub endpoints: Endpoints,
    pub selectors: Selectors,
    pub markup: Markup,
    pub messages: Messages,
}

impl ClientConfig {
    /// Parses and validates a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        for (name, path) in self.endpoints.all() {
            if !path.starts_with('/') {
                return Err(BoardError::ConfigError(format!(
                    "endpoint {name} must start with '/': {path:?}"
                )));
            }
        }
        for (name, path) in self.endpoints.templated() {
            if !path.contains("{id}") {
                return Err(BoardError::ConfigError(format!(
                    "endpoint {name} must contain {{id}}: {path:?}"
                )));
            }
        }

        let s = &self.selectors;
        let m = &self.markup;
        let required = [
            ("selectors.card", &s.card),
            ("selectors.dropzone", &s.dropzone),
            ("selectors.detail_modal", &s.detail_modal),
            ("selectors.detail_content", &s.detail_content),
            ("selectors.close_button", &s.close_button),
            ("selectors.attach_form", &s.attach_form),
            ("selectors.meta_form", &s.meta_form),
            ("markup.task_id_attr", &m.task_id_attr),
            ("markup.status_attr", &m.status_attr),
            ("markup.dragging_class", &m.dragging_class),
            ("markup.drop_target_class", &m.drop_target_class),
            ("markup.hidden_class", &m.hidden_class),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(BoardError::ConfigError(format!("{name} must not be empty")));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_json_gives_defaults() {
        let config = ClientConfig::from_json("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = ClientConfig::from_json(
            r#"{"markup": {"drop_target_class": "is-over"}, "messages": {"move_failed": "Nope"}}"#,
        )
        .unwrap();

        assert_eq!(config.markup.drop_target_class, "is-over");
        assert_eq!(config.markup.dragging_class, "dragging");
        assert_eq!(config.messages.move_failed, "Nope");
        assert_eq!(config.messages.upload_failed, "Upload failed");
    }

    #[test]
    fn test_endpoint_templates() {
        let endpoints = Endpoints::default();
        let id = TaskId::new(7);

        assert_eq!(endpoints.task_detail(id), "/tasks/7");
        assert_eq!(endpoints.task_update(id), "/tasks/7/update");
        assert_eq!(endpoints.task_delete(id), "/tasks/7/delete");
        assert_eq!(endpoints.task_attachments(id), "/tasks/7/attachments");
    }

    #[test]
    fn test_attachment_task_id_follows_template() {
        let endpoints = Endpoints::default();
        assert_eq!(
            endpoints.attachment_task_id("/tasks/7/attachments"),
            Some(TaskId::new(7))
        );
        assert_eq!(
            endpoints.attachment_task_id("http://localhost:5000/tasks/42/attachments"),
            Some(TaskId::new(42))
        );
        assert_eq!(endpoints.attachment_task_id("/upload"), None);
        assert_eq!(endpoints.attachment_task_id("/tasks/x/attachments"), None);

        let custom = ClientConfig::from_json(
            r#"{"endpoints": {"task_attachments": "/api/tasks/{id}/files.json"}}"#,
        )
        .unwrap()
        .endpoints;
        let action = custom.task_attachments(TaskId::new(9));
        assert_eq!(custom.attachment_task_id(&action), Some(TaskId::new(9)));
        assert_eq!(custom.attachment_task_id("/tasks/9/attachments"), None);
        // the dot is literal, not a wildcard
        assert_eq!(custom.attachment_task_id("/api/tasks/9/filesXjson"), None);
    }

    #[test]
    fn test_template_without_id_rejected() {
        let err = ClientConfig::from_json(r#"{"endpoints": {"task_detail": "/tasks"}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("task_detail"));
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let err = ClientConfig::from_json(r#"{"endpoints": {"update_status": "update_status"}}"#)
            .unwrap_err();
        assert!(matches!(err, BoardError::ConfigError(_)));
    }

    #[test]
    fn test_blank_class_rejected() {
        let err = ClientConfig::from_json(r#"{"markup": {"dragging_class": " "}}"#).unwrap_err();
        assert!(err.to_string().contains("markup.dragging_class"));
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        assert!(matches!(
            ClientConfig::from_json("{not json"),
            Err(BoardError::SerializationError(_))
        ));
    }
}
