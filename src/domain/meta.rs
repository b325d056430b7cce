use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Wire format of dates in the metadata form
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Edit applied to one of the task's optional dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateEdit {
    Set(NaiveDate),
    Clear,
}

/// Metadata edits from the task detail view.
///
/// Every field is optional; the update endpoint leaves a task attribute
/// untouched when its form field is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<DateEdit>,
    pub due_date: Option<DateEdit>,
    /// Comma separated tag names, as typed by the user
    pub tags: Option<String>,
    pub archived: Option<bool>,
}

impl TaskMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_start_date(mut self, edit: DateEdit) -> Self {
        self.start_date = Some(edit);
        self
    }

    pub fn with_due_date(mut self, edit: DateEdit) -> Self {
        self.due_date = Some(edit);
        self
    }

    pub fn with_tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = Some(tags.into());
        self
    }

    pub fn with_archived(mut self, archived: bool) -> Self {
        self.archived = Some(archived);
        self
    }

    /// Builds edits from submitted form fields.
    ///
    /// Unknown fields are ignored. A date that does not parse is dropped,
    /// which leaves the stored date alone just like the server would.
    pub fn from_form<K, V>(fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut meta = Self::default();
        for (key, value) in fields {
            let value = value.as_ref();
            match key.as_ref() {
                "title" => meta.title = Some(value.to_string()),
                "description" => meta.description = Some(value.to_string()),
                "start_date" => meta.start_date = parse_date_edit("start_date", value),
                "due_date" => meta.due_date = parse_date_edit("due_date", value),
                "tags" => meta.tags = Some(value.to_string()),
                "archived" => meta.archived = Some(value == "on"),
                _ => {}
            }
        }
        meta
    }

    /// Encodes the edits as `application/x-www-form-urlencoded` fields
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut fields = Vec::new();
        if let Some(title) = &self.title {
            fields.push(("title".to_string(), title.clone()));
        }
        if let Some(description) = &self.description {
            fields.push(("description".to_string(), description.clone()));
        }
        if let Some(edit) = self.start_date {
            fields.push(("start_date".to_string(), format_date_edit(edit)));
        }
        if let Some(edit) = self.due_date {
            fields.push(("due_date".to_string(), format_date_edit(edit)));
        }
        if let Some(tags) = &self.tags {
            fields.push(("tags".to_string(), tags.clone()));
        }
        if let Some(archived) = self.archived {
            let flag = if archived { "on" } else { "off" };
            fields.push(("archived".to_string(), flag.to_string()));
        }
        fields
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

fn parse_date_edit(field: &str, raw: &str) -> Option<DateEdit> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(DateEdit::Clear);
    }
    match NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        Ok(date) => Some(DateEdit::Set(date)),
        Err(err) => {
            debug!(field, raw, %err, "dropping unparseable date");
            None
        }
    }
}

fn format_date_edit(edit: DateEdit) -> String {
    match edit {
        DateEdit::Set(date) => date.format(DATE_FORMAT).to_string(),
        DateEdit::Clear => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_meta_sends_nothing() {
        let meta = TaskMeta::new();
        assert!(meta.is_empty());
        assert!(meta.to_form().is_empty());
    }

    #[test]
    fn test_to_form_field_encoding() {
        let meta = TaskMeta::new()
            .with_title("Ship it")
            .with_start_date(DateEdit::Set(date(2025, 3, 9)))
            .with_due_date(DateEdit::Clear)
            .with_archived(false);

        assert_eq!(
            meta.to_form(),
            vec![
                ("title".to_string(), "Ship it".to_string()),
                ("start_date".to_string(), "2025-03-09".to_string()),
                ("due_date".to_string(), String::new()),
                ("archived".to_string(), "off".to_string()),
            ]
        );
    }

    #[test]
    fn test_from_form_reads_known_fields() {
        let meta = TaskMeta::from_form([
            ("title", "Write docs"),
            ("description", "  all of them "),
            ("start_date", "2025-01-31"),
            ("due_date", ""),
            ("tags", "docs, writing"),
            ("archived", "on"),
            ("csrf", "ignored"),
        ]);

        assert_eq!(meta.title.as_deref(), Some("Write docs"));
        assert_eq!(meta.description.as_deref(), Some("  all of them "));
        assert_eq!(meta.start_date, Some(DateEdit::Set(date(2025, 1, 31))));
        assert_eq!(meta.due_date, Some(DateEdit::Clear));
        assert_eq!(meta.tags.as_deref(), Some("docs, writing"));
        assert_eq!(meta.archived, Some(true));
    }

    #[test]
    fn test_from_form_drops_bad_dates() {
        let meta = TaskMeta::from_form([("start_date", "31/01/2025"), ("due_date", "2025-02-30")]);

        assert_eq!(meta.start_date, None);
        assert_eq!(meta.due_date, None);
    }
}
