//! Server round-trips and how their outcomes show up on the page.
//!
//! Drag-and-drop moves are optimistic: the board already shows the new
//! order, so success changes nothing and failure only notifies the user.
//! The optimistic order is *not* rolled back on failure; the board stays
//! out of step with the server until the next full reload.
//!
//! Every other change (metadata edits, deletes) resynchronizes by reloading
//! the whole page once the server accepts it.

use tracing::{debug, info, warn};

use crate::{
    config::Messages,
    domain::{MoveIntent, TaskId, TaskMeta},
    sync::{FormPart, StatusAck, SyncClient, SyncResult, Transport},
    view::PageShell,
};

/// Page workflows bound to one client, page and message set
pub struct Actions<'a, T, P> {
    client: &'a SyncClient<T>,
    page: &'a P,
    messages: &'a Messages,
}

impl<'a, T: Transport, P: PageShell> Actions<'a, T, P> {
    pub fn new(client: &'a SyncClient<T>, page: &'a P, messages: &'a Messages) -> Self {
        Self {
            client,
            page,
            messages,
        }
    }

    /// Sends a dropped card's new placement to the server.
    ///
    /// Any failure alerts the user and leaves the board as it is. If the
    /// page is already reloading, the outcome no longer matters and is only
    /// logged.
    pub async fn persist_move(&self, intent: MoveIntent) -> SyncResult<StatusAck> {
        let outcome = self.client.commit_move(&intent).await;
        if let Err(err) = &outcome {
            if self.page.is_reloading() {
                debug!(task = %intent.task_id, %err, "move outcome superseded by reload");
            } else {
                warn!(task = %intent.task_id, %err, "move not persisted, board left as shown");
                self.page.alert(&self.messages.move_failed);
            }
        }
        outcome
    }

    /// Loads a task's detail view and shows it
    pub async fn open_detail(&self, id: TaskId) -> SyncResult<()> {
        match self.refresh_detail(id).await {
            Ok(()) => {
                self.page.open_detail();
                Ok(())
            }
            Err(err) => {
                warn!(task = %id, %err, "could not load task detail");
                self.page.alert(&self.messages.detail_failed);
                Err(err)
            }
        }
    }

    /// Saves metadata edits, then closes the detail view and reloads.
    /// On failure the detail view stays open so the user can retry.
    pub async fn save_meta(&self, id: TaskId, meta: &TaskMeta) -> SyncResult<()> {
        match self.client.save_meta(id, meta).await {
            Ok(()) => {
                self.page.close_detail();
                self.page.reload();
                Ok(())
            }
            Err(err) => {
                warn!(task = %id, %err, "could not save task metadata");
                self.page.alert(&self.messages.save_failed);
                Err(err)
            }
        }
    }

    /// Deletes a task after the user confirms. Returns `false` when the
    /// user declined and nothing was sent.
    pub async fn delete_task(&self, id: TaskId) -> SyncResult<bool> {
        if !self.page.confirm(&self.messages.delete_confirm) {
            debug!(task = %id, "delete declined");
            return Ok(false);
        }
        match self.client.delete_task(id).await {
            Ok(()) => {
                self.page.close_detail();
                self.page.reload();
                Ok(true)
            }
            Err(err) => {
                warn!(task = %id, %err, "could not delete task");
                self.page.alert(&self.messages.delete_failed);
                Err(err)
            }
        }
    }

    /// Uploads attachments from a detail view form and refreshes that view
    /// in place. The board itself is not re-rendered.
    pub async fn upload_attachments(&self, action: &str, parts: Vec<FormPart>) -> SyncResult<()> {
        if let Err(err) = self.client.upload_attachments(action, parts).await {
            warn!(action, %err, "attachment upload failed");
            self.page.alert(&self.messages.upload_failed);
            return Err(err);
        }

        let Some(id) = self.client.endpoints().attachment_task_id(action) else {
            info!(action, "no task id in attachment action, reloading");
            self.page.reload();
            return Ok(());
        };

        self.refresh_detail(id).await.map_err(|err| {
            warn!(task = %id, %err, "could not refresh task detail after upload");
            self.page.alert(&self.messages.detail_failed);
            err
        })
    }

    async fn refresh_detail(&self, id: TaskId) -> SyncResult<()> {
        let html = self.client.fetch_detail(id).await?;
        self.page.set_detail_html(&html);
        let bound = self.page.bind_detail_close_buttons();
        debug!(task = %id, close_buttons = bound, "detail view refreshed");
        Ok(())
    }
}
