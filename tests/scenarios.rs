#![cfg(not(target_arch = "wasm32"))]

//! End-to-end gestures against the headless board, page and transport.

use taskboard_client::{
    config::Messages,
    sync::{scripted::ScriptedTransport, Body, FormPart, Method},
    view::memory::{MemoryBoard, MemoryPage},
    Actions, BoardController, ClientConfig, MoveIntent, Status, SyncClient, SyncError, TaskId,
};

struct Harness {
    board: MemoryBoard,
    controller: BoardController,
    client: SyncClient<ScriptedTransport>,
    page: MemoryPage,
    messages: Messages,
}

impl Harness {
    fn new(columns: Vec<(&str, Vec<u64>)>) -> Self {
        let config = ClientConfig::default();
        let mut board = MemoryBoard::from_columns(columns).unwrap();
        let mut controller = BoardController::new();
        controller.wire(&mut board).unwrap();
        Self {
            board,
            controller,
            client: SyncClient::new(ScriptedTransport::new(), config.endpoints),
            page: MemoryPage::new(),
            messages: config.messages,
        }
    }

    fn actions(&self) -> Actions<'_, ScriptedTransport, MemoryPage> {
        Actions::new(&self.client, &self.page, &self.messages)
    }

    /// Drags `card` over `zone` at `pointer_y` and drops it there
    fn drag_and_drop(&mut self, card: u64, zone: &str, pointer_y: f64) -> MoveIntent {
        let (card, zone) = (TaskId::new(card), Status::new(zone).unwrap());
        self.controller.drag_start(card, &mut self.board);
        self.controller.drag_marker_tick(card, &mut self.board);
        self.controller
            .drag_over(&zone, pointer_y, &mut self.board)
            .unwrap();
        let intent = self
            .controller
            .drop(&zone, &mut self.board)
            .unwrap()
            .expect("a card was in flight");
        self.controller.drag_end(&mut self.board);
        intent
    }
}

#[tokio::test]
async fn reorder_within_a_column() {
    let mut h = Harness::new(vec![("todo", vec![1, 2, 3])]);
    h.client.transport().reply(200, r#"{"ok": true}"#);

    // Lower half of card 1 (top 0, height 40)
    let intent = h.drag_and_drop(3, "todo", 30.0);

    assert_eq!(h.board.ids_in("todo"), vec![1, 3, 2]);
    assert_eq!(
        intent,
        MoveIntent::new(TaskId::new(3), Status::new("todo").unwrap(), 2)
    );

    h.actions().persist_move(intent).await.unwrap();
    let sent = h.client.transport().requests();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].method, Method::Post);
    assert_eq!(sent[0].path, "/update_status");
    assert_eq!(
        sent[0].body,
        Body::Json(serde_json::json!({"task_id": 3, "new_status": "todo", "new_position": 2}))
    );
    assert!(h.page.alerts().is_empty());
    assert!(h.controller.session().is_idle());
    assert!(!h.board.is_dragging(TaskId::new(3)));
}

#[tokio::test]
async fn move_into_an_empty_column() {
    let mut h = Harness::new(vec![("todo", vec![1, 2]), ("done", vec![])]);
    h.client.transport().reply(200, r#"{"ok": true}"#);

    let intent = h.drag_and_drop(1, "done", 15.0);

    assert_eq!(h.board.ids_in("todo"), vec![2]);
    assert_eq!(h.board.ids_in("done"), vec![1]);
    assert_eq!(
        intent,
        MoveIntent::new(TaskId::new(1), Status::new("done").unwrap(), 1)
    );
    h.actions().persist_move(intent).await.unwrap();
    assert!(!h.board.is_drop_target("done"));
}

#[tokio::test]
async fn server_error_keeps_the_optimistic_order() {
    let mut h = Harness::new(vec![("todo", vec![1, 2, 3])]);
    h.client.transport().reply(500, "Internal Server Error");

    let intent = h.drag_and_drop(3, "todo", 30.0);
    let err = h.actions().persist_move(intent).await.unwrap_err();

    assert_eq!(err, SyncError::Http { status: 500 });
    assert_eq!(h.page.alerts(), vec!["Failed to update status"]);
    assert_eq!(h.board.ids_in("todo"), vec![1, 3, 2]);
    assert_eq!(h.page.reloads(), 0);
}

#[tokio::test]
async fn rejected_move_alerts_like_any_other_failure() {
    let mut h = Harness::new(vec![("todo", vec![1]), ("done", vec![2])]);
    h.client
        .transport()
        .reply(200, r#"{"ok": false, "error": "invalid status"}"#);

    let intent = h.drag_and_drop(1, "done", 0.0);
    let err = h.actions().persist_move(intent).await.unwrap_err();

    assert_eq!(err, SyncError::Rejected);
    assert_eq!(h.page.alerts(), vec!["Failed to update status"]);
    assert_eq!(h.board.ids_in("done"), vec![1, 2]);
}

#[tokio::test]
async fn attachment_upload_refreshes_detail_only() {
    let h = Harness::new(vec![("todo", vec![7, 8])]);
    h.page.show_detail("<h2>Task 7</h2>");
    h.client.transport().reply(204, "");
    h.client.transport().reply(
        200,
        r#"<h2>Task 7</h2><a>report.pdf</a><button data-close>Close</button>"#,
    );

    let parts = vec![FormPart::File {
        name: "files".to_string(),
        file_name: "report.pdf".to_string(),
        mime: Some("application/pdf".to_string()),
        bytes: b"%PDF-1.4".to_vec(),
    }];
    h.actions()
        .upload_attachments("/tasks/7/attachments", parts)
        .await
        .unwrap();

    let sent = h.client.transport().requests();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].path, "/tasks/7/attachments");
    assert_eq!(sent[1].method, Method::Get);
    assert_eq!(sent[1].path, "/tasks/7");

    assert!(h.page.detail_html().unwrap().contains("report.pdf"));
    assert!(h.page.is_detail_open());
    assert_eq!(h.page.close_buttons_bound(), 1);
    assert_eq!(h.page.reloads(), 0);
    assert_eq!(h.board.ids_in("todo"), vec![7, 8]);
}

#[tokio::test]
async fn rewiring_after_rerender_keeps_drag_working() {
    let mut h = Harness::new(vec![("todo", vec![1, 2])]);
    h.board.rerender();
    let wiring = h.controller.wire(&mut h.board).unwrap();
    assert_eq!(wiring.cards.len(), 2);
    assert_eq!(wiring.zones.len(), 1);

    let intent = h.drag_and_drop(2, "todo", 5.0);
    assert_eq!(h.board.ids_in("todo"), vec![2, 1]);
    assert_eq!(intent.new_position, 1);
}
