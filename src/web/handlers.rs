use std::rc::{Rc, Weak};

use tracing::{debug, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::spawn_local;
use web_sys::DragEvent;

use crate::{
    controller::BoardController,
    domain::{MoveIntent, Status, TaskId},
    web::{dom::DomBoard, App},
};

/// Runs `f` against the live controller and board, unless the page is gone
/// or another handler already holds the controller.
fn with_controller<R>(
    app: &Weak<App>,
    f: impl FnOnce(&mut BoardController, &mut DomBoard<'_>) -> R,
) -> Option<R> {
    let app = app.upgrade()?;
    let Ok(mut controller) = app.controller.try_borrow_mut() else {
        debug!("controller busy, event skipped");
        return None;
    };
    let mut board = DomBoard::new(&app);
    Some(f(&mut controller, &mut board))
}

pub(crate) fn drag_start(app: &Weak<App>, card: TaskId, event: &DragEvent) {
    if let Some(transfer) = event.data_transfer() {
        transfer.set_effect_allowed("move");
        if let Err(err) = transfer.set_data("text/plain", &card.to_string()) {
            warn!(%card, error = ?err, "could not set drag payload");
        }
    }

    if with_controller(app, |controller, board| controller.drag_start(card, board)).is_none() {
        return;
    }

    // Marking on the next tick keeps the browser's drag image unmarked.
    let tick_app = app.clone();
    let tick = Closure::once_into_js(move || {
        with_controller(&tick_app, |controller, board| {
            controller.drag_marker_tick(card, board)
        });
    });
    let scheduled = web_sys::window().map(|window| {
        window.set_timeout_with_callback_and_timeout_and_arguments_0(tick.unchecked_ref(), 0)
    });
    if !matches!(scheduled, Some(Ok(_))) {
        warn!(%card, "could not schedule drag marker");
    }
}

pub(crate) fn drag_end(app: &Weak<App>) {
    with_controller(app, |controller, board| controller.drag_end(board));
}

pub(crate) fn drag_over(app: &Weak<App>, zone: &Status, event: &DragEvent) {
    event.prevent_default();
    let pointer_y = f64::from(event.client_y());
    let outcome = with_controller(app, |controller, board| {
        controller.drag_over(zone, pointer_y, board)
    });
    if let Some(Err(err)) = outcome {
        warn!(%zone, %err, "drag over failed");
    }
}

pub(crate) fn drag_leave(app: &Weak<App>, zone: &Status) {
    let outcome = with_controller(app, |controller, board| controller.drag_leave(zone, board));
    if let Some(Err(err)) = outcome {
        warn!(%zone, %err, "drag leave failed");
    }
}

pub(crate) fn drop(app: &Weak<App>, zone: &Status, event: &DragEvent) {
    event.prevent_default();
    let intent = match with_controller(app, |controller, board| controller.drop(zone, board)) {
        Some(Ok(Some(intent))) => intent,
        Some(Ok(None)) | None => return,
        Some(Err(err)) => {
            warn!(%zone, %err, "drop failed");
            return;
        }
    };

    let Some(app) = app.upgrade() else { return };
    spawn_local(persist(app, intent));
}

async fn persist(app: Rc<App>, intent: MoveIntent) {
    let _ = app.actions().persist_move(intent).await;
}
