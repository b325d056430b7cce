//! Browser shell: binds the engine to the live document.
//!
//! JavaScript calls [`start`] once the board markup is on the page. `start`
//! also publishes `window.saveTaskMeta(id)` and `window.deleteTask(id)`,
//! which the server-rendered detail view calls from its buttons, and
//! [`rewire`] re-attaches handlers after cards are re-rendered in place.

use std::{cell::RefCell, rc::Rc};

use js_sys::Reflect;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlFormElement, Window};

use crate::{
    actions::Actions,
    config::ClientConfig,
    controller::BoardController,
    domain::{TaskId, TaskMeta},
    sync::{http::HttpTransport, SyncClient},
    view::PageShell,
};

mod dom;
mod forms;
mod handlers;

use dom::{listen, DomBoard, DomPage};

/// Everything one page needs, shared by all handlers
pub(crate) struct App {
    pub(crate) document: Document,
    pub(crate) config: ClientConfig,
    pub(crate) controller: RefCell<BoardController>,
    pub(crate) client: SyncClient<HttpTransport>,
    pub(crate) page: DomPage,
}

impl App {
    pub(crate) fn actions(&self) -> Actions<'_, HttpTransport, DomPage> {
        Actions::new(&self.client, &self.page, &self.config.messages)
    }
}

thread_local! {
    static APP: RefCell<Option<Rc<App>>> = const { RefCell::new(None) };
}

fn current_app() -> Result<Rc<App>, JsValue> {
    APP.with(|app| app.borrow().clone())
        .ok_or_else(|| JsValue::from_str("taskboard not started"))
}

fn js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Starts the board controller.
///
/// `config_json` optionally overrides the defaults (see `ClientConfig`).
#[wasm_bindgen]
pub fn start(config_json: Option<String>) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| js_error("no window"))?;
    let document = window.document().ok_or_else(|| js_error("no document"))?;

    let mut config = match config_json.as_deref() {
        Some(json) => ClientConfig::from_json(json).map_err(js_error)?,
        None => ClientConfig::default(),
    };
    if config.base_url.is_none() {
        config.base_url = Some(window.location().origin()?);
    }

    let transport = HttpTransport::from_config(&config).map_err(js_error)?;
    let client = SyncClient::new(transport, config.endpoints.clone());
    let page = DomPage::new(window.clone(), document.clone(), config.clone());
    let app = Rc::new(App {
        document,
        config,
        controller: RefCell::new(BoardController::new()),
        client,
        page,
    });

    let wiring = app
        .controller
        .borrow_mut()
        .wire(&mut DomBoard::new(&app))
        .map_err(js_error)?;
    info!(
        cards = wiring.cards.len(),
        zones = wiring.zones.len(),
        "taskboard started"
    );

    install_page_listeners(&app)?;
    install_globals(&window)?;
    APP.with(|slot| *slot.borrow_mut() = Some(app));
    Ok(())
}

/// Publishes the detail view actions as globals for inline handlers
fn install_globals(window: &Window) -> Result<(), JsValue> {
    let save = Closure::<dyn Fn(u32) -> Result<(), JsValue>>::new(save_task_meta);
    Reflect::set(window, &JsValue::from_str("saveTaskMeta"), save.as_ref())?;
    save.forget();

    let delete = Closure::<dyn Fn(u32) -> Result<(), JsValue>>::new(delete_task);
    Reflect::set(window, &JsValue::from_str("deleteTask"), delete.as_ref())?;
    delete.forget();
    Ok(())
}

/// Binds handlers to cards or dropzones added since the last wiring pass
#[wasm_bindgen]
pub fn rewire() -> Result<u32, JsValue> {
    let app = current_app()?;
    let wiring = app
        .controller
        .borrow_mut()
        .wire(&mut DomBoard::new(&app))
        .map_err(js_error)?;
    Ok(u32::try_from(wiring.cards.len() + wiring.zones.len()).unwrap_or(u32::MAX))
}

/// Saves the detail view's metadata form for `task_id`
#[wasm_bindgen(js_name = saveTaskMeta)]
pub fn save_task_meta(task_id: u32) -> Result<(), JsValue> {
    let app = current_app()?;
    let form = app
        .document
        .query_selector(&app.config.selectors.meta_form)?
        .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
        .ok_or_else(|| js_error("task metadata form not found"))?;
    let meta = TaskMeta::from_form(forms::text_fields(&form)?);
    let id = TaskId::new(u64::from(task_id));

    spawn_local(async move {
        let _ = app.actions().save_meta(id, &meta).await;
    });
    Ok(())
}

/// Deletes `task_id` after the user confirms
#[wasm_bindgen(js_name = deleteTask)]
pub fn delete_task(task_id: u32) -> Result<(), JsValue> {
    let app = current_app()?;
    let id = TaskId::new(u64::from(task_id));

    spawn_local(async move {
        let _ = app.actions().delete_task(id).await;
    });
    Ok(())
}

/// Delegated listeners on the body: card clicks open the detail view and
/// attachment forms upload without navigating away.
fn install_page_listeners(app: &Rc<App>) -> Result<(), JsValue> {
    let body: Element = app
        .document
        .body()
        .ok_or_else(|| js_error("no body"))?
        .into();

    let weak = Rc::downgrade(app);
    listen(&body, "click", move |event: Event| {
        let Some(app) = weak.upgrade() else { return };
        let Some(card) = closest(&event, &app.config.selectors.card) else {
            return;
        };
        let Some(id) = card
            .get_attribute(&app.config.markup.task_id_attr)
            .and_then(|raw| raw.parse::<TaskId>().ok())
        else {
            warn!("clicked card has no readable task id");
            return;
        };
        spawn_local(async move {
            let _ = app.actions().open_detail(id).await;
        });
    })
    .map_err(js_error)?;

    let weak = Rc::downgrade(app);
    listen(&body, "submit", move |event: Event| {
        let Some(app) = weak.upgrade() else { return };
        let Some(form) = closest(&event, &app.config.selectors.attach_form)
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok())
        else {
            return;
        };
        event.prevent_default();
        spawn_local(async move {
            let action = form.action();
            match forms::multipart_parts(&form).await {
                Ok(parts) => {
                    let _ = app.actions().upload_attachments(&action, parts).await;
                }
                Err(err) => {
                    warn!(error = ?err, "could not read attachment form");
                    app.page.alert(&app.config.messages.upload_failed);
                }
            }
        });
    })
    .map_err(js_error)?;

    Ok(())
}

fn closest(event: &Event, selector: &str) -> Option<Element> {
    event
        .target()
        .and_then(|target| target.dyn_into::<Element>().ok())
        .and_then(|el| el.closest(selector).ok().flatten())
}
