use std::{cell::Cell, rc::Rc};

use tracing::warn;
use wasm_bindgen::{closure::Closure, convert::FromWasmAbi, JsCast, JsValue};
use web_sys::{Document, DragEvent, Element, Event, NodeList, Window};

use crate::{
    config::ClientConfig,
    domain::{Anchor, CardBox, CardRect, Status, TaskId},
    error::{BoardError, Result},
    view::{Bindable, BoardView, PageShell},
    web::{handlers, App},
};

/// Marks a node whose handlers are already attached
const BOUND_ATTR: &str = "data-dnd-bound";

pub(crate) fn page_error(err: JsValue) -> BoardError {
    BoardError::Page(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

pub(crate) fn elements(list: NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// The board as it exists in the document
pub(crate) struct DomBoard<'a> {
    app: &'a Rc<App>,
}

impl<'a> DomBoard<'a> {
    pub(crate) fn new(app: &'a Rc<App>) -> Self {
        Self { app }
    }

    fn document(&self) -> &Document {
        &self.app.document
    }

    fn config(&self) -> &ClientConfig {
        &self.app.config
    }

    fn query_all(&self, root: Option<&Element>, selector: &str) -> Result<Vec<Element>> {
        let list = match root {
            Some(el) => el.query_selector_all(selector),
            None => self.document().query_selector_all(selector),
        }
        .map_err(page_error)?;
        Ok(elements(list))
    }

    /// Like `query_all` on the document, but a failed query reads as empty
    fn query_all_or_warn(&self, selector: &str) -> Vec<Element> {
        match self.query_all(None, selector) {
            Ok(found) => found,
            Err(err) => {
                warn!(selector, %err, "query failed, treating as no matches");
                Vec::new()
            }
        }
    }

    fn card_id_of(&self, el: &Element) -> Option<TaskId> {
        let raw = el.get_attribute(&self.config().markup.task_id_attr)?;
        match raw.parse() {
            Ok(id) => Some(id),
            Err(err) => {
                warn!(%err, "card with unreadable task id skipped");
                None
            }
        }
    }

    fn find_card(&self, card: TaskId) -> Result<Element> {
        let selector = format!(
            "{}[{}=\"{}\"]",
            self.config().selectors.card,
            self.config().markup.task_id_attr,
            card
        );
        self.document()
            .query_selector(&selector)
            .map_err(page_error)?
            .ok_or_else(|| BoardError::CardNotFound(card.to_string()))
    }

    fn find_zone(&self, zone: &Status) -> Result<Element> {
        let attr = &self.config().markup.status_attr;
        self.query_all(None, &self.config().selectors.dropzone)?
            .into_iter()
            .find(|el| el.get_attribute(attr).as_deref() == Some(zone.as_str()))
            .ok_or_else(|| BoardError::DropzoneNotFound(zone.to_string()))
    }

    fn toggle_class(el: &Element, class: &str, on: bool) {
        if let Err(err) = el.class_list().toggle_with_force(class, on) {
            warn!(class, error = ?err, "could not toggle class");
        }
    }
}

impl BoardView for DomBoard<'_> {
    fn card_ids(&self) -> Vec<TaskId> {
        self.query_all_or_warn(&self.config().selectors.card)
            .iter()
            .filter_map(|el| self.card_id_of(el))
            .collect()
    }

    fn zone_statuses(&self) -> Vec<Status> {
        let attr = &self.config().markup.status_attr;
        self.query_all_or_warn(&self.config().selectors.dropzone)
            .iter()
            .filter_map(|el| el.get_attribute(attr))
            .filter_map(|label| Status::new(label).ok())
            .collect()
    }

    fn cards_in(&self, zone: &Status) -> Result<Vec<CardBox>> {
        let zone_el = self.find_zone(zone)?;
        Ok(self
            .query_all(Some(&zone_el), &self.config().selectors.card)?
            .iter()
            .filter_map(|el| {
                let id = self.card_id_of(el)?;
                let rect = el.get_bounding_client_rect();
                Some(CardBox::new(id, CardRect::new(rect.top(), rect.height())))
            })
            .collect())
    }

    fn move_card(&mut self, card: TaskId, zone: &Status, anchor: Anchor) -> Result<()> {
        let card_el = self.find_card(card)?;
        let zone_el = self.find_zone(zone)?;
        match anchor {
            Anchor::End => {
                zone_el.append_child(&card_el).map_err(page_error)?;
            }
            Anchor::Before(before) => {
                let before_el = self.find_card(before)?;
                let parent = before_el.parent_node().unwrap_or_else(|| zone_el.into());
                parent
                    .insert_before(&card_el, Some(&before_el))
                    .map_err(page_error)?;
            }
        }
        Ok(())
    }

    fn set_dragging(&mut self, card: TaskId, dragging: bool) {
        if let Ok(el) = self.find_card(card) {
            Self::toggle_class(&el, &self.config().markup.dragging_class, dragging);
        }
    }

    fn set_drop_target(&mut self, zone: &Status, active: bool) {
        if let Ok(el) = self.find_zone(zone) {
            Self::toggle_class(&el, &self.config().markup.drop_target_class, active);
        }
    }
}

impl Bindable for DomBoard<'_> {
    fn bind_card(&mut self, card: TaskId) -> Result<bool> {
        let el = self.find_card(card)?;
        if el.has_attribute(BOUND_ATTR) {
            return Ok(false);
        }
        el.set_attribute(BOUND_ATTR, "").map_err(page_error)?;

        let app = Rc::downgrade(self.app);
        listen(&el, "dragstart", move |event: DragEvent| {
            handlers::drag_start(&app, card, &event)
        })?;
        let app = Rc::downgrade(self.app);
        listen(&el, "dragend", move |_: DragEvent| handlers::drag_end(&app))?;
        Ok(true)
    }

    fn bind_zone(&mut self, zone: &Status) -> Result<bool> {
        let el = self.find_zone(zone)?;
        if el.has_attribute(BOUND_ATTR) {
            return Ok(false);
        }
        el.set_attribute(BOUND_ATTR, "").map_err(page_error)?;

        let (app, status) = (Rc::downgrade(self.app), zone.clone());
        listen(&el, "dragover", move |event: DragEvent| {
            handlers::drag_over(&app, &status, &event)
        })?;
        let (app, status) = (Rc::downgrade(self.app), zone.clone());
        listen(&el, "dragleave", move |_: DragEvent| {
            handlers::drag_leave(&app, &status)
        })?;
        let (app, status) = (Rc::downgrade(self.app), zone.clone());
        listen(&el, "drop", move |event: DragEvent| {
            handlers::drop(&app, &status, &event)
        })?;
        Ok(true)
    }
}

/// Attaches a handler for the page's lifetime
pub(crate) fn listen<E, F>(target: &Element, event: &str, handler: F) -> Result<()>
where
    E: FromWasmAbi + 'static,
    F: FnMut(E) + 'static,
{
    let closure = Closure::<dyn FnMut(E)>::new(handler);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(page_error)?;
    closure.forget();
    Ok(())
}

/// Page-level effects through the browser window
pub(crate) struct DomPage {
    window: Window,
    document: Document,
    config: ClientConfig,
    reloading: Cell<bool>,
}

impl DomPage {
    pub(crate) fn new(window: Window, document: Document, config: ClientConfig) -> Self {
        Self {
            window,
            document,
            config,
            reloading: Cell::new(false),
        }
    }

    fn detail_modal(&self) -> Option<Element> {
        self.document
            .query_selector(&self.config.selectors.detail_modal)
            .ok()
            .flatten()
    }

    fn set_detail_visible(&self, visible: bool) {
        if let Some(modal) = self.detail_modal() {
            set_visible(&modal, &self.config.markup.hidden_class, visible);
        }
    }
}

fn set_visible(el: &Element, hidden_class: &str, visible: bool) {
    let _ = el.class_list().toggle_with_force(hidden_class, !visible);
    let _ = el.set_attribute("aria-hidden", if visible { "false" } else { "true" });
}

impl PageShell for DomPage {
    fn alert(&self, message: &str) {
        let _ = self.window.alert_with_message(message);
    }

    fn confirm(&self, message: &str) -> bool {
        self.window.confirm_with_message(message).unwrap_or(false)
    }

    fn reload(&self) {
        self.reloading.set(true);
        if let Err(err) = self.window.location().reload() {
            warn!(error = ?err, "page reload failed");
        }
    }

    fn is_reloading(&self) -> bool {
        self.reloading.get()
    }

    fn set_detail_html(&self, html: &str) {
        match self
            .document
            .query_selector(&self.config.selectors.detail_content)
        {
            Ok(Some(content)) => content.set_inner_html(html),
            _ => warn!("detail content container missing"),
        }
    }

    fn bind_detail_close_buttons(&self) -> usize {
        let Some(modal) = self.detail_modal() else {
            return 0;
        };
        let Ok(list) = modal.query_selector_all(&self.config.selectors.close_button) else {
            return 0;
        };

        let mut bound = 0;
        for button in elements(list) {
            if button.has_attribute(BOUND_ATTR) {
                continue;
            }
            let _ = button.set_attribute(BOUND_ATTR, "");
            let modal = modal.clone();
            let hidden = self.config.markup.hidden_class.clone();
            let attached = listen(&button, "click", move |_: Event| {
                set_visible(&modal, &hidden, false)
            });
            if attached.is_ok() {
                bound += 1;
            }
        }
        bound
    }

    fn open_detail(&self) {
        self.set_detail_visible(true);
    }

    fn close_detail(&self) {
        self.set_detail_visible(false);
    }
}
