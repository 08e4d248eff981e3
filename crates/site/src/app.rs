//! Host-page wiring: control channel, view runtime, file manager and delegated DOM events.

use std::{cell::RefCell, rc::Rc};

use admin_app_file_manager::{RemoteDirectoryBrowser, FILES_ID};
use admin_host_web::{build_admin_services, ChannelStatus, WebViewTree};
use js_sys::Uint8Array;
use leptos::{
    logging::{error, log, warn},
    spawn_local,
};
use regex::Regex;
use view_binder::{
    apply_initial_toggles, apply_toggle_for, page_name, AdminError, DirtyTracker,
    ResponseKind, ViewRuntime, ViewTree,
};
use wasm_bindgen::{closure::Closure, JsCast};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlInputElement, Node};

use crate::{
    actions::{action_for, row_index_for, PageAction},
    config::load_config,
};

const STATUS_ID: &str = "ws-status";
const DIRTY_FORM_ID: &str = "DataForm";

type Browser = RemoteDirectoryBrowser<WebViewTree>;

struct Page {
    tree: WebViewTree,
    runtime: ViewRuntime<WebViewTree>,
    browser: Option<Browser>,
    dirty: RefCell<DirtyTracker>,
}

fn report<R>(what: &str, result: Result<R, AdminError>) {
    if let Err(err) = result {
        warn!("{what} failed: {err}");
    }
}

impl Page {
    fn on_connected(&self) {
        if let Some(browser) = &self.browser {
            report("listing", browser.request_listing(&browser.current_path()));
        }
    }

    fn on_frame(&self, frame: &str) {
        let answers_request = self
            .runtime
            .handle_message(frame)
            .is_ok_and(|envelope| envelope.callback_name().is_some());
        if answers_request {
            self.dirty.borrow_mut().init(&self.tree);
        }
    }

    fn on_click(self: &Rc<Self>, target: Node) {
        if let Some(index) = row_index_for(&self.tree, &target) {
            if let Some(browser) = self.browser.clone() {
                spawn_local(async move {
                    report("row activation", browser.activate_row(index).await);
                });
            }
            return;
        }
        let Some(action) = action_for(&self.tree, &target) else {
            return;
        };
        if !action.fires_on_change() {
            self.run(action, target);
        }
    }

    fn on_change(self: &Rc<Self>, target: Node) {
        apply_toggle_for(&self.tree, &target);
        if let Some(action) = action_for(&self.tree, &target) {
            if action.fires_on_change() {
                self.run(action, target);
            }
        }
        self.dirty.borrow().refresh(&self.tree);
    }

    fn on_input(&self) {
        self.dirty.borrow().refresh(&self.tree);
    }

    fn run(self: &Rc<Self>, action: PageAction, target: Node) {
        match action {
            PageAction::SaveForm { form_id, separator } => self.save_form(form_id, separator),
            action => self.run_file_action(action, target),
        }
    }

    fn run_file_action(&self, action: PageAction, target: Node) {
        let Some(browser) = self.browser.clone() else {
            warn!("{action:?} needs the file manager, which this page does not host");
            return;
        };
        match action {
            PageAction::RefreshListing => {
                report("listing", browser.request_listing(&browser.current_path()));
            }
            PageAction::UploadFile => spawn_local(async move {
                report("upload", browser.upload_file().await);
            }),
            PageAction::DownloadFile => report("download", browser.download_file()),
            PageAction::DeleteFile => report("delete file", browser.delete_file()),
            PageAction::DeleteFolder => report("delete folder", browser.delete_folder()),
            PageAction::AddFolder { source_id } => {
                let name = self
                    .tree
                    .element_by_id(&source_id)
                    .map(|node| self.tree.value(&node))
                    .unwrap_or_default();
                report("add folder", browser.add_folder(name.trim()));
            }
            PageAction::Backup => spawn_local(async move {
                report("backup", browser.backup_zip().await);
            }),
            PageAction::Restore => {
                let Some(input) = target.dyn_ref::<HtmlInputElement>().cloned() else {
                    return;
                };
                spawn_local(async move {
                    let Some(bytes) = selected_file_bytes(&input).await else {
                        return;
                    };
                    input.set_value("");
                    report("restore", browser.restore_zip(&bytes).await);
                });
            }
            PageAction::SaveForm { .. } => {}
        }
    }

    fn save_form(self: &Rc<Self>, form_id: String, separator: Option<String>) {
        let separator = match separator.as_deref().map(Regex::new).transpose() {
            Ok(separator) => separator,
            Err(err) => {
                error!("invalid form separator: {err}");
                self.runtime
                    .set_response(false, &format!("invalid form separator: {err}"));
                return;
            }
        };
        let pathname = web_sys::window()
            .and_then(|window| window.location().pathname().ok())
            .unwrap_or_default();
        let page_id = page_name(&pathname);
        let page = self.clone();
        spawn_local(async move {
            let result = page
                .runtime
                .save_form(&form_id, &page_id, separator.as_ref())
                .await;
            if result.is_ok() {
                page.dirty.borrow_mut().init(&page.tree);
            }
            report("save form", result);
        });
    }

    fn listen(self: &Rc<Self>, kind: &str, handler: fn(&Rc<Page>, Node)) {
        let page = self.clone();
        let listener = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if let Some(target) = event.target().and_then(|target| target.dyn_into::<Node>().ok()) {
                handler(&page, target);
            }
        });
        if let Err(err) = self
            .tree
            .document()
            .add_event_listener_with_callback(kind, listener.as_ref().unchecked_ref())
        {
            error!("failed to listen for {kind}: {err:?}");
            return;
        }
        listener.forget();
    }
}

async fn selected_file_bytes(input: &HtmlInputElement) -> Option<Vec<u8>> {
    let file = input.files()?.get(0)?;
    match JsFuture::from(file.array_buffer()).await {
        Ok(buffer) => Some(Uint8Array::new(&buffer).to_vec()),
        Err(err) => {
            error!("reading {} failed: {err:?}", file.name());
            None
        }
    }
}

/// Connects to the device and binds the runtime to the current document.
pub fn mount() {
    console_error_panic_hook::set_once();
    let Some(tree) = WebViewTree::from_window() else {
        error!("no document to bind the admin UI to");
        return;
    };

    let page_slot: Rc<RefCell<Option<Rc<Page>>>> = Rc::default();
    let status_tree = tree.clone();
    let status_slot = page_slot.clone();
    let host = build_admin_services(
        load_config(),
        Rc::new(move |status: ChannelStatus| {
            if let Some(indicator) = status_tree.element_by_id(STATUS_ID) {
                status_tree.set_style(&indicator, "background-color", status.indicator_color());
            }
            if status == ChannelStatus::Open {
                let page = status_slot.borrow().clone();
                if let Some(page) = page {
                    page.on_connected();
                }
            }
        }),
    );

    let mut runtime = ViewRuntime::new(tree.clone(), host.services.clone());
    let browser = tree.element_by_id(FILES_ID).map(|_| {
        RemoteDirectoryBrowser::new(tree.clone(), host.services.clone(), runtime.notice().clone())
    });
    if let Some(browser) = &browser {
        runtime.register(ResponseKind::Files, browser.response_handler());
    }
    let mut dirty = DirtyTracker::new(DIRTY_FORM_ID);
    dirty.init(&tree);

    let page = Rc::new(Page {
        tree: tree.clone(),
        runtime,
        browser,
        dirty: RefCell::new(dirty),
    });
    *page_slot.borrow_mut() = Some(page.clone());

    let inbound = page.clone();
    host.inbound
        .install(Rc::new(move |frame: String| inbound.on_frame(&frame)));

    apply_initial_toggles(&tree);
    page.listen("click", Page::on_click);
    page.listen("change", Page::on_change);
    page.listen("input", |page, _| page.on_input());
    log!("admin UI mounted");
}
