//! Import and export of flow documents.
//!
//! Native builds use `rfd` dialogs driven on the tokio runtime; web builds
//! download through a temporary anchor and read through a hidden file input.
//! Results come back over the app's channel and are handled at the start of
//! the next frame.

use super::state::{FileOperationResult, FlowBuilderApp, PendingFileOperation};
use eframe::egui;
use std::sync::mpsc::Sender;

fn send(sender: &Sender<FileOperationResult>, result: FileOperationResult) {
    if sender.send(result).is_err() {
        log::warn!("file operation finished after the app closed");
    }
}

/// File name offered when exporting `flow_name`.
pub fn export_file_name(flow_name: &str) -> String {
    let stem: String = flow_name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "flow.json".to_string()
    } else {
        format!("{stem}.json")
    }
}

impl FlowBuilderApp {
    /// Drains finished file operations and starts the pending one, if any.
    pub fn handle_pending_operations(&mut self, ctx: &egui::Context) {
        while let Ok(result) = self.file.receiver.try_recv() {
            self.handle_file_result(result);
        }

        let Some(operation) = self.file.pending.take() else {
            return;
        };
        let sender = self.file.sender.clone();
        match operation {
            PendingFileOperation::Export => {
                let Some(session) = &self.session else {
                    return;
                };
                match session.flow.to_json() {
                    Ok(json) => {
                        let file_name = export_file_name(&session.flow.name);
                        start_export(ctx.clone(), sender, file_name, json);
                    }
                    Err(err) => self.report_error("Could not export flow", err),
                }
            }
            PendingFileOperation::Import => start_import(ctx.clone(), sender),
        }
    }

    /// Applies one finished file operation.
    pub fn handle_file_result(&mut self, result: FileOperationResult) {
        match result {
            FileOperationResult::ExportCompleted(destination) => {
                self.report(format!("Exported to {destination}"));
            }
            FileOperationResult::ImportLoaded(source, content) => {
                match self.gallery.import_flow(&content) {
                    Ok(flow) => self.report(format!("Imported {} from {source}", flow.name)),
                    Err(err) => self.report_error(&format!("Could not import {source}"), err),
                }
                self.refresh_flow_list();
            }
            FileOperationResult::OperationFailed(error) => {
                self.report_error("File operation failed", error);
            }
        }
    }

    /// Queues an export of the open flow.
    pub fn export_open_flow(&mut self) {
        if self.session.is_some() {
            self.file.pending = Some(PendingFileOperation::Export);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn start_export(
    ctx: egui::Context,
    sender: Sender<FileOperationResult>,
    file_name: String,
    json: String,
) {
    tokio::spawn(async move {
        if let Some(handle) = rfd::AsyncFileDialog::new()
            .add_filter("Flow", &["json"])
            .set_file_name(&file_name)
            .save_file()
            .await
        {
            let path = handle.path();
            let result = match std::fs::write(path, json) {
                Ok(()) => FileOperationResult::ExportCompleted(path.display().to_string()),
                Err(err) => FileOperationResult::OperationFailed(format!(
                    "failed to write {}: {err}",
                    path.display()
                )),
            };
            send(&sender, result);
        }
        ctx.request_repaint();
    });
}

#[cfg(not(target_arch = "wasm32"))]
fn start_import(ctx: egui::Context, sender: Sender<FileOperationResult>) {
    tokio::spawn(async move {
        if let Some(handle) = rfd::AsyncFileDialog::new()
            .add_filter("Flow", &["json"])
            .pick_file()
            .await
        {
            let path = handle.path();
            let result = match std::fs::read_to_string(path) {
                Ok(json) => FileOperationResult::ImportLoaded(path.display().to_string(), json),
                Err(err) => FileOperationResult::OperationFailed(format!(
                    "failed to read {}: {err}",
                    path.display()
                )),
            };
            send(&sender, result);
        }
        ctx.request_repaint();
    });
}

#[cfg(target_arch = "wasm32")]
fn start_export(
    ctx: egui::Context,
    sender: Sender<FileOperationResult>,
    file_name: String,
    json: String,
) {
    let result = match web::download(&file_name, &json) {
        Ok(()) => FileOperationResult::ExportCompleted(file_name),
        Err(err) => FileOperationResult::OperationFailed(err),
    };
    send(&sender, result);
    ctx.request_repaint();
}

#[cfg(target_arch = "wasm32")]
fn start_import(ctx: egui::Context, sender: Sender<FileOperationResult>) {
    wasm_bindgen_futures::spawn_local(async move {
        match web::pick_file().await {
            Some(file) => {
                let name = file.name();
                let result = match web::read_text(file).await {
                    Ok(content) => FileOperationResult::ImportLoaded(name, content),
                    Err(err) => FileOperationResult::OperationFailed(err),
                };
                send(&sender, result);
            }
            None => log::debug!("import cancelled"),
        }
        ctx.request_repaint();
    });
}

#[cfg(target_arch = "wasm32")]
mod web {
    use eframe::wasm_bindgen::closure::Closure;
    use eframe::wasm_bindgen::{JsCast, JsValue};

    /// Saves `content` as a download named `file_name`.
    pub fn download(file_name: &str, content: &str) -> Result<(), String> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or("no document")?;
        let body = document.body().ok_or("no body")?;

        let parts = js_sys::Array::new();
        parts.push(&JsValue::from_str(content));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type("application/json");
        let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)
            .map_err(|_| "failed to create blob")?;
        let url = web_sys::Url::create_object_url_with_blob(&blob)
            .map_err(|_| "failed to create object URL")?;

        let anchor = document
            .create_element("a")
            .map_err(|_| "failed to create anchor")?
            .dyn_into::<web_sys::HtmlAnchorElement>()
            .map_err(|_| "element is not an anchor")?;
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.style().set_property("display", "none").ok();

        body.append_child(&anchor)
            .map_err(|_| "failed to attach anchor")?;
        anchor.click();
        body.remove_child(&anchor)
            .map_err(|_| "failed to detach anchor")?;
        web_sys::Url::revoke_object_url(&url).map_err(|_| "failed to revoke object URL")?;
        Ok(())
    }

    /// Lets the user choose a `.json` file; `None` when nothing was chosen.
    pub async fn pick_file() -> Option<web_sys::File> {
        let document = web_sys::window()?.document()?;
        let input = document
            .create_element("input")
            .ok()?
            .dyn_into::<web_sys::HtmlInputElement>()
            .ok()?;
        input.set_type("file");
        input.set_accept(".json,application/json");
        input.style().set_property("display", "none").ok()?;

        let (tx, rx) = futures::channel::oneshot::channel::<Option<web_sys::File>>();
        let tx = std::rc::Rc::new(std::cell::RefCell::new(Some(tx)));
        let on_change = Closure::wrap(Box::new(move |event: web_sys::Event| {
            let file = event
                .target()
                .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
                .and_then(|input| input.files())
                .and_then(|files| files.get(0));
            if let Some(tx) = tx.borrow_mut().take() {
                let _ = tx.send(file);
            }
        }) as Box<dyn FnMut(_)>);
        input.set_onchange(Some(on_change.as_ref().unchecked_ref()));
        on_change.forget();

        let body = document.body()?;
        body.append_child(&input).ok()?;
        input.click();
        let file = rx.await.ok().flatten();
        body.remove_child(&input).ok();
        file
    }

    /// Reads a chosen file as UTF-8 text.
    pub async fn read_text(file: web_sys::File) -> Result<String, String> {
        let reader = web_sys::FileReader::new().map_err(|_| "failed to create FileReader")?;

        let promise = js_sys::Promise::new(&mut |resolve, reject| {
            let loaded = reader.clone();
            let on_load = Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
                if let Ok(text) = loaded.result() {
                    let _ = resolve.call1(&JsValue::NULL, &text);
                }
            }) as Box<dyn FnMut(_)>);
            reader.set_onload(Some(on_load.as_ref().unchecked_ref()));
            on_load.forget();

            let on_error = Closure::wrap(Box::new(move |_: web_sys::ProgressEvent| {
                let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("read failed"));
            }) as Box<dyn FnMut(_)>);
            reader.set_onerror(Some(on_error.as_ref().unchecked_ref()));
            on_error.forget();
        });

        reader
            .read_as_text(&file)
            .map_err(|_| "failed to start reading".to_string())?;
        let text = wasm_bindgen_futures::JsFuture::from(promise)
            .await
            .map_err(|err| format!("failed to read file: {err:?}"))?;
        text.as_string()
            .ok_or_else(|| "file content is not text".to_string())
    }
}
