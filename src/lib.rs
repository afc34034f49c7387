mod config_store;
mod coordinator;
mod dom;
mod overlay;

use gloo::events::EventListener;
use wasm_bindgen::JsValue;

pub use xpreview_core::PreviewConfig;

/// Entry point: loads the config, checks the host and installs the preview
/// once the document has a body.
pub fn start() {
    console_error_panic_hook::set_once();
    let config = config_store::preview_config();
    let Some(host) = config_store::current_host() else {
        return;
    };
    if !config.matches_host(&host) {
        gloo::console::log!("xpreview: inactive on", host);
        return;
    }
    if let Err(err) = install_when_ready() {
        gloo::console::warn!("xpreview: install failed", dom::js_err(err));
    }
}

/// Installs with an explicit config, skipping the host check and any stored
/// override. Fails once a preview is installed, since its listeners already
/// hold the earlier config.
pub fn start_with_config(config: PreviewConfig) -> Result<(), JsValue> {
    config.validate().map_err(|err| JsValue::from_str(&err.to_string()))?;
    if coordinator::is_installed() {
        return Err(JsValue::from_str("xpreview already installed"));
    }
    config_store::set_preview_config(config);
    install_when_ready()
}

fn install_when_ready() -> Result<(), JsValue> {
    let document = dom::document()?;
    if document.body().is_some() {
        coordinator::install(config_store::preview_config())?;
        return Ok(());
    }
    EventListener::once(&document, "DOMContentLoaded", move |_event| {
        if let Err(err) = coordinator::install(config_store::preview_config()) {
            gloo::console::warn!("xpreview: install failed", dom::js_err(err));
        }
    })
    .forget();
    Ok(())
}
