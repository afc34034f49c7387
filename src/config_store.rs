use std::cell::RefCell;
use std::rc::Rc;

use xpreview_core::{ConfigError, PreviewConfig};

pub(crate) const CONFIG_STORAGE_KEY: &str = "xpreview.config";

thread_local! {
    static PREVIEW_CONFIG: RefCell<Option<Rc<PreviewConfig>>> = RefCell::new(None);
}

pub(crate) fn set_preview_config(config: PreviewConfig) -> Rc<PreviewConfig> {
    let config = Rc::new(config);
    PREVIEW_CONFIG.with(|slot| {
        *slot.borrow_mut() = Some(config.clone());
    });
    config
}

pub(crate) fn preview_config() -> Rc<PreviewConfig> {
    if let Some(config) = PREVIEW_CONFIG.with(|slot| slot.borrow().clone()) {
        return config;
    }
    set_preview_config(load_preview_config())
}

pub(crate) fn load_preview_config() -> PreviewConfig {
    let mut config = match read_storage_string(CONFIG_STORAGE_KEY) {
        Some(raw) => match PreviewConfig::from_json(&raw) {
            Ok(config) => config,
            Err(err) => {
                report_config_error(&err);
                PreviewConfig::default()
            }
        },
        None => PreviewConfig::default(),
    };
    if let Some(fade_ms) = build_fade_override() {
        config.fade_ms = fade_ms;
    }
    config
}

pub(crate) fn current_host() -> Option<String> {
    let window = web_sys::window()?;
    let host = window.location().hostname().ok()?;
    let host = host.trim();
    if host.is_empty() {
        return None;
    }
    Some(host.to_string())
}

fn read_storage_string(key: &str) -> Option<String> {
    let window = web_sys::window()?;
    let storage = window.local_storage().ok()??;
    let raw = storage.get_item(key).ok()??;
    if raw.trim().is_empty() {
        return None;
    }
    Some(raw)
}

fn build_fade_override() -> Option<u32> {
    let raw = option_env!("XPREVIEW_FADE_MS")?;
    raw.trim().parse::<u32>().ok().filter(|value| *value > 0)
}

fn report_config_error(err: &ConfigError) {
    gloo::console::warn!("xpreview: ignoring stored config", err.to_string());
}
