use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlElement, HtmlImageElement};

use crate::dom::{document, js_err};
use xpreview_core::{FadeToken, LoadToken, PreviewConfig, SurfaceBackend, SurfaceEvent};

const OVERLAY_IMAGE_SUFFIX: &str = "-image";

/// The fixed container and the `<img>` inside it.
#[derive(Clone)]
pub(crate) struct OverlayElements {
    pub(crate) container: HtmlElement,
    pub(crate) image: HtmlImageElement,
}

/// DOM side of the preview surface. Completions are reported through
/// `on_event` from the browser event loop, never synchronously.
pub(crate) struct DomSurface {
    config: Rc<PreviewConfig>,
    on_event: Rc<dyn Fn(SurfaceEvent)>,
    // Dropping a `Timeout` cancels it, so storing a new one replaces the
    // previous fade.
    _fade_timer: Option<Timeout>,
}

impl DomSurface {
    pub(crate) fn new(config: Rc<PreviewConfig>, on_event: Rc<dyn Fn(SurfaceEvent)>) -> Self {
        Self {
            config,
            on_event,
            _fade_timer: None,
        }
    }

    /// Looks the overlay up by id and creates it when the page does not have
    /// one, so a host that wiped the body gets a fresh overlay.
    pub(crate) fn ensure_overlay(&self) -> Result<OverlayElements, JsValue> {
        let document = document()?;
        let image_id = format!("{}{OVERLAY_IMAGE_SUFFIX}", self.config.overlay_id);
        if let Some(existing) = document.get_element_by_id(&self.config.overlay_id) {
            let container = existing.dyn_into::<HtmlElement>()?;
            if let Some(image) = document.get_element_by_id(&image_id) {
                let image = image.dyn_into::<HtmlImageElement>()?;
                return Ok(OverlayElements { container, image });
            }
            container.remove();
        }
        let container = document.create_element("div")?.dyn_into::<HtmlElement>()?;
        container.set_id(&self.config.overlay_id);
        apply_container_style(&container, &self.config)?;
        let image = document.create_element("img")?.dyn_into::<HtmlImageElement>()?;
        image.set_id(&image_id);
        apply_image_style(&image, &self.config)?;
        container.append_child(&image)?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("missing body"))?;
        body.append_child(&container)?;
        gloo::console::log!("xpreview: overlay created", self.config.overlay_id.clone());
        Ok(OverlayElements { container, image })
    }

    fn with_overlay<F>(&self, label: &str, action: F)
    where
        F: FnOnce(&OverlayElements) -> Result<(), JsValue>,
    {
        let result = self.ensure_overlay().and_then(|overlay| action(&overlay));
        if let Err(err) = result {
            gloo::console::warn!("xpreview:", label.to_string(), js_err(err));
        }
    }
}

impl SurfaceBackend for DomSurface {
    fn begin_load(&mut self, token: LoadToken, url: &str) {
        let on_event = self.on_event.clone();
        let url = url.to_string();
        spawn_local(async move {
            let event = match load_image(&url).await {
                Ok(()) => SurfaceEvent::Loaded(token),
                Err(err) => {
                    gloo::console::warn!("xpreview: image load failed", url.clone(), js_err(err));
                    SurfaceEvent::LoadFailed(token)
                }
            };
            on_event(event);
        });
    }

    fn set_source(&mut self, url: &str) {
        self.with_overlay("set source", |overlay| {
            overlay.image.set_src(url);
            Ok(())
        });
    }

    fn set_displayed(&mut self, displayed: bool) {
        self.with_overlay("set display", |overlay| {
            let style = overlay.container.style();
            style.set_property("display", if displayed { "block" } else { "none" })?;
            if displayed {
                // Force a reflow so the following opacity change transitions.
                let _ = overlay.container.offset_width();
            }
            Ok(())
        });
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.with_overlay("set opacity", |overlay| {
            let style = overlay.container.style();
            // A recreated overlay starts hidden even when the surface is shown.
            if opacity > 0.0 && style.get_property_value("display")? == "none" {
                style.set_property("display", "block")?;
                let _ = overlay.container.offset_width();
            }
            style.set_property("opacity", &opacity.to_string())
        });
    }

    fn schedule_fade_out(&mut self, token: FadeToken) {
        let on_event = self.on_event.clone();
        let timer = Timeout::new(self.config.fade_ms, move || {
            on_event(SurfaceEvent::FadeFinished(token));
        });
        self._fade_timer = Some(timer);
    }
}

/// Resolves once `url` has been fetched and decoded off-screen.
async fn load_image(url: &str) -> Result<(), JsValue> {
    let img = HtmlImageElement::new()?;
    let mut listeners = Vec::with_capacity(2);
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        listeners.push(EventListener::once(&img, "load", move |_event| {
            let _ = resolve.call0(&JsValue::NULL);
        }));
        listeners.push(EventListener::once(&img, "error", move |_event| {
            let _ = reject.call1(&JsValue::NULL, &JsValue::from_str("image_load_failed"));
        }));
    });
    img.set_src(url);
    let loaded = wasm_bindgen_futures::JsFuture::from(promise).await;
    // The handler that did not fire is released here along with the one that did.
    drop(listeners);
    loaded.map(|_| ())
}

fn apply_container_style(container: &HtmlElement, config: &PreviewConfig) -> Result<(), JsValue> {
    let style = container.style();
    let rules = [
        ("position", "fixed".to_string()),
        ("top", "50%".to_string()),
        ("left", "auto".to_string()),
        ("right", format!("{}px", config.right_offset_px)),
        ("transform", "translateY(-50%)".to_string()),
        ("max-width", format!("{}px", config.max_width_px)),
        ("max-height", "98vh".to_string()),
        ("box-sizing", "border-box".to_string()),
        ("border", format!("{}px solid #fff", config.border_px)),
        ("box-shadow", "0 0 12px rgba(0, 0, 0, .7)".to_string()),
        ("background", "#000".to_string()),
        ("z-index", config.z_index.to_string()),
        ("pointer-events", "none".to_string()),
        ("display", "none".to_string()),
        ("opacity", "0".to_string()),
        ("transition", format!("opacity {}ms ease-out", config.fade_ms)),
    ];
    for (name, value) in rules {
        style.set_property(name, &value)?;
    }
    Ok(())
}

fn apply_image_style(image: &HtmlImageElement, config: &PreviewConfig) -> Result<(), JsValue> {
    let style = image.style();
    let border = config.border_px * 2;
    style.set_property("display", "block")?;
    style.set_property("width", "auto")?;
    style.set_property("height", "auto")?;
    style.set_property(
        "max-width",
        &format!("{}px", config.max_width_px.saturating_sub(border)),
    )?;
    style.set_property("max-height", &format!("calc(98vh - {border}px)"))?;
    Ok(())
}
