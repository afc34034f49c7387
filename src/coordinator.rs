use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions, EventListenerPhase};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, Event, HtmlImageElement, MutationObserver, MutationObserverInit, MutationRecord,
    WheelEvent,
};

use crate::dom::{self, DomImage};
use crate::overlay::DomSurface;
use xpreview_core::{
    bind_once, PreviewConfig, PreviewSession, SurfaceEvent, WheelBinding, WheelOutcome,
};

struct PageObserver {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl Drop for PageObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// Wires page events to the preview session: hover listeners on every image,
/// the window wheel listener while a preview is up, and the observer that
/// picks up images the page inserts later.
pub(crate) struct Coordinator {
    config: Rc<PreviewConfig>,
    session: RefCell<PreviewSession<DomSurface>>,
    wheel_listener: RefCell<Option<EventListener>>,
    observer: RefCell<Option<PageObserver>>,
}

thread_local! {
    static COORDINATOR: RefCell<Option<Rc<Coordinator>>> = RefCell::new(None);
}

pub(crate) fn is_installed() -> bool {
    COORDINATOR.with(|slot| slot.borrow().is_some())
}

pub(crate) fn install(config: Rc<PreviewConfig>) -> Result<Rc<Coordinator>, JsValue> {
    if let Some(existing) = COORDINATOR.with(|slot| slot.borrow().clone()) {
        return Ok(existing);
    }
    let coordinator = Coordinator::new(config);
    let bound = coordinator.bind_document()?;
    coordinator.observe_page()?;
    COORDINATOR.with(|slot| {
        *slot.borrow_mut() = Some(coordinator.clone());
    });
    gloo::console::log!("xpreview: installed", bound as u32);
    Ok(coordinator)
}

impl Coordinator {
    pub(crate) fn new(config: Rc<PreviewConfig>) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Coordinator>| {
            let weak = weak.clone();
            let on_event: Rc<dyn Fn(SurfaceEvent)> = Rc::new(move |event| {
                if let Some(coordinator) = weak.upgrade() {
                    coordinator.handle_surface_event(event);
                }
            });
            let surface = DomSurface::new(config.clone(), on_event);
            Self {
                session: RefCell::new(PreviewSession::new((*config).clone(), surface)),
                config,
                wheel_listener: RefCell::new(None),
                observer: RefCell::new(None),
            }
        })
    }

    /// Binds every image already on the page. Returns how many were new.
    pub(crate) fn bind_document(self: &Rc<Self>) -> Result<usize, JsValue> {
        let document = dom::document()?;
        let images = dom::document_images(&document)?;
        Ok(images
            .into_iter()
            .filter(|image| self.bind_image(image.clone()))
            .count())
    }

    /// Handles one inserted subtree: the root itself if it is an image, and
    /// every image below it.
    pub(crate) fn bind_inserted(self: &Rc<Self>, root: &Element) -> usize {
        if root.id() == self.config.overlay_id {
            return 0;
        }
        match dom::images_in_subtree(root) {
            Ok(images) => images
                .into_iter()
                .filter(|image| self.bind_image(image.clone()))
                .count(),
            Err(err) => {
                gloo::console::warn!("xpreview: subtree scan failed", dom::js_err(err));
                0
            }
        }
    }

    pub(crate) fn bind_image(self: &Rc<Self>, element: HtmlImageElement) -> bool {
        let image = DomImage::new(element);
        bind_once(&image, &self.config.bound_marker, |image| {
            self.attach_hover_listeners(image.element());
        })
    }

    fn attach_hover_listeners(self: &Rc<Self>, element: &HtmlImageElement) {
        let weak = Rc::downgrade(self);
        EventListener::new(element, "mouseenter", move |event: &Event| {
            let Some(coordinator) = weak.upgrade() else {
                return;
            };
            let Some(target) = event
                .current_target()
                .and_then(|target| target.dyn_into::<HtmlImageElement>().ok())
            else {
                return;
            };
            coordinator.on_hover_enter(target);
        })
        .forget();

        let weak = Rc::downgrade(self);
        EventListener::new(element, "mouseleave", move |_event: &Event| {
            if let Some(coordinator) = weak.upgrade() {
                coordinator.on_hover_leave();
            }
        })
        .forget();
    }

    fn observe_page(self: &Rc<Self>) -> Result<(), JsValue> {
        let document = dom::document()?;
        let body = document
            .body()
            .ok_or_else(|| JsValue::from_str("missing body"))?;
        let weak = Rc::downgrade(self);
        let callback = Closure::wrap(Box::new(
            move |records: js_sys::Array, _observer: MutationObserver| {
                let Some(coordinator) = weak.upgrade() else {
                    return;
                };
                for record in records.iter() {
                    let Ok(record) = record.dyn_into::<MutationRecord>() else {
                        continue;
                    };
                    let added = record.added_nodes();
                    for idx in 0..added.length() {
                        let Some(element) = added
                            .item(idx)
                            .and_then(|node| node.dyn_into::<Element>().ok())
                        else {
                            continue;
                        };
                        coordinator.bind_inserted(&element);
                    }
                }
            },
        ) as Box<dyn FnMut(js_sys::Array, MutationObserver)>);
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer.observe_with_options(&body, &options)?;
        *self.observer.borrow_mut() = Some(PageObserver {
            observer,
            _callback: callback,
        });
        Ok(())
    }

    fn on_hover_enter(self: &Rc<Self>, element: HtmlImageElement) {
        let image = DomImage::new(element);
        let binding = self.session.borrow_mut().hover_enter(&image);
        self.apply_wheel_binding(binding);
    }

    fn on_hover_leave(self: &Rc<Self>) {
        let binding = self.session.borrow_mut().hover_leave();
        self.apply_wheel_binding(binding);
    }

    fn on_wheel(&self, event: &WheelEvent) {
        let outcome = self.session.borrow_mut().wheel(event.delta_y());
        if let WheelOutcome::Navigated { .. } = outcome {
            event.prevent_default();
        }
    }

    fn handle_surface_event(&self, event: SurfaceEvent) {
        let Ok(mut session) = self.session.try_borrow_mut() else {
            gloo::console::warn!("xpreview: surface event while session busy");
            return;
        };
        session.handle_surface_event(event);
    }

    fn apply_wheel_binding(self: &Rc<Self>, binding: WheelBinding) {
        match binding {
            WheelBinding::Attach => {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let weak = Rc::downgrade(self);
                let listener = EventListener::new_with_options(
                    &window,
                    "wheel",
                    EventListenerOptions {
                        phase: EventListenerPhase::Bubble,
                        passive: false,
                    },
                    move |event: &Event| {
                        let Some(coordinator) = weak.upgrade() else {
                            return;
                        };
                        let Some(event) = event.dyn_ref::<WheelEvent>() else {
                            return;
                        };
                        coordinator.on_wheel(event);
                    },
                );
                *self.wheel_listener.borrow_mut() = Some(listener);
            }
            WheelBinding::Detach => {
                let listener = self.wheel_listener.borrow_mut().take();
                drop(listener);
            }
            WheelBinding::Unchanged => {}
        }
    }
}
