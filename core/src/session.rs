use crate::config::PreviewConfig;
use crate::gallery::{resolve_gallery, Gallery, GalleryImage, WheelDirection};
use crate::media_url::{is_photo_resource, upgrade_quality};
use crate::surface::{PreviewSurface, SurfaceBackend, SurfaceEvent};

/// What the caller must do with the window wheel listener.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelBinding {
    Attach,
    Detach,
    Unchanged,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelOutcome {
    /// Leave the event alone so the page scrolls.
    PassThrough,
    /// The gallery moved; suppress the default scroll.
    Navigated { index: usize },
}

/// Hover and wheel state of the page: the active gallery, the preview surface
/// and whether the wheel listener is attached.
pub struct PreviewSession<B: SurfaceBackend> {
    config: PreviewConfig,
    surface: PreviewSurface<B>,
    gallery: Option<Gallery>,
    wheel_bound: bool,
}

impl<B: SurfaceBackend> PreviewSession<B> {
    pub fn new(config: PreviewConfig, backend: B) -> Self {
        Self {
            config,
            surface: PreviewSurface::new(backend),
            gallery: None,
            wheel_bound: false,
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn gallery(&self) -> Option<&Gallery> {
        self.gallery.as_ref()
    }

    pub fn surface(&self) -> &PreviewSurface<B> {
        &self.surface
    }

    pub fn wheel_bound(&self) -> bool {
        self.wheel_bound
    }

    pub fn hover_enter<I: GalleryImage>(&mut self, image: &I) -> WheelBinding {
        if image.in_video_context(&self.config) {
            return self.hover_leave();
        }
        let url = upgrade_quality(&image.src());
        if !is_photo_resource(&url) {
            return self.hover_leave();
        }
        self.gallery = Some(resolve_gallery(image, &self.config));
        self.surface.show(&url);
        if self.wheel_bound {
            return WheelBinding::Unchanged;
        }
        self.wheel_bound = true;
        WheelBinding::Attach
    }

    pub fn hover_leave(&mut self) -> WheelBinding {
        self.surface.hide();
        self.gallery = None;
        if !self.wheel_bound {
            return WheelBinding::Unchanged;
        }
        self.wheel_bound = false;
        WheelBinding::Detach
    }

    pub fn wheel(&mut self, delta_y: f64) -> WheelOutcome {
        let Some(gallery) = self.gallery.as_mut() else {
            return WheelOutcome::PassThrough;
        };
        if gallery.len() <= 1 {
            return WheelOutcome::PassThrough;
        }
        let Some(url) = gallery.step(WheelDirection::from_delta(delta_y)) else {
            return WheelOutcome::PassThrough;
        };
        let url = url.to_string();
        let index = gallery.index();
        self.surface.navigate(&url);
        WheelOutcome::Navigated { index }
    }

    pub fn handle_surface_event(&mut self, event: SurfaceEvent) -> bool {
        self.surface.handle_event(event)
    }
}
