/// Generation tag of one `show`/`navigate` request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LoadToken(pub u64);

/// Generation tag of one scheduled fade-out.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FadeToken(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceState {
    Hidden,
    Loading,
    Visible,
}

/// Completions reported back by the backend, possibly long after the request
/// that caused them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SurfaceEvent {
    Loaded(LoadToken),
    LoadFailed(LoadToken),
    FadeFinished(FadeToken),
}

/// Side effects of the preview surface. Loads and fades complete
/// asynchronously through [`SurfaceEvent`]s fed to
/// [`PreviewSurface::handle_event`].
pub trait SurfaceBackend {
    fn begin_load(&mut self, token: LoadToken, url: &str);
    fn set_source(&mut self, url: &str);
    fn set_displayed(&mut self, displayed: bool);
    fn set_opacity(&mut self, opacity: f32);
    fn schedule_fade_out(&mut self, token: FadeToken);
}

#[derive(Clone, Debug)]
struct PendingLoad {
    token: LoadToken,
    url: String,
}

pub struct PreviewSurface<B: SurfaceBackend> {
    backend: B,
    state: SurfaceState,
    opacity: f32,
    displayed: bool,
    source: Option<String>,
    pending: Option<PendingLoad>,
    next_load: u64,
    fade: u64,
}

impl<B: SurfaceBackend> PreviewSurface<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: SurfaceState::Hidden,
            opacity: 0.0,
            displayed: false,
            source: None,
            pending: None,
            next_load: 0,
            fade: 0,
        }
    }

    pub fn state(&self) -> SurfaceState {
        self.state
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn displayed(&self) -> bool {
        self.displayed
    }

    /// URL of the most recently completed load.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn pending_url(&self) -> Option<&str> {
        self.pending.as_ref().map(|pending| pending.url.as_str())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Starts a fresh preview. The old frame is faded to transparent until the
    /// new asset has decoded.
    pub fn show(&mut self, url: &str) -> LoadToken {
        self.fade = self.fade.wrapping_add(1);
        self.apply_opacity(0.0);
        self.state = SurfaceState::Loading;
        self.request(url)
    }

    /// Swaps the image in place once it has decoded, without the fade used by
    /// [`show`](Self::show).
    pub fn navigate(&mut self, url: &str) -> LoadToken {
        if self.state == SurfaceState::Hidden {
            return self.show(url);
        }
        self.fade = self.fade.wrapping_add(1);
        self.request(url)
    }

    /// Fades out and drops any in-flight load. Display is removed once the
    /// fade finishes, unless something re-showed the surface in the meantime.
    pub fn hide(&mut self) {
        self.pending = None;
        self.apply_opacity(0.0);
        if !self.displayed {
            self.state = SurfaceState::Hidden;
            return;
        }
        self.fade = self.fade.wrapping_add(1);
        self.backend.schedule_fade_out(FadeToken(self.fade));
    }

    /// Returns true when the event changed what is on screen.
    pub fn handle_event(&mut self, event: SurfaceEvent) -> bool {
        match event {
            SurfaceEvent::Loaded(token) => self.load_complete(token),
            SurfaceEvent::LoadFailed(token) => self.load_failed(token),
            SurfaceEvent::FadeFinished(token) => self.fade_finished(token),
        }
    }

    pub fn load_complete(&mut self, token: LoadToken) -> bool {
        let Some(pending) = self.take_pending(token) else {
            return false;
        };
        self.backend.set_source(&pending.url);
        self.source = Some(pending.url);
        if !self.displayed {
            self.displayed = true;
            self.backend.set_displayed(true);
        }
        self.apply_opacity(1.0);
        self.state = SurfaceState::Visible;
        true
    }

    /// A failed load leaves the surface where it was.
    pub fn load_failed(&mut self, token: LoadToken) -> bool {
        self.take_pending(token);
        false
    }

    pub fn fade_finished(&mut self, token: FadeToken) -> bool {
        if token != FadeToken(self.fade) || self.opacity != 0.0 || !self.displayed {
            return false;
        }
        self.displayed = false;
        self.backend.set_displayed(false);
        self.state = SurfaceState::Hidden;
        true
    }

    fn request(&mut self, url: &str) -> LoadToken {
        self.next_load = self.next_load.wrapping_add(1);
        let token = LoadToken(self.next_load);
        self.pending = Some(PendingLoad {
            token,
            url: url.to_string(),
        });
        self.backend.begin_load(token, url);
        token
    }

    fn take_pending(&mut self, token: LoadToken) -> Option<PendingLoad> {
        if self.pending.as_ref().map(|pending| pending.token) != Some(token) {
            return None;
        }
        self.pending.take()
    }

    fn apply_opacity(&mut self, opacity: f32) {
        if self.opacity == opacity {
            return;
        }
        self.opacity = opacity;
        self.backend.set_opacity(opacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct NullBackend {
        loads: Vec<LoadToken>,
        fades: Vec<FadeToken>,
    }

    impl SurfaceBackend for NullBackend {
        fn begin_load(&mut self, token: LoadToken, _url: &str) {
            self.loads.push(token);
        }
        fn set_source(&mut self, _url: &str) {}
        fn set_displayed(&mut self, _displayed: bool) {}
        fn set_opacity(&mut self, _opacity: f32) {}
        fn schedule_fade_out(&mut self, token: FadeToken) {
            self.fades.push(token);
        }
    }

    #[test]
    fn tokens_increase_per_request() {
        let mut surface = PreviewSurface::new(NullBackend::default());
        let first = surface.show("a");
        let second = surface.navigate("b");
        assert!(second > first);
        assert_eq!(surface.backend().loads, vec![first, second]);
    }

    #[test]
    fn hide_before_first_load_goes_straight_to_hidden() {
        let mut surface = PreviewSurface::new(NullBackend::default());
        let token = surface.show("a");
        surface.hide();
        assert_eq!(surface.state(), SurfaceState::Hidden);
        assert!(surface.backend().fades.is_empty());
        assert!(!surface.load_complete(token));
        assert!(!surface.displayed());
    }

    #[test]
    fn navigate_from_hidden_acts_like_show() {
        let mut surface = PreviewSurface::new(NullBackend::default());
        surface.navigate("a");
        assert_eq!(surface.state(), SurfaceState::Loading);
        assert_eq!(surface.pending_url(), Some("a"));
    }

    #[test]
    fn failed_load_keeps_state() {
        let mut surface = PreviewSurface::new(NullBackend::default());
        let token = surface.show("a");
        assert!(!surface.handle_event(SurfaceEvent::LoadFailed(token)));
        assert_eq!(surface.state(), SurfaceState::Loading);
        assert_eq!(surface.pending_url(), None);
    }
}
