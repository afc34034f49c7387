#![allow(dead_code)]

use std::rc::Rc;

use xpreview_core::{FadeToken, GalleryImage, LoadToken, PreviewConfig, SurfaceBackend};

pub struct Post {
    pub images: Vec<(String, bool)>,
    pub native_video: bool,
}

/// Image inside an in-memory post. The flag next to each source marks an
/// image nested in a video player.
#[derive(Clone)]
pub enum FakeImage {
    Lone(String),
    InPost(Rc<Post>, usize),
}

impl FakeImage {
    pub fn post(images: &[(&str, bool)], native_video: bool) -> Vec<FakeImage> {
        let post = Rc::new(Post {
            images: images
                .iter()
                .map(|(src, video)| (src.to_string(), *video))
                .collect(),
            native_video,
        });
        (0..images.len())
            .map(|slot| FakeImage::InPost(post.clone(), slot))
            .collect()
    }

    pub fn photos(srcs: &[&str]) -> Vec<FakeImage> {
        let images: Vec<(&str, bool)> = srcs.iter().map(|src| (*src, false)).collect();
        Self::post(&images, false)
    }
}

impl GalleryImage for FakeImage {
    fn src(&self) -> String {
        match self {
            FakeImage::Lone(src) => src.clone(),
            FakeImage::InPost(post, slot) => post.images[*slot].0.clone(),
        }
    }

    fn post_images(&self, _config: &PreviewConfig) -> Option<Vec<Self>> {
        match self {
            FakeImage::Lone(_) => None,
            FakeImage::InPost(post, _) => Some(
                (0..post.images.len())
                    .map(|slot| FakeImage::InPost(post.clone(), slot))
                    .collect(),
            ),
        }
    }

    fn in_video_context(&self, _config: &PreviewConfig) -> bool {
        match self {
            FakeImage::Lone(_) => false,
            FakeImage::InPost(post, slot) => post.native_video || post.images[*slot].1,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Load(LoadToken, String),
    Source(String),
    Displayed(bool),
    Opacity(f32),
    Fade(FadeToken),
}

#[derive(Default)]
pub struct RecordingBackend {
    pub calls: Vec<Call>,
}

impl RecordingBackend {
    pub fn last_load(&self) -> Option<(LoadToken, String)> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::Load(token, url) => Some((*token, url.clone())),
            _ => None,
        })
    }

    pub fn last_fade(&self) -> Option<FadeToken> {
        self.calls.iter().rev().find_map(|call| match call {
            Call::Fade(token) => Some(*token),
            _ => None,
        })
    }

    pub fn sources(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Source(url) => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn opacities(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Opacity(value) => Some(*value),
                _ => None,
            })
            .collect()
    }
}

impl SurfaceBackend for RecordingBackend {
    fn begin_load(&mut self, token: LoadToken, url: &str) {
        self.calls.push(Call::Load(token, url.to_string()));
    }

    fn set_source(&mut self, url: &str) {
        self.calls.push(Call::Source(url.to_string()));
    }

    fn set_displayed(&mut self, displayed: bool) {
        self.calls.push(Call::Displayed(displayed));
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.calls.push(Call::Opacity(opacity));
    }

    fn schedule_fade_out(&mut self, token: FadeToken) {
        self.calls.push(Call::Fade(token));
    }
}

pub fn media(id: &str, size: &str) -> String {
    format!("https://pbs.twimg.com/media/{id}?format=jpg&name={size}")
}
