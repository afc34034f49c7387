use crate::config::PreviewConfig;
use crate::media_url::{is_media_asset, is_photo_resource, upgrade_quality};

/// An image as seen by the gallery resolver. The host page decides what a
/// post is and what counts as a video context.
pub trait GalleryImage: Sized {
    fn src(&self) -> String;
    /// Every image of the enclosing post in document order, or `None` when
    /// the image is not inside a post.
    fn post_images(&self, config: &PreviewConfig) -> Option<Vec<Self>>;
    fn in_video_context(&self, config: &PreviewConfig) -> bool;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelDirection {
    Forward,
    Backward,
}

impl WheelDirection {
    /// Positive is forward. Anything else, zero included, is backward.
    pub fn from_delta(delta_y: f64) -> Self {
        if delta_y > 0.0 {
            WheelDirection::Forward
        } else {
            WheelDirection::Backward
        }
    }
}

/// Ordered, deduplicated photo URLs of one post with a cursor. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gallery {
    entries: Vec<String>,
    index: usize,
}

impl Gallery {
    pub fn new(entries: Vec<String>, start: &str) -> Option<Self> {
        if entries.is_empty() {
            return None;
        }
        let index = entries.iter().position(|entry| entry == start).unwrap_or(0);
        Some(Self { entries, index })
    }

    pub fn singleton(url: String) -> Self {
        Self {
            entries: vec![url],
            index: 0,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &str {
        &self.entries[self.index]
    }

    /// Moves the cursor one step. Returns the new entry, or `None` at either
    /// end so the caller can let the page scroll instead.
    pub fn step(&mut self, direction: WheelDirection) -> Option<&str> {
        let next = match direction {
            WheelDirection::Forward if self.index + 1 < self.entries.len() => self.index + 1,
            WheelDirection::Backward if self.index > 0 => self.index - 1,
            _ => return None,
        };
        self.index = next;
        Some(self.current())
    }
}

pub fn resolve_gallery<I: GalleryImage>(image: &I, config: &PreviewConfig) -> Gallery {
    let hovered = upgrade_quality(&image.src());
    let Some(members) = image.post_images(config) else {
        return Gallery::singleton(hovered);
    };
    let mut entries: Vec<String> = Vec::with_capacity(members.len());
    for member in &members {
        let url = upgrade_quality(&member.src());
        if !is_media_asset(&url, &config.media_segment) {
            continue;
        }
        if member.in_video_context(config) || !is_photo_resource(&url) {
            continue;
        }
        if !entries.contains(&url) {
            entries.push(url);
        }
    }
    Gallery::new(entries, &hovered).unwrap_or_else(|| Gallery::singleton(hovered))
}
