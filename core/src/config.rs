use serde::{Deserialize, Serialize};

use crate::media_url::DEFAULT_MEDIA_SEGMENT;

pub const DEFAULT_OVERLAY_ID: &str = "tm-hover-preview";
pub const DEFAULT_BOUND_MARKER: &str = "data-xp-hover-bound";
pub const DEFAULT_FADE_MS: u32 = 150;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("config field `{0}` must not be empty")]
    Empty(&'static str),
    #[error("binding marker `{0}` must be a data- attribute")]
    Marker(String),
    #[error("fade duration must be positive")]
    FadeDuration,
}

/// Runtime knobs for the preview. Every field has a default, so a partial
/// JSON override only replaces what it names.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub hosts: Vec<String>,
    pub overlay_id: String,
    pub bound_marker: String,
    pub media_segment: String,
    pub post_selector: String,
    pub video_player_selectors: Vec<String>,
    pub video_label_words: Vec<String>,
    pub fade_ms: u32,
    pub right_offset_px: u32,
    pub max_width_px: u32,
    pub border_px: u32,
    pub z_index: i32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["x.com".to_string(), "twitter.com".to_string()],
            overlay_id: DEFAULT_OVERLAY_ID.to_string(),
            bound_marker: DEFAULT_BOUND_MARKER.to_string(),
            media_segment: DEFAULT_MEDIA_SEGMENT.to_string(),
            post_selector: "article".to_string(),
            video_player_selectors: vec![
                "[data-testid=\"videoPlayer\"]".to_string(),
                "[data-testid=\"videoPlayerThumbnail\"]".to_string(),
            ],
            video_label_words: vec!["video".to_string(), "動画".to_string()],
            fade_ms: DEFAULT_FADE_MS,
            right_offset_px: 100,
            max_width_px: 1200,
            border_px: 2,
            z_index: 999_999,
        }
    }
}

impl PreviewConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: PreviewConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.hosts.iter().all(|host| host.trim().is_empty()) {
            return Err(ConfigError::Empty("hosts"));
        }
        if self.overlay_id.trim().is_empty() {
            return Err(ConfigError::Empty("overlay_id"));
        }
        if self.post_selector.trim().is_empty() {
            return Err(ConfigError::Empty("post_selector"));
        }
        if self.media_segment.is_empty() {
            return Err(ConfigError::Empty("media_segment"));
        }
        let marker = self.bound_marker.trim();
        if marker.len() <= "data-".len() || !marker.starts_with("data-") {
            return Err(ConfigError::Marker(self.bound_marker.clone()));
        }
        if self.fade_ms == 0 {
            return Err(ConfigError::FadeDuration);
        }
        Ok(())
    }

    /// Matches a configured host or any of its subdomains.
    pub fn matches_host(&self, host: &str) -> bool {
        let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
        if host.is_empty() {
            return false;
        }
        self.hosts.iter().any(|allowed| {
            let allowed = allowed.trim().to_ascii_lowercase();
            if allowed.is_empty() {
                return false;
            }
            host == allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }

    /// Selector matching any ancestor that marks an image as part of a video.
    pub fn video_context_selector(&self) -> String {
        let labels = self
            .video_label_words
            .iter()
            .filter(|word| !word.trim().is_empty())
            .map(|word| format!("[aria-label*=\"{}\" i]", word.replace('"', "\\\"")));
        self.video_player_selectors
            .iter()
            .filter(|selector| !selector.trim().is_empty())
            .cloned()
            .chain(labels)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
