use std::fmt;

use url::Url;

pub const QUALITY_PARAM: &str = "name";
pub const DEFAULT_MEDIA_SEGMENT: &str = "/media/";

const PHOTO_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
const VIDEO_SEGMENT_PREFIXES: &[&str] = &["amplify_video", "ext_tw_video", "tweet_video"];
const VIDEO_PATH_MARKERS: &[&str] = &["video_thumb", "animated_gif"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MediaQuality {
    Small,
    Medium,
    Large,
    Orig,
}

impl MediaQuality {
    pub const ALL: [MediaQuality; 4] = [
        MediaQuality::Small,
        MediaQuality::Medium,
        MediaQuality::Large,
        MediaQuality::Orig,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MediaQuality::Small => "small",
            MediaQuality::Medium => "medium",
            MediaQuality::Large => "large",
            MediaQuality::Orig => "orig",
        }
    }
}

impl fmt::Display for MediaQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaQuality {
    type Err = MediaQualityError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        MediaQuality::ALL
            .into_iter()
            .find(|quality| quality.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| MediaQualityError::Unknown(value.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaQualityError {
    Unknown(String),
}

impl fmt::Display for MediaQualityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaQualityError::Unknown(value) => write!(f, "unknown media size '{value}'"),
        }
    }
}

impl std::error::Error for MediaQualityError {}

/// Rewrites a thumbnail URL so it points at the original-resolution asset.
///
/// A `name` query parameter is forced to `orig`, and a trailing `:small`,
/// `:medium`, `:large` or `:orig` suffix becomes `:orig`. Input that does not
/// parse as a URL comes back unchanged. Applying this twice is the same as
/// applying it once.
pub fn upgrade_quality(url: &str) -> String {
    let Ok(mut parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let has_quality_param = parsed.query_pairs().any(|(key, _)| key == QUALITY_PARAM);
    if has_quality_param {
        set_quality_param(&mut parsed);
    }
    replace_size_suffix(parsed.as_str())
}

/// Query-parameter variant first, then the `:size` suffix.
pub fn quality_of(url: &str) -> Option<MediaQuality> {
    let parsed = Url::parse(url).ok()?;
    if let Some(value) = query_value(&parsed, QUALITY_PARAM) {
        return value.parse().ok();
    }
    let (_, suffix) = parsed.as_str().rsplit_once(':')?;
    suffix.parse().ok()
}

/// True when `url` names a static photo rather than a video or animated-gif
/// thumbnail. Malformed URLs are never photos.
pub fn is_photo_resource(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path().to_ascii_lowercase();
    if has_video_segment(&path) {
        return false;
    }
    if VIDEO_PATH_MARKERS.iter().any(|marker| path.contains(marker)) {
        return false;
    }
    if let Some(mime) = query_value(&parsed, "mimetype") {
        if mime.starts_with("video") {
            return false;
        }
    }
    if let Some(format) = query_value(&parsed, "format").filter(|value| !value.is_empty()) {
        return is_photo_extension(&format);
    }
    match path.rsplit_once('.') {
        Some((_, extension)) => is_photo_extension(extension),
        None => false,
    }
}

pub fn is_media_asset(url: &str, segment: &str) -> bool {
    !segment.is_empty() && url.contains(segment)
}

fn set_quality_param(parsed: &mut Url) {
    let mut replaced = false;
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .filter_map(|(key, value)| {
            if key != QUALITY_PARAM {
                return Some((key.into_owned(), value.into_owned()));
            }
            if replaced {
                return None;
            }
            replaced = true;
            Some((key.into_owned(), MediaQuality::Orig.as_str().to_string()))
        })
        .collect();
    parsed.query_pairs_mut().clear().extend_pairs(pairs);
}

fn replace_size_suffix(url: &str) -> String {
    let Some((head, suffix)) = url.rsplit_once(':') else {
        return url.to_string();
    };
    if suffix.parse::<MediaQuality>().is_ok() {
        format!("{head}:{}", MediaQuality::Orig)
    } else {
        url.to_string()
    }
}

fn query_value(parsed: &Url, key: &str) -> Option<String> {
    parsed
        .query_pairs()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

fn is_photo_extension(value: &str) -> bool {
    PHOTO_EXTENSIONS
        .iter()
        .any(|extension| extension.eq_ignore_ascii_case(value))
}

// `path` is already lowercased.
fn has_video_segment(path: &str) -> bool {
    VIDEO_SEGMENT_PREFIXES.iter().any(|prefix| {
        path.match_indices(prefix).any(|(start, _)| {
            let before = path[..start].chars().next_back();
            let after = path[start + prefix.len()..].chars().next();
            matches!(before, None | Some('/')) && matches!(after, None | Some('_') | Some('/'))
        })
    })
}
