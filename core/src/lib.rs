pub mod binding;
pub mod config;
pub mod gallery;
pub mod media_url;
pub mod session;
pub mod surface;

pub use binding::{bind_once, BindingMark};
pub use config::{ConfigError, PreviewConfig};
pub use gallery::{resolve_gallery, Gallery, GalleryImage, WheelDirection};
pub use media_url::{
    is_media_asset, is_photo_resource, quality_of, upgrade_quality, MediaQuality,
    MediaQualityError,
};
pub use session::{PreviewSession, WheelBinding, WheelOutcome};
pub use surface::{
    FadeToken, LoadToken, PreviewSurface, SurfaceBackend, SurfaceEvent, SurfaceState,
};
