use std::path::PathBuf;

use image::imageops::FilterType;
use image::{imageops, DynamicImage};
use log::{debug, warn};

use crate::scryfall::Quality;

/// Custom-art substitution: a file named `<card name>_alter.png` next to the
/// run replaces the illustration region of that card's base image.
#[derive(Debug, Clone)]
pub struct ArtOverlay {
    dir: PathBuf,
    quality: Quality,
}

impl ArtOverlay {
    pub fn new(dir: impl Into<PathBuf>, quality: Quality) -> Self {
        Self { dir: dir.into(), quality }
    }

    /// Composite any matching overlay into the art box for this run's
    /// quality tier. The overlay is resized to the exact art-box size and
    /// pasted as an opaque overwrite; no blending. Without an overlay file
    /// the base image passes through untouched.
    pub fn apply(&self, base: DynamicImage, name: &str) -> DynamicImage {
        let path = self.dir.join(format!("{name}_alter.png"));
        if !path.exists() {
            return base;
        }

        let art = match image::open(&path) {
            Ok(art) => art,
            Err(err) => {
                warn!("ignoring unreadable overlay {}: {err}", path.display());
                return base;
            }
        };

        let (expected_width, expected_height) = self.quality.resolution();
        if base.width() != expected_width || base.height() != expected_height {
            debug!(
                "base image for {name} is {}x{}, art box assumes {expected_width}x{expected_height}",
                base.width(),
                base.height()
            );
        }

        let art_box = self.quality.art_box();
        let art = art.resize_exact(art_box.width(), art_box.height(), FilterType::Lanczos3);

        let mut composed = base.to_rgba8();
        imageops::replace(
            &mut composed,
            &art.to_rgba8(),
            i64::from(art_box.left),
            i64::from(art_box.top),
        );
        DynamicImage::ImageRgba8(composed)
    }
}
