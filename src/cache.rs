use std::fs;
use std::io;
use std::path::PathBuf;

use image::DynamicImage;
use log::debug;

use crate::error::FetchError;
use crate::layout::CardArtSource;
use crate::overlay::ArtOverlay;
use crate::scryfall::{CardApi, Quality};

/// Disk-backed card image store, keyed by card name. A file at
/// `<root>/<name>.png` is the cache hit; its content is trusted and never
/// revalidated against the network. Misses go through the wrapped
/// [`CardApi`] exactly once and persist what they download.
///
/// The quality tier picks which resolution variant is requested on a miss;
/// it is not part of the cache key, so a run should stick to one tier.
#[derive(Debug)]
pub struct CardImageCache<A: CardApi> {
    api: A,
    root: PathBuf,
    quality: Quality,
}

impl<A: CardApi> CardImageCache<A> {
    pub fn new(api: A, root: impl Into<PathBuf>, quality: Quality) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { api, root, quality })
    }

    fn image_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.png"))
    }

    /// Return the image for `name`, fetching and persisting it on a miss.
    /// Set code and collector number, when both present, select the exact
    /// printing; otherwise the lookup is by exact name.
    pub fn fetch(
        &self,
        name: &str,
        set_code: Option<&str>,
        collector_number: Option<&str>,
    ) -> Result<DynamicImage, FetchError> {
        let path = self.image_path(name);
        if path.exists() {
            debug!("cache hit: {name}");
            // The stored bytes are whatever the API served (the large and
            // normal tiers are JPEG despite the .png path), so decode by
            // content rather than by extension.
            return Ok(image::load_from_memory(&fs::read(&path)?)?);
        }

        debug!("cache miss: {name}");
        let card = self.api.lookup(name, set_code, collector_number)?;
        debug!("resolved {name} as {}", card.name);
        let url = card
            .face_image_url(name, self.quality)
            .ok_or_else(|| FetchError::NotFound { name: name.to_string() })?
            .to_string();
        let bytes = self.api.download(name, &url)?;
        fs::write(&path, &bytes)?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

/// The image provider the layout engine sees: cache fetch first, then any
/// custom-art overlay composited on top.
#[derive(Debug)]
pub struct ArtPipeline<A: CardApi> {
    cache: CardImageCache<A>,
    overlay: ArtOverlay,
}

impl<A: CardApi> ArtPipeline<A> {
    pub fn new(cache: CardImageCache<A>, overlay: ArtOverlay) -> Self {
        Self { cache, overlay }
    }
}

impl<A: CardApi> CardArtSource for ArtPipeline<A> {
    fn card_art(
        &mut self,
        name: &str,
        set_code: Option<&str>,
        collector_number: Option<&str>,
    ) -> Result<DynamicImage, FetchError> {
        let base = self.cache.fetch(name, set_code, collector_number)?;
        Ok(self.overlay.apply(base, name))
    }
}
