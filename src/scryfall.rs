use std::io::Read;

use serde::Deserialize;

use crate::error::FetchError;

const API_ROOT: &str = "https://api.scryfall.com";

/// Image resolution variant requested from the card database. The tier also
/// fixes where the illustration sits inside the frame, which is what the
/// custom-art overlay needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quality {
    Normal,
    Large,
    Png,
}

/// Pixel rectangle of the illustration within a card scan, as (left, top,
/// right, bottom) offsets for the tier's resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtBox {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl ArtBox {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

impl Quality {
    pub fn resolution(self) -> (u32, u32) {
        match self {
            Quality::Normal => (488, 680),
            Quality::Large => (672, 936),
            Quality::Png => (745, 1040),
        }
    }

    pub fn art_box(self) -> ArtBox {
        match self {
            Quality::Normal => ArtBox { left: 35, top: 70, right: 375, bottom: 310 },
            Quality::Large => ArtBox { left: 52, top: 105, right: 620, bottom: 520 },
            Quality::Png => ArtBox { left: 59, top: 118, right: 687, bottom: 578 },
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ImageUris {
    pub normal: Option<String>,
    pub large: Option<String>,
    pub png: Option<String>,
}

impl ImageUris {
    fn url(&self, quality: Quality) -> Option<&str> {
        match quality {
            Quality::Normal => self.normal.as_deref(),
            Quality::Large => self.large.as_deref(),
            Quality::Png => self.png.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CardFace {
    pub name: String,
    pub image_uris: Option<ImageUris>,
}

/// The slice of a card-lookup response this tool consumes. Unknown fields
/// are ignored.
#[derive(Debug, Deserialize, Clone)]
pub struct ApiCard {
    pub name: String,
    pub image_uris: Option<ImageUris>,
    pub card_faces: Option<Vec<CardFace>>,
}

impl ApiCard {
    /// Resolve the image URL for the requested face name. Multi-faced cards
    /// carry per-face `image_uris`; the face whose recorded name equals the
    /// request wins. Single-faced cards use the card-level `image_uris`.
    pub fn face_image_url(&self, name: &str, quality: Quality) -> Option<&str> {
        match &self.card_faces {
            Some(faces) if faces.first().is_some_and(|f| f.image_uris.is_some()) => faces
                .iter()
                .find(|face| face.name == name)
                .and_then(|face| face.image_uris.as_ref())
                .and_then(|uris| uris.url(quality)),
            _ => self.image_uris.as_ref().and_then(|uris| uris.url(quality)),
        }
    }
}

/// Card-database access as the cache sees it: one metadata lookup, one raw
/// byte download. Implemented by [`ScryfallClient`] for real runs and by
/// counting stubs in tests.
pub trait CardApi {
    fn lookup(
        &self,
        name: &str,
        set_code: Option<&str>,
        collector_number: Option<&str>,
    ) -> Result<ApiCard, FetchError>;

    fn download(&self, name: &str, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// Live client. Requests are blocking and unauthenticated; a non-success
/// lookup status means the card does not exist under that identifier.
#[derive(Debug, Default)]
pub struct ScryfallClient;

impl CardApi for ScryfallClient {
    fn lookup(
        &self,
        name: &str,
        set_code: Option<&str>,
        collector_number: Option<&str>,
    ) -> Result<ApiCard, FetchError> {
        let url = match (set_code, collector_number) {
            (Some(set), Some(number)) => {
                format!("{API_ROOT}/cards/{}/{}", set.to_lowercase(), number)
            }
            _ => format!("{API_ROOT}/cards/named?exact={}", urlencoding::encode(name)),
        };

        let response = ureq::get(&url).call().map_err(|_| FetchError::NotFound {
            name: name.to_string(),
        })?;

        serde_json::from_reader(response.into_reader()).map_err(|_| FetchError::NotFound {
            name: name.to_string(),
        })
    }

    fn download(&self, name: &str, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = ureq::get(url).call().map_err(|err| FetchError::Download {
            name: name.to_string(),
            reason: err.to_string(),
        })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|err| FetchError::Download {
                name: name.to_string(),
                reason: err.to_string(),
            })?;

        Ok(bytes)
    }
}
