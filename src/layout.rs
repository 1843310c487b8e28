use image::DynamicImage;
use log::warn;

use crate::deck::CardEntry;
use crate::error::FetchError;

// ============================================================================
// PAGE GEOMETRY
// ============================================================================

// A4 sheet, exact card dimensions, all in millimetres.
pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const CARD_WIDTH: f32 = 63.5;
pub const CARD_HEIGHT: f32 = 88.9;

pub const GRID_COLS: u32 = 3;
pub const GRID_ROWS: u32 = 3;
pub const CARDS_PER_PAGE: usize = (GRID_COLS * GRID_ROWS) as usize;

// Margins centering the 3x3 block on the sheet.
pub const MARGIN_X: f32 = (PAGE_WIDTH - GRID_COLS as f32 * CARD_WIDTH) / 2.0;
pub const MARGIN_Y: f32 = (PAGE_HEIGHT - GRID_ROWS as f32 * CARD_HEIGHT) / 2.0;

/// One of the nine grid positions on a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub col: u32,
    pub row: u32,
}

impl GridCell {
    /// Row-major cell for a slot index 0..8 within a page group.
    pub fn from_slot(slot: usize) -> Self {
        Self {
            col: (slot as u32) % GRID_COLS,
            row: (slot as u32) / GRID_COLS,
        }
    }

    /// Horizontally mirrored cell. A back face placed here lines up with
    /// its front when the duplex sheet is flipped on its vertical axis.
    pub fn mirrored(self) -> Self {
        Self {
            col: GRID_COLS - 1 - self.col,
            row: self.row,
        }
    }

    /// Bottom-left corner of this cell on the page (origin bottom-left,
    /// top row filled first).
    pub fn origin(self) -> (f32, f32) {
        let x = MARGIN_X + self.col as f32 * CARD_WIDTH;
        let y = PAGE_HEIGHT - (MARGIN_Y + (self.row + 1) as f32 * CARD_HEIGHT);
        (x, y)
    }
}

// ============================================================================
// INSTRUCTION STREAM
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSide {
    Front,
    Back,
}

/// Draw this image at this cell. The image is already cache-resolved and
/// overlay-applied; the renderer only has to place it.
#[derive(Debug, Clone)]
pub struct Placement {
    pub name: String,
    pub cell: GridCell,
    pub x: f32,
    pub y: f32,
    pub image: DynamicImage,
}

impl Placement {
    fn new(name: &str, cell: GridCell, image: DynamicImage) -> Self {
        let (x, y) = cell.origin();
        Self {
            name: name.to_string(),
            cell,
            x,
            y,
            image,
        }
    }
}

/// A dashed guide line, drawn edge to edge, millimetre endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutLine {
    pub start: (f32, f32),
    pub end: (f32, f32),
}

/// Everything the renderer needs for one output page, in draw order.
#[derive(Debug, Clone)]
pub struct PageInstructions {
    pub index: usize,
    pub side: PageSide,
    pub placements: Vec<Placement>,
    pub cut_lines: Vec<CutLine>,
}

/// Where the engine gets card images from, requested lazily at placement
/// time. The real implementation is the cache + overlay pipeline; tests
/// substitute stubs.
pub trait CardArtSource {
    fn card_art(
        &mut self,
        name: &str,
        set_code: Option<&str>,
        collector_number: Option<&str>,
    ) -> Result<DynamicImage, FetchError>;
}

// ============================================================================
// LAYOUT
// ============================================================================

/// The four vertical and four horizontal cut guides of a front page.
fn cut_lines() -> Vec<CutLine> {
    let mut lines = Vec::with_capacity(8);
    for k in 0..=GRID_COLS {
        let x = MARGIN_X + k as f32 * CARD_WIDTH;
        lines.push(CutLine {
            start: (x, 0.0),
            end: (x, PAGE_HEIGHT),
        });
    }
    for k in 0..=GRID_ROWS {
        let y = MARGIN_Y + k as f32 * CARD_HEIGHT;
        lines.push(CutLine {
            start: (0.0, y),
            end: (PAGE_WIDTH, y),
        });
    }
    lines
}

/// Lay out the expanded entry list into the ordered page instruction
/// stream.
///
/// Entries are taken in groups of nine. Every group produces a Front page
/// with cut guides; when the job contains any double-faced entry, every
/// group is followed by a Back page holding that group's back faces in
/// mirrored cells — even a group with no back faces gets one, so the
/// front/back pairing holds for the whole document. A card whose image
/// fails to resolve is skipped where it stands: it neither shifts other
/// cells nor aborts the run.
pub fn layout_pages(entries: &[CardEntry], art: &mut dyn CardArtSource) -> Vec<PageInstructions> {
    let has_any_back = entries.iter().any(|entry| entry.back.is_some());
    let mut pages = Vec::new();

    for group in entries.chunks(CARDS_PER_PAGE) {
        let mut placements = Vec::new();
        for (slot, entry) in group.iter().enumerate() {
            match art.card_art(
                &entry.front,
                entry.set_code.as_deref(),
                entry.collector_number.as_deref(),
            ) {
                Ok(image) => {
                    placements.push(Placement::new(&entry.front, GridCell::from_slot(slot), image))
                }
                Err(err) => warn!("skipping {}: {err}", entry.front),
            }
        }
        pages.push(PageInstructions {
            index: pages.len(),
            side: PageSide::Front,
            placements,
            cut_lines: cut_lines(),
        });

        if has_any_back {
            let mut placements = Vec::new();
            for (slot, entry) in group.iter().enumerate() {
                let Some(back) = entry.back.as_deref() else {
                    continue;
                };
                match art.card_art(
                    back,
                    entry.set_code.as_deref(),
                    entry.collector_number.as_deref(),
                ) {
                    Ok(image) => placements.push(Placement::new(
                        back,
                        GridCell::from_slot(slot).mirrored(),
                        image,
                    )),
                    Err(err) => warn!("skipping {back}: {err}"),
                }
            }
            pages.push(PageInstructions {
                index: pages.len(),
                side: PageSide::Back,
                placements,
                cut_lines: Vec::new(),
            });
        }
    }

    pages
}
