use std::env;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::Context;

mod cache;
mod deck;
mod error;
mod layout;
mod overlay;
mod pdf;
mod scryfall;

use crate::cache::{ArtPipeline, CardImageCache};
use crate::overlay::ArtOverlay;
use crate::scryfall::{Quality, ScryfallClient};

const OUTPUT_FILE: &str = "mtg_proxies.pdf";
const CACHE_DIR: &str = "images";

/// Per-run settings. Paths are relative to the working directory; the
/// deck file is the only thing taken from the command line.
struct RunConfig {
    cache_dir: PathBuf,
    overlay_dir: PathBuf,
    output: PathBuf,
    quality: Quality,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from(CACHE_DIR),
            overlay_dir: PathBuf::from("."),
            output: PathBuf::from(OUTPUT_FILE),
            quality: Quality::Large,
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: proxysheet <deck_file>");
        process::exit(1);
    }

    if let Err(err) = run(Path::new(&args[1]), &RunConfig::default()) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}

fn run(deck_path: &Path, config: &RunConfig) -> anyhow::Result<()> {
    let entries = deck::load_deck(deck_path)
        .with_context(|| format!("failed to read deck file {}", deck_path.display()))?;

    let cache = CardImageCache::new(ScryfallClient, &config.cache_dir, config.quality)
        .with_context(|| format!("failed to create cache directory {}", config.cache_dir.display()))?;
    let overlay = ArtOverlay::new(&config.overlay_dir, config.quality);
    let mut art = ArtPipeline::new(cache, overlay);

    let pages = layout::layout_pages(&entries, &mut art);
    pdf::render_pdf(&pages, &config.output)
        .with_context(|| format!("failed to write {}", config.output.display()))?;

    println!("PDF created: {}", config.output.display());
    Ok(())
}
