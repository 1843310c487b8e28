use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::debug;
use printpdf::*;

use crate::error::RenderError;
use crate::layout::{
    CutLine, PageInstructions, Placement, CARD_HEIGHT, CARD_WIDTH, PAGE_HEIGHT, PAGE_WIDTH,
};

const MM_TO_PT: f32 = 2.834_646;

/// Walk the instruction stream and write the finished document.
///
/// The stream is consumed strictly in order: the first instruction page
/// reuses the document's initial page, every later one opens a fresh A4
/// page. Failure to create or save the file is fatal to the run.
pub fn render_pdf(pages: &[PageInstructions], output: &Path) -> Result<(), RenderError> {
    let (doc, page1, layer1) =
        PdfDocument::new("Card Proxies", Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");

    for (i, page) in pages.iter().enumerate() {
        debug!(
            "page {} ({:?}): {} placements, {} cut lines",
            page.index,
            page.side,
            page.placements.len(),
            page.cut_lines.len()
        );
        let layer = if i == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (new_page, new_layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(new_page).get_layer(new_layer)
        };
        draw_page(page, &layer);
    }

    let file = File::create(output)?;
    let mut writer = BufWriter::new(file);
    doc.save(&mut writer)
        .map_err(|err| RenderError::Pdf(err.to_string()))?;

    Ok(())
}

fn draw_page(page: &PageInstructions, layer: &PdfLayerReference) {
    for placement in &page.placements {
        draw_placement(placement, layer);
    }
    if !page.cut_lines.is_empty() {
        draw_cut_lines(&page.cut_lines, layer);
    }
}

fn draw_placement(placement: &Placement, layer: &PdfLayerReference) {
    debug!(
        "placing {} at cell ({}, {})",
        placement.name, placement.cell.col, placement.cell.row
    );
    let rgb = placement.image.to_rgb8();
    let (width, height) = rgb.dimensions();

    let image = printpdf::Image::from(ImageXObject {
        width: Px(width as usize),
        height: Px(height as usize),
        color_space: ColorSpace::Rgb,
        bits_per_component: ColorBits::Bit8,
        interpolate: true,
        image_data: rgb.into_raw(),
        image_filter: None,
        clipping_bbox: None,
        smask: None,
    });

    // At 72 dpi 1 px == 1 pt, so scaling by card-size-in-pt over pixel size
    // draws the image at exactly card dimensions.
    let scale_x = CARD_WIDTH * MM_TO_PT / width as f32;
    let scale_y = CARD_HEIGHT * MM_TO_PT / height as f32;

    image.add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(placement.x)),
            translate_y: Some(Mm(placement.y)),
            scale_x: Some(scale_x),
            scale_y: Some(scale_y),
            dpi: Some(72.0),
            ..Default::default()
        },
    );
}

fn draw_cut_lines(lines: &[CutLine], layer: &PdfLayerReference) {
    layer.set_outline_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    layer.set_line_dash_pattern(LineDashPattern {
        dash_1: Some(1),
        gap_1: Some(2),
        ..Default::default()
    });

    for line in lines {
        let points = vec![
            (Point::new(Mm(line.start.0), Mm(line.start.1)), false),
            (Point::new(Mm(line.end.0), Mm(line.end.1)), false),
        ];
        layer.add_line(Line {
            points,
            is_closed: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deck::CardEntry;
    use crate::error::FetchError;
    use crate::layout::{layout_pages, CardArtSource, GridCell, PageSide};
    use image::DynamicImage;
    use std::fs;

    struct TinyArt;

    impl CardArtSource for TinyArt {
        fn card_art(
            &mut self,
            _name: &str,
            _set_code: Option<&str>,
            _collector_number: Option<&str>,
        ) -> Result<DynamicImage, FetchError> {
            Ok(DynamicImage::new_rgb8(4, 4))
        }
    }

    #[test]
    fn renders_an_instruction_stream_to_a_pdf_file() {
        let entries = vec![
            CardEntry {
                front: "A".to_string(),
                back: Some("B".to_string()),
                set_code: None,
                collector_number: None,
            },
            CardEntry {
                front: "C".to_string(),
                back: None,
                set_code: None,
                collector_number: None,
            },
        ];
        let pages = layout_pages(&entries, &mut TinyArt);
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].side, PageSide::Back);
        assert_eq!(pages[1].placements[0].cell, GridCell { col: 2, row: 0 });

        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.pdf");
        render_pdf(&pages, &output).unwrap();

        let bytes = fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn empty_stream_still_writes_a_document() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("empty.pdf");
        render_pdf(&[], &output).unwrap();

        let bytes = fs::read(&output).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
