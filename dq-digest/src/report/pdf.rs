//! PDF rendering of a laid-out report.

use super::{
    Align, FontWeight, PageLayout, Placed, Report, HEADER_FILL_RGB, PAGE_HEIGHT_MM, PAGE_WIDTH_MM,
};
use crate::prelude::*;
use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};

const LAYER_NAME: &str = "Layer 1";
/// Horizontal padding between a cell border and its text.
const CELL_PADDING_MM: f32 = 1.0;
const PT_TO_MM: f32 = 0.3528;
/// Mean Helvetica glyph width as a fraction of the font size.
const MEAN_GLYPH_WIDTH_EM: f32 = 0.5;
const BORDER_THICKNESS_PT: f32 = 0.5;

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl Fonts {
    fn for_weight(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// Renders `report` into PDF bytes.
pub fn render(report: &Report) -> Result<Vec<u8>> {
    let pages = report.layout();

    let (doc, first_page, first_layer) = PdfDocument::new(
        &report.title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        LAYER_NAME,
    );
    let fonts = Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| DigestError::render("cannot load Helvetica", e))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| DigestError::render("cannot load Helvetica-Bold", e))?,
    };

    for (index, page) in pages.iter().enumerate() {
        let layer = if index == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) =
                doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER_NAME);
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, page, &fonts);
    }

    doc.save_to_bytes()
        .map_err(|e| DigestError::render("cannot serialize PDF", e))
}

fn draw_page(layer: &PdfLayerReference, page: &PageLayout, fonts: &Fonts) {
    let (r, g, b) = HEADER_FILL_RGB;
    let header_fill = Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ));
    let black = Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None));

    layer.set_outline_color(black.clone());
    layer.set_outline_thickness(BORDER_THICKNESS_PT);

    for element in &page.elements {
        if element.is_cell() {
            let (lower, upper) = (
                PAGE_HEIGHT_MM - (element.y + element.height),
                PAGE_HEIGHT_MM - element.y,
            );
            let rect = Rect::new(
                Mm(element.x),
                Mm(lower),
                Mm(element.x + element.width),
                Mm(upper),
            );
            if element.align() == Align::Center {
                layer.set_fill_color(header_fill.clone());
                layer.add_rect(rect.with_mode(PaintMode::FillStroke));
            } else {
                layer.add_rect(rect.with_mode(PaintMode::Stroke));
            }
        }

        layer.set_fill_color(black.clone());
        let (x, baseline) = text_origin(element);
        layer.use_text(
            element.text.as_str(),
            element.font_size(),
            Mm(x),
            Mm(baseline),
            fonts.for_weight(element.weight()),
        );
    }
}

/// Approximate width of `text` at `size` points, in millimetres.
fn text_width_mm(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * MEAN_GLYPH_WIDTH_EM * PT_TO_MM
}

/// PDF coordinates (from the bottom-left) where the text of `element` starts.
fn text_origin(element: &Placed) -> (f32, f32) {
    let size = element.font_size();
    let x = match element.align() {
        Align::Left => element.x + CELL_PADDING_MM,
        Align::Center => {
            element.x + ((element.width - text_width_mm(&element.text, size)) / 2.0).max(0.0)
        }
    };
    // Vertically centre the cap height inside the box.
    let cap_height = size * PT_TO_MM * 0.7;
    let baseline = PAGE_HEIGHT_MM - element.y - (element.height + cap_height) / 2.0;
    (x, baseline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::EvaluationRecord;
    use crate::report::{Role, MARGIN_MM, ROW_HEIGHT_MM};

    #[test]
    fn test_render_produces_pdf() {
        let records = vec![EvaluationRecord::new("Total_Cost", "not-null", true, None)];
        let bytes = render(&Report::new(&records, &records)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn test_render_many_pages() {
        let records: Vec<_> = (0..120)
            .map(|i| EvaluationRecord::new(format!("c{i}"), "in-set", false, None))
            .collect();
        let bytes = render(&Report::new(&records, &[])).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_text_stays_inside_cell() {
        let cell = Placed {
            role: Role::BodyCell,
            text: "not-null".to_string(),
            x: MARGIN_MM,
            y: 40.0,
            width: 80.0,
            height: ROW_HEIGHT_MM,
        };
        let (x, baseline) = text_origin(&cell);
        assert_eq!(x, MARGIN_MM + CELL_PADDING_MM);
        let top = PAGE_HEIGHT_MM - 40.0;
        assert!(baseline < top && baseline > top - ROW_HEIGHT_MM);
    }

    #[test]
    fn test_centered_text() {
        let cell = Placed {
            role: Role::HeaderCell,
            text: "Success".to_string(),
            x: 140.0,
            y: 30.0,
            width: 30.0,
            height: ROW_HEIGHT_MM,
        };
        let (x, _) = text_origin(&cell);
        let width = text_width_mm("Success", 12.0);
        assert!((x - (140.0 + (30.0 - width) / 2.0)).abs() < 1e-4);
    }
}
