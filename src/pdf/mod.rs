mod layout;

use std::collections::HashSet;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::cards::{PAGE_HEIGHT, PAGE_WIDTH};
use crate::error::Error;
use crate::fonts::{FontConfig, FontSet, register_font};
use crate::model::{Alignment, Color, DrawOp, FontStyle, Page};

use layout::wrap_text;

const ASCENDER_RATIO: f32 = 0.75;
const LINE_HEIGHT_RATIO: f32 = 1.2;
// Cubic Bézier control distance for a quarter circle
const KAPPA: f32 = 0.552_284_8;

fn set_fill(content: &mut Content, [r, g, b]: Color) {
    content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

fn set_stroke(content: &mut Content, [r, g, b]: Color) {
    content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

/// Flip a top-origin `y` to PDF's bottom-left origin.
fn flip(y: f32) -> f32 {
    PAGE_HEIGHT - y
}

/// `x`, `y` is the top-left corner in top-origin coordinates.
fn rounded_rect_path(content: &mut Content, x: f32, y: f32, width: f32, height: f32, radius: f32) {
    let bottom = flip(y + height);
    let r = radius.min(width / 2.0).min(height / 2.0);
    if r <= 0.0 {
        content.rect(x, bottom, width, height);
        return;
    }
    let c = r * KAPPA;
    let right = x + width;
    let top = bottom + height;

    content.move_to(x + r, bottom);
    content.line_to(right - r, bottom);
    content.cubic_to(right - r + c, bottom, right, bottom + r - c, right, bottom + r);
    content.line_to(right, top - r);
    content.cubic_to(right, top - r + c, right - r + c, top, right - r, top);
    content.line_to(x + r, top);
    content.cubic_to(x + r - c, top, x, top - r + c, x, top - r);
    content.line_to(x, bottom + r);
    content.cubic_to(x, bottom + r - c, x + r - c, bottom, x + r, bottom);
    content.close_path();
}

fn render_text(
    content: &mut Content,
    fonts: &FontSet,
    text: &str,
    x: f32,
    y: f32,
    width: Option<f32>,
    align: Alignment,
    style: FontStyle,
    size: f32,
    color: Color,
) {
    let entry = fonts.get(style);
    let lines = wrap_text(text, entry, size, width);
    if lines.iter().all(|l| l.text.is_empty()) {
        return;
    }

    set_fill(content, color);
    content.begin_text();
    content.set_font(Name(entry.pdf_name.as_bytes()), size);

    let first_baseline = flip(y + size * ASCENDER_RATIO);
    let line_h = size * LINE_HEIGHT_RATIO;
    let (mut td_x, mut td_y) = (0.0f32, 0.0f32);

    for (i, line) in lines.iter().enumerate() {
        if line.text.is_empty() {
            continue;
        }
        let line_x = match (align, width) {
            (Alignment::Center, Some(w)) => x + (w - line.width) / 2.0,
            (Alignment::Right, Some(w)) => x + w - line.width,
            _ => x,
        };
        let line_y = first_baseline - i as f32 * line_h;

        content.next_line(line_x - td_x, line_y - td_y);
        td_x = line_x;
        td_y = line_y;
        content.show(Str(&entry.encode(&line.text)));
    }
    content.end_text();
}

fn render_page(page: &Page, fonts: &FontSet) -> Content {
    let mut content = Content::new();

    for op in &page.ops {
        match op {
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color,
            } => {
                set_fill(&mut content, *color);
                content.rect(*x, flip(y + height), *width, *height);
                content.fill_nonzero();
            }
            DrawOp::RoundedRect {
                x,
                y,
                width,
                height,
                radius,
                color,
            } => {
                set_fill(&mut content, *color);
                rounded_rect_path(&mut content, *x, *y, *width, *height, *radius);
                content.fill_nonzero();
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                content.save_state();
                set_stroke(&mut content, *color);
                content.set_line_width(*width);
                content.move_to(*x1, flip(*y1));
                content.line_to(*x2, flip(*y2));
                content.stroke();
                content.restore_state();
            }
            DrawOp::Text {
                content: text,
                x,
                y,
                width,
                align,
                font,
                size,
                color,
                ..
            } => render_text(
                &mut content,
                fonts,
                text,
                *x,
                *y,
                *width,
                *align,
                *font,
                *size,
                *color,
            ),
        }
    }

    content
}

fn used_chars(pages: &[Page], style: FontStyle) -> HashSet<char> {
    let mut chars: HashSet<char> = pages
        .iter()
        .flat_map(|p| p.ops.iter())
        .filter_map(|op| match op {
            DrawOp::Text { content, font, .. } if *font == style => Some(content.chars()),
            _ => None,
        })
        .flatten()
        .collect();
    chars.insert(' ');
    chars
}

/// Serialize laid-out pages into a PDF document.
pub fn render_pdf(pages: &[Page], title: &str, font_config: &FontConfig) -> Result<Vec<u8>, Error> {
    if pages.is_empty() {
        return Err(Error::Pdf("document has no pages".into()));
    }
    let t0 = std::time::Instant::now();
    let mut pdf = Pdf::new();
    let mut next_id = 1i32;
    let mut alloc = || {
        let r = Ref::new(next_id);
        next_id += 1;
        r
    };

    let catalog_id = alloc();
    let pages_id = alloc();
    let info_id = alloc();

    let fonts = FontSet {
        regular: register_font(
            &mut pdf,
            FontStyle::Regular,
            "F1".to_string(),
            font_config,
            &used_chars(pages, FontStyle::Regular),
            &mut alloc,
        ),
        bold: register_font(
            &mut pdf,
            FontStyle::Bold,
            "F2".to_string(),
            font_config,
            &used_chars(pages, FontStyle::Bold),
            &mut alloc,
        ),
    };

    let t_fonts = t0.elapsed();

    let n = pages.len();
    let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
    let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

    for (i, page) in pages.iter().enumerate() {
        let raw = render_page(page, &fonts).finish();
        let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
        pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
    }

    pdf.catalog(catalog_id).pages(pages_id);
    pdf.pages(pages_id)
        .kids(page_ids.iter().copied())
        .count(n as i32);

    for i in 0..n {
        let mut page = pdf.page(page_ids[i]);
        page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT))
            .parent(pages_id)
            .contents(content_ids[i]);
        let mut resources = page.resources();
        let mut font_dict = resources.fonts();
        for entry in fonts.iter() {
            font_dict.pair(Name(entry.pdf_name.as_bytes()), entry.font_ref);
        }
    }

    pdf.document_info(info_id)
        .title(TextStr(title))
        .producer(TextStr("briefdoc"));

    let t_assembly = t0.elapsed();

    log::info!(
        "Serialize phases: fonts={:.1}ms, pages={:.1}ms ({} pages)",
        t_fonts.as_secs_f64() * 1000.0,
        (t_assembly - t_fonts).as_secs_f64() * 1000.0,
        n,
    );

    Ok(pdf.finish())
}
