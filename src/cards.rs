use crate::model::{
    Alignment, Briefing, DrawOp, FieldEntry, FontStyle, Page, TextRole, palette,
};

pub const PAGE_WIDTH: f32 = 595.28; // A4
pub const PAGE_HEIGHT: f32 = 841.89;

const MARGIN_LEFT: f32 = 40.0;
const HEADER_HEIGHT: f32 = 100.0;

const TITLE_Y: f32 = 40.0;
const TITLE_WIDTH: f32 = 500.0;
const TITLE_SIZE: f32 = 24.0;
const SUBTITLE_Y: f32 = 75.0;
const SUBTITLE_SIZE: f32 = 10.0;

/// Cursor position of the first card on page 1.
pub const FIRST_CARD_Y: f32 = 140.0;
/// Cursor position of the first card on every following page.
pub const CONTINUATION_TOP: f32 = 50.0;
/// A card whose cursor would exceed this goes on a new page.
pub const PAGE_BREAK_Y: f32 = 750.0;

pub const CARD_HEIGHT: f32 = 40.0;
pub const CARD_SPACING: f32 = 15.0;
/// Cursor advance per entry.
pub const CARD_STEP: f32 = CARD_HEIGHT + CARD_SPACING;

const LABEL_BOX_WIDTH: f32 = 180.0;
const LABEL_BOX_RADIUS: f32 = 5.0;
const LABEL_TEXT_X: f32 = 50.0;
const LABEL_TEXT_DY: f32 = 15.0;
const LABEL_TEXT_WIDTH: f32 = 160.0;
const LABEL_SIZE: f32 = 10.0;

const VALUE_X: f32 = 240.0;
const VALUE_DY: f32 = 14.0;
const VALUE_WIDTH: f32 = 300.0;
const VALUE_SIZE: f32 = 11.0;

const SEPARATOR_DY: f32 = 45.0;
const SEPARATOR_END_X: f32 = 550.0;

const FOOTER_BOTTOM_OFFSET: f32 = 40.0;
const FOOTER_SIZE: f32 = 9.0;

/// Text choices for a rendered briefing.
#[derive(Clone, Debug)]
pub struct RenderOptions {
    /// Form field whose value becomes the document title. Default `"Empresa"`.
    pub title_field: String,
    /// Title used when the title field is missing or empty. Default `"Sin Nombre"`.
    pub default_title: String,
    /// Printed before the title in the header. Default `"Briefing: "`.
    pub title_prefix: String,
    /// Footer line on the last page.
    pub footer_text: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title_field: "Empresa".to_string(),
            default_title: "Sin Nombre".to_string(),
            title_prefix: "Briefing: ".to_string(),
            footer_text: "Reporte generado automáticamente por Web Carmelo Form.".to_string(),
        }
    }
}

impl RenderOptions {
    /// The title to print: the supplied one, or the placeholder when it is
    /// missing or empty.
    pub fn resolve_title<'a>(&'a self, title: Option<&'a str>) -> &'a str {
        match title {
            Some(t) if !t.is_empty() => t,
            _ => &self.default_title,
        }
    }

    pub fn heading(&self, title: Option<&str>) -> String {
        format!("{}{}", self.title_prefix, self.resolve_title(title))
    }
}

/// Owns the vertical cursor and the page being drawn for one layout pass.
struct CardRenderer<'a> {
    options: &'a RenderOptions,
    pages: Vec<Page>,
    current: Page,
    y: f32,
}

impl<'a> CardRenderer<'a> {
    fn new(options: &'a RenderOptions) -> Self {
        let mut renderer = Self {
            options,
            pages: Vec::new(),
            current: Page::default(),
            y: FIRST_CARD_Y,
        };
        renderer.draw_background();
        renderer
    }

    fn draw_background(&mut self) {
        self.current.ops.push(DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            color: palette::BACKGROUND,
        });
    }

    fn draw_header(&mut self, briefing: &Briefing) {
        self.current.ops.push(DrawOp::FillRect {
            x: 0.0,
            y: 0.0,
            width: PAGE_WIDTH,
            height: HEADER_HEIGHT,
            color: palette::CARD,
        });
        self.current.ops.push(DrawOp::Text {
            content: self.options.heading(briefing.title.as_deref()),
            x: MARGIN_LEFT,
            y: TITLE_Y,
            width: Some(TITLE_WIDTH),
            align: Alignment::Left,
            font: FontStyle::Bold,
            size: TITLE_SIZE,
            color: palette::ACCENT,
            role: TextRole::Title,
        });
        self.current.ops.push(DrawOp::Text {
            content: format!(
                "ID: {}  |  Fecha: {}",
                briefing.stamp.id, briefing.stamp.date
            ),
            x: MARGIN_LEFT,
            y: SUBTITLE_Y,
            width: None,
            align: Alignment::Left,
            font: FontStyle::Regular,
            size: SUBTITLE_SIZE,
            color: palette::SUBTITLE,
            role: TextRole::Subtitle,
        });
    }

    fn start_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.draw_background();
        self.y = CONTINUATION_TOP;
    }

    fn draw_entry(&mut self, entry: &FieldEntry) {
        if self.y > PAGE_BREAK_Y {
            self.start_page();
        }
        let y = self.y;

        self.current.ops.push(DrawOp::RoundedRect {
            x: MARGIN_LEFT,
            y,
            width: LABEL_BOX_WIDTH,
            height: CARD_HEIGHT,
            radius: LABEL_BOX_RADIUS,
            color: palette::CARD,
        });
        self.current.ops.push(DrawOp::Text {
            content: entry.display_label(),
            x: LABEL_TEXT_X,
            y: y + LABEL_TEXT_DY,
            width: Some(LABEL_TEXT_WIDTH),
            align: Alignment::Left,
            font: FontStyle::Bold,
            size: LABEL_SIZE,
            color: palette::GOLD,
            role: TextRole::Label,
        });
        self.current.ops.push(DrawOp::Text {
            content: entry.value.clone(),
            x: VALUE_X,
            y: y + VALUE_DY,
            width: Some(VALUE_WIDTH),
            align: Alignment::Left,
            font: FontStyle::Regular,
            size: VALUE_SIZE,
            color: palette::TEXT,
            role: TextRole::Value,
        });
        self.current.ops.push(DrawOp::Line {
            x1: MARGIN_LEFT,
            y1: y + SEPARATOR_DY,
            x2: SEPARATOR_END_X,
            y2: y + SEPARATOR_DY,
            width: 1.0,
            color: palette::BORDER,
        });

        self.y += CARD_STEP;
    }

    // No overflow check here: the footer stays on the current page even when
    // the last card sits close to the bottom edge.
    fn draw_footer(&mut self) {
        self.current.ops.push(DrawOp::Text {
            content: self.options.footer_text.clone(),
            x: 0.0,
            y: PAGE_HEIGHT - FOOTER_BOTTOM_OFFSET,
            width: Some(PAGE_WIDTH),
            align: Alignment::Center,
            font: FontStyle::Regular,
            size: FOOTER_SIZE,
            color: palette::FOOTER,
            role: TextRole::Footer,
        });
    }

    fn finish(mut self) -> Vec<Page> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Lay out a briefing into pages. Never fails; an empty entry list yields a
/// single page with background, header and footer.
pub fn layout_briefing(briefing: &Briefing, options: &RenderOptions) -> Vec<Page> {
    let mut renderer = CardRenderer::new(options);
    renderer.draw_header(briefing);
    for entry in &briefing.entries {
        renderer.draw_entry(entry);
    }
    renderer.draw_footer();
    renderer.finish()
}

/// Number of pages `layout_briefing` produces for `n` entries.
pub fn page_count_for(n: usize) -> usize {
    let first = cards_per_page(FIRST_CARD_Y);
    if n <= first {
        return 1;
    }
    let rest = cards_per_page(CONTINUATION_TOP);
    1 + (n - first).div_ceil(rest)
}

fn cards_per_page(top: f32) -> usize {
    ((PAGE_BREAK_Y - top) / CARD_STEP).floor() as usize + 1
}
