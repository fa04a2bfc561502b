pub mod cards;
mod error;
mod fonts;
pub mod form;
pub mod gdocs;
pub mod model;
mod pdf;
pub mod server;

pub use cards::{RenderOptions, layout_briefing};
pub use error::Error;
pub use fonts::FontConfig;
pub use model::{Briefing, BriefingStamp, FieldEntry};
pub use pdf::render_pdf;

use std::path::Path;
use std::time::Instant;

/// Lay out a briefing and serialize it to PDF bytes.
pub fn render_briefing_pdf(
    briefing: &Briefing,
    options: &RenderOptions,
    fonts: &FontConfig,
) -> Result<Vec<u8>, Error> {
    let t0 = Instant::now();

    let pages = layout_briefing(briefing, options);
    let t_layout = t0.elapsed();

    let heading = options.heading(briefing.title.as_deref());
    let bytes = render_pdf(&pages, &heading, fonts)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: layout={:.1}ms, serialize={:.1}ms, total={:.1}ms ({} entries, {} pages, {} bytes)",
        t_layout.as_secs_f64() * 1000.0,
        (t_total - t_layout).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        briefing.entries.len(),
        pages.len(),
        bytes.len(),
    );

    Ok(bytes)
}

pub fn render_briefing_to_file(
    briefing: &Briefing,
    options: &RenderOptions,
    fonts: &FontConfig,
    output: &Path,
) -> Result<(), Error> {
    let bytes = render_briefing_pdf(briefing, options, fonts)?;
    std::fs::write(output, &bytes).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, output.display())))
    })
}
