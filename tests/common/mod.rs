#![allow(dead_code)]

use briefdoc::{Briefing, BriefingStamp, FieldEntry};

pub fn fixed_stamp() -> BriefingStamp {
    BriefingStamp {
        id: "BRIEF-TEST".to_string(),
        date: "17/10/2026".to_string(),
    }
}

/// `n` entries labelled `campo_1..=campo_n`.
pub fn numbered_entries(n: usize) -> Vec<FieldEntry> {
    (1..=n)
        .map(|i| FieldEntry::new(format!("campo_{i}"), format!("valor {i}")))
        .collect()
}

pub fn briefing(title: Option<&str>, entries: Vec<FieldEntry>) -> Briefing {
    Briefing {
        title: title.map(str::to_owned),
        entries,
        stamp: fixed_stamp(),
    }
}

pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    haystack
        .windows(needle.len())
        .filter(|w| *w == needle)
        .count()
}

/// Page objects in a PDF produced by this crate (the page tree node is `/Type /Pages`).
pub fn pdf_page_count(pdf: &[u8]) -> usize {
    count_occurrences(pdf, b"/Type /Page") - count_occurrences(pdf, b"/Type /Pages")
}

pub const BOUNDARY: &str = "briefdoc-test-boundary";

/// Encode text fields as a `multipart/form-data` body using [`BOUNDARY`].
pub fn multipart_body(fields: &[(&str, &str)]) -> String {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

/// A regular/bold TrueType pair installed on this machine, if any.
pub fn system_font_pair() -> Option<(std::path::PathBuf, std::path::PathBuf)> {
    const CANDIDATES: &[(&str, &str)] = &[
        (
            "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        ),
        (
            "/usr/share/fonts/dejavu/DejaVuSans.ttf",
            "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        ),
        (
            "/usr/share/fonts/TTF/DejaVuSans.ttf",
            "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        ),
        (
            "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
            "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
        ),
        (
            "/System/Library/Fonts/Supplemental/Arial.ttf",
            "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
        ),
        ("C:\\Windows\\Fonts\\arial.ttf", "C:\\Windows\\Fonts\\arialbd.ttf"),
    ];
    CANDIDATES.iter().find_map(|(regular, bold)| {
        let (regular, bold) = (std::path::PathBuf::from(regular), std::path::PathBuf::from(bold));
        (regular.is_file() && bold.is_file()).then_some((regular, bold))
    })
}
