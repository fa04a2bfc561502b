mod common;

use briefdoc::form::{base36, build_briefing, download_filename, resolve_title, title_value};
use briefdoc::{BriefingStamp, FieldEntry, RenderOptions};

#[test]
fn display_label_replaces_underscores_and_uppercases() {
    assert_eq!(FieldEntry::new("nombre_de_contacto", "x").display_label(), "NOMBRE DE CONTACTO");
    assert_eq!(FieldEntry::new("Teléfono", "x").display_label(), "TELÉFONO");
    assert_eq!(FieldEntry::new("__", "x").display_label(), "  ");
}

#[test]
fn title_comes_from_the_empresa_field() {
    let options = RenderOptions::default();
    let entries = vec![
        FieldEntry::new("Contacto", "Ana"),
        FieldEntry::new("Empresa", "Acme Corp"),
    ];
    assert_eq!(title_value(&entries, &options), Some("Acme Corp"));
    assert_eq!(resolve_title(&entries, &options), "Acme Corp");
}

#[test]
fn title_defaults_when_missing_or_empty() {
    let options = RenderOptions::default();
    assert_eq!(resolve_title(&[], &options), "Sin Nombre");
    assert_eq!(
        resolve_title(&[FieldEntry::new("Empresa", "")], &options),
        "Sin Nombre"
    );
    // Label match is exact.
    assert_eq!(
        resolve_title(&[FieldEntry::new("empresa", "Acme")], &options),
        "Sin Nombre"
    );
}

#[test]
fn title_field_is_configurable() {
    let options = RenderOptions {
        title_field: "Proyecto".to_string(),
        ..RenderOptions::default()
    };
    let entries = vec![
        FieldEntry::new("Empresa", "Acme"),
        FieldEntry::new("Proyecto", "Web nueva"),
    ];
    assert_eq!(resolve_title(&entries, &options), "Web nueva");
}

#[test]
fn build_briefing_keeps_every_entry() {
    let options = RenderOptions::default();
    let entries = vec![
        FieldEntry::new("Empresa", "Acme"),
        FieldEntry::new("_csrf", "token"),
        FieldEntry::new("Empresa", "Duplicada"),
    ];
    let briefing = build_briefing(entries.clone(), &options, common::fixed_stamp());
    assert_eq!(briefing.entries, entries);
    assert_eq!(briefing.title.as_deref(), Some("Acme"));

    let untitled = build_briefing(vec![FieldEntry::new("Empresa", "")], &options, common::fixed_stamp());
    assert_eq!(untitled.title, None);
}

#[test]
fn download_filename_has_no_whitespace() {
    assert_eq!(download_filename("Acme Corp"), "Briefing_Acme_Corp.pdf");
    assert_eq!(download_filename("  Acme \t\n Corp  "), "Briefing__Acme_Corp_.pdf");
    assert_eq!(download_filename("Sin Nombre"), "Briefing_Sin_Nombre.pdf");
    assert_eq!(download_filename("Diseño \"Pro\""), "Briefing_Diseño__Pro_.pdf");
    for title in ["a b", " x ", "tab\there", "multi\u{00A0}space"] {
        assert!(!download_filename(title).chars().any(char::is_whitespace), "{title:?}");
    }
}

#[test]
fn base36_matches_known_values() {
    assert_eq!(base36(0), "0");
    assert_eq!(base36(35), "Z");
    assert_eq!(base36(36), "10");
    assert_eq!(base36(1_700_000_000_000), "LOYW3V28");
}

#[test]
fn stamp_has_brief_prefix_and_date_shape() {
    let stamp = BriefingStamp::now();
    assert!(stamp.id.starts_with("BRIEF-"));
    assert!(stamp.id[6..].chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));

    let parts: Vec<&str> = stamp.date.split('/').collect();
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].len(), 2);
    assert_eq!(parts[1].len(), 2);
    assert_eq!(parts[2].len(), 4);
}
