use std::path::Path;

use lexi_core::LoadError;
use lexi_core::audit::{self, AuditReport, EntryChecker};
use serde_json::Value;

use crate::HEADWORD_FIELD;
use crate::entry::ORIGINS;
use crate::generator::{REQUIRED_FIELDS, REQUIRED_FORM_FIELDS};

const ETYMOLOGY_FIELDS: &[&str] = &["origin", "source_language", "chu_nom", "notes"];
const TRANSCRIPTION_FIELDS: &[&str] = &["ipa", "simplified_pronunciation", "tone_pattern"];
const REGIONS: &[&str] = &["northern", "central", "southern"];

pub fn audit_entries(entries: &[Value]) -> AuditReport {
    audit::audit_entries(entries, HEADWORD_FIELD, check_entry)
}

pub fn audit_file(path: &Path) -> Result<AuditReport, LoadError> {
    audit::audit_file(path, HEADWORD_FIELD, check_entry)
}

fn check_entry(checker: &mut EntryChecker<'_>) {
    let entry = checker.entry;

    checker.require(entry, "", REQUIRED_FIELDS);
    checker.non_empty_string(entry, "vietnamese");
    checker.non_empty_array(entry, "syllables");
    checker.frequency(entry);
    checker.pos_codes(entry);

    if let Some(etymology) = entry.get("etymology") {
        checker.require(etymology, "etymology.", ETYMOLOGY_FIELDS);
        checker.one_of(entry, "etymology.origin", ORIGINS);
    }

    checker.non_empty_array(entry, "forms");
    let forms = entry.get("forms").and_then(Value::as_array);
    for (i, form) in forms.into_iter().flatten().enumerate() {
        let scope = format!("forms.{i}.");
        checker.require(form, &scope, REQUIRED_FORM_FIELDS);
        checker.non_empty_string(entry, &format!("{scope}standard"));
        checker.non_empty_array(entry, &format!("{scope}meanings"));

        if let Some(transcriptions) = form.get("transcriptions") {
            checker.require(transcriptions, &format!("{scope}transcriptions."), TRANSCRIPTION_FIELDS);
        }
        if let Some(variants) = form.get("regional_variants") {
            checker.require(variants, &format!("{scope}regional_variants."), REGIONS);
        }
    }
}
