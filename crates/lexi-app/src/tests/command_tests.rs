use lexi_core::dataset::{load_json, write_json};
use lexi_lang_chinese::HskLevel;
use lexi_lang_vietnamese::VietnameseEntry;
use serde_json::{Value, json};

use super::scratch_dir;
use crate::cli::Language;
use crate::commands::{audit_outputs, comparison_report};

fn hsk_entry(simplified: &str) -> Value {
    json!({"simplified": simplified, "forms": [{"transcriptions": {"pinyin": "x"}, "meanings": ["m"]}]})
}

#[test]
fn test_comparison_report() {
    let dir = scratch_dir("compare");
    let exclusive = dir.join("exclusive");
    let inclusive = dir.join("inclusive");

    write_json(&exclusive.join("1.json"), &json!([hsk_entry("爱"), hsk_entry("八")])).unwrap();
    write_json(&exclusive.join("2.json"), &json!([hsk_entry("八"), hsk_entry("帮助")])).unwrap();
    write_json(&inclusive.join("1.json"), &json!([hsk_entry("爱"), hsk_entry("八")])).unwrap();
    write_json(
        &inclusive.join("2.json"),
        &json!([hsk_entry("爱"), hsk_entry("八"), hsk_entry("帮助"), hsk_entry("报纸")]),
    )
    .unwrap();

    let report = comparison_report(&exclusive, &inclusive);

    assert_eq!(report.exclusive.duplicates.get("八"), Some(&vec![1, 2]));
    assert_eq!(report.exclusive.failed_levels.len(), 5);
    assert_eq!(report.comparison.overall.counts(), (3, 0, 1));
    assert_eq!(report.comparison.overall.right_only, vec!["报纸"]);

    let level2 = &report.comparison.per_level[&2];
    assert_eq!(level2.common, vec!["八", "帮助"]);
    assert_eq!(level2.right_only.len(), 2);
}

#[test]
fn test_audit_outputs_reads_level_files() {
    let dir = scratch_dir("audit");
    let failed = VietnameseEntry::failed("老师");
    let mut broken = serde_json::to_value(VietnameseEntry::failed("学生")).unwrap();
    broken["vietnamese"] = json!("học sinh");
    broken["etymology"]["origin"] = json!("martian");

    write_json(&dir.join("vietnamese_raw_1.json"), &json!([failed, broken])).unwrap();

    let reports = audit_outputs(Language::Vietnamese, None, &HskLevel::ALL, &dir).unwrap();
    assert_eq!(reports.len(), 1);

    let report = &reports["vietnamese_raw_1.json"];
    assert_eq!(report.total_entries, 2);
    assert_eq!(report.failed_entries, 1);
    // pos "x" and the unknown origin
    assert_eq!(report.issues.len(), 2);
    assert!(report.issues.iter().all(|i| i.headword == "học sinh"));

    let entries: Vec<Value> = load_json(&dir.join("vietnamese_raw_1.json")).unwrap();
    assert_eq!(entries.len(), 2);
}
