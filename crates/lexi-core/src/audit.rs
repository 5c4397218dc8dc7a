//! Entry-by-entry checks over generated vocabulary files.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::dataset::{LoadError, load_records};
use crate::types::is_failed_entry;

/// Part-of-speech codes the generators are asked to use
pub const POS_CODES: &[&str] = &["a", "n", "v", "m", "r", "d", "c", "p", "y"];

pub const MIN_FREQUENCY: u64 = 1;
pub const MAX_FREQUENCY: u64 = 10000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditIssue {
    pub index: usize,
    pub headword: String,
    pub problem: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditReport {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub failed_entries: usize,
    pub issues: Vec<AuditIssue>,
}

impl AuditReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty() && self.failed_entries == 0
    }
}

/// Collects problems for a single entry
pub struct EntryChecker<'a> {
    pub entry: &'a Value,
    pub problems: Vec<String>,
}

impl<'a> EntryChecker<'a> {
    pub fn new(entry: &'a Value) -> Self {
        Self {
            entry,
            problems: Vec::new(),
        }
    }

    /// Every field must be present on `value`; `scope` prefixes the messages
    pub fn require(&mut self, value: &Value, scope: &str, fields: &[&str]) {
        for field in fields {
            if value.get(field).is_none() {
                self.problems.push(format!("missing field {scope}{field}"));
            }
        }
    }

    pub fn non_empty_array(&mut self, value: &Value, path: &str) {
        if let Some(v) = pointer(value, path) {
            if v.as_array().is_none_or(|a| a.is_empty()) {
                self.problems.push(format!("{path} must be a non-empty array"));
            }
        }
    }

    pub fn non_empty_string(&mut self, value: &Value, path: &str) {
        if let Some(v) = pointer(value, path) {
            if v.as_str().is_none_or(|s| s.trim().is_empty()) {
                self.problems.push(format!("{path} must be a non-empty string"));
            }
        }
    }

    pub fn frequency(&mut self, value: &Value) {
        let Some(raw) = value.get("frequency") else {
            return;
        };

        let parsed = raw
            .as_u64()
            .or_else(|| raw.as_f64().filter(|f| *f >= 0.0 && f.fract() == 0.0).map(|f| f as u64))
            .or_else(|| raw.as_str().and_then(|s| s.trim().parse().ok()));

        match parsed {
            Some(n) if (MIN_FREQUENCY..=MAX_FREQUENCY).contains(&n) => {}
            Some(n) => self
                .problems
                .push(format!("frequency {n} outside {MIN_FREQUENCY}..={MAX_FREQUENCY}")),
            None => self.problems.push(format!("frequency is not a number: {raw}")),
        }
    }

    pub fn pos_codes(&mut self, value: &Value) {
        let Some(codes) = value.get("pos").and_then(Value::as_array) else {
            return;
        };

        if codes.is_empty() {
            self.problems.push("pos must be a non-empty array".to_string());
        }

        for code in codes {
            match code.as_str() {
                Some(c) if POS_CODES.contains(&c) => {}
                _ => self.problems.push(format!("unknown pos code {code}")),
            }
        }
    }

    pub fn one_of(&mut self, value: &Value, path: &str, allowed: &[&str]) {
        if let Some(v) = pointer(value, path).and_then(Value::as_str) {
            if !allowed.contains(&v) {
                self.problems.push(format!("{path} has unexpected value {v:?}"));
            }
        }
    }
}

/// Run `check` over every entry; placeholder entries are counted, not checked
pub fn audit_entries<F>(entries: &[Value], headword_field: &str, check: F) -> AuditReport
where
    F: Fn(&mut EntryChecker<'_>),
{
    let mut report = AuditReport {
        total_entries: entries.len(),
        ..Default::default()
    };

    for (index, entry) in entries.iter().enumerate() {
        if is_failed_entry(entry, headword_field) {
            report.failed_entries += 1;
            continue;
        }

        let mut checker = EntryChecker::new(entry);
        check(&mut checker);

        if checker.problems.is_empty() {
            report.valid_entries += 1;
            continue;
        }

        let headword = entry
            .get(headword_field)
            .and_then(Value::as_str)
            .unwrap_or("?")
            .to_string();

        for problem in checker.problems {
            report.issues.push(AuditIssue {
                index,
                headword: headword.clone(),
                problem,
            });
        }
    }

    tracing::info!(
        "Audited {} entries: {} valid, {} failed, {} issues",
        report.total_entries,
        report.valid_entries,
        report.failed_entries,
        report.issues.len()
    );

    report
}

pub fn audit_file<F>(path: &Path, headword_field: &str, check: F) -> Result<AuditReport, LoadError>
where
    F: Fn(&mut EntryChecker<'_>),
{
    let entries = load_records(path)?;
    Ok(audit_entries(&entries, headword_field, check))
}

/// Look up a dotted path such as `etymology.origin` or `forms.0.meanings`
pub fn pointer<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    let pointer = format!("/{}", path.replace('.', "/"));
    value.pointer(&pointer)
}
