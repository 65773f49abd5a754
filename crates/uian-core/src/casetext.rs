//! Rendering of a case record into embedding input text.

use crate::models::{ClinicalCase, HerbDetail};

/// Push a labeled line for an optional field, omitting absent or empty values.
fn push_opt(lines: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(v) = value {
        if !v.is_empty() {
            lines.push(format!("{}: {}", label, v));
        }
    }
}

/// Render herb entries as "name dose" pairs joined by ", ".
fn herb_line(herbs: &[HerbDetail]) -> String {
    herbs
        .iter()
        .map(|h| {
            if h.dose.is_empty() {
                h.name.clone()
            } else {
                format!("{} {}", h.name, h.dose)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a case record into the single text blob used as embedding input.
///
/// Output is newline-joined labeled lines in a fixed field order; absent
/// or empty optional fields produce no line at all. Pure and deterministic:
/// the same record always yields the identical string.
pub fn normalize(case: &ClinicalCase) -> String {
    let mut lines = Vec::new();

    lines.push(format!("주소증: {}", case.chief_complaint));
    push_opt(&mut lines, "설진", case.tongue_diagnosis.as_deref());
    push_opt(&mut lines, "맥진", case.pulse_diagnosis.as_deref());
    push_opt(&mut lines, "변증", case.pattern_identification.as_deref());
    lines.push(format!("처방: {}", case.prescription));
    if !case.herb_details.is_empty() {
        lines.push(format!("약재: {}", herb_line(&case.herb_details)));
    }
    if let Some(outcome) = case.outcome {
        lines.push(format!("결과: {}", outcome));
    }
    push_opt(&mut lines, "경과", case.outcome_notes.as_deref());
    push_opt(&mut lines, "소견", case.clinical_notes.as_deref());
    push_opt(&mut lines, "배운점", case.learning_points.as_deref());

    lines.join("\n")
}
