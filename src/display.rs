use std::io::Write;

use crate::data::{AssignmentRecord, ReplacementPlan};

/// Column headings, in display order.
pub const PLAN_COLUMNS: [&str; 11] = [
    "Absent Teacher",
    "Day",
    "Period",
    "Class",
    "Subject",
    "Substitute Teacher",
    "Same Subject",
    "Daily Load",
    "Substitutions Today",
    "Score",
    "Reason",
];

const NO_SUBSTITUTE: &str = "-";

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One record as display cells, matching [`PLAN_COLUMNS`].
pub fn plan_row(record: &AssignmentRecord) -> [String; 11] {
    [
        record.absent_teacher.clone(),
        record.day.to_string(),
        record.period.to_string(),
        record.class_name.clone(),
        record.subject.clone(),
        record
            .substitute_teacher
            .clone()
            .unwrap_or_else(|| NO_SUBSTITUTE.to_string()),
        if record.is_same_subject { "yes" } else { "no" }.to_string(),
        optional(record.daily_load),
        optional(record.substitutions_today),
        optional(record.score),
        record.reason.clone(),
    ]
}

/// Writes the plan as CSV with a heading row.
pub fn write_plan_csv<W: Write>(plan: &ReplacementPlan, writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(PLAN_COLUMNS)?;
    for record in &plan.assignments {
        writer.write_record(plan_row(record))?;
    }
    writer.flush()?;
    Ok(())
}

/// Renders the plan as an aligned plain-text table followed by a summary line.
pub fn format_plan_table(plan: &ReplacementPlan) -> String {
    let rows: Vec<[String; 11]> = plan.assignments.iter().map(plan_row).collect();

    let mut widths = PLAN_COLUMNS.map(|heading| heading.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let headings = PLAN_COLUMNS.map(str::to_string);
    let mut out = render(&headings);
    out.push('\n');
    out.push_str(
        &widths
            .iter()
            .map(|&w| "-".repeat(w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    out.push('\n');
    for row in &rows {
        out.push_str(&render(row));
        out.push('\n');
    }
    out.push_str(&format!("{} on {}\n", plan.summary, plan.day));
    out
}
