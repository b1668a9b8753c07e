//! CSV export of projects and items.
//!
//! Text cells starting with a formula trigger are prefixed with `'`, and
//! cells containing separators, quotes or line breaks are quoted.

use crate::model::item::Item;
use crate::model::project::Project;
use crate::timeline::dates::format_date;
use chrono::NaiveDate;

pub const PROJECT_HEADERS: [&str; 7] = [
    "ID",
    "Name",
    "ISO",
    "Voltage",
    "Capacity",
    "Duration",
    "Target COD",
];
pub const ITEM_HEADERS: [&str; 7] = [
    "Item ID",
    "Project ID",
    "Item Name",
    "Team",
    "Start Date",
    "End Date",
    "Months",
];

const FORMULA_TRIGGERS: [char; 4] = ['=', '+', '-', '@'];

/// Download name for an export produced on `date`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("project_timeline_export_{}.csv", date.format("%Y%m%d"))
}

pub fn projects_to_csv(projects: &[Project]) -> String {
    let rows = projects.iter().map(|project| {
        vec![
            csv_text(&project.id),
            csv_text(&project.name),
            csv_text(&project.iso),
            project.voltage.to_string(),
            project.capacity.to_string(),
            project.duration.to_string(),
            optional_date(project.target_cod),
        ]
    });
    render(&PROJECT_HEADERS, rows)
}

pub fn items_to_csv(items: &[Item]) -> String {
    let rows = items.iter().map(|item| {
        vec![
            csv_text(&item.item_id),
            csv_text(&item.project_id),
            csv_text(&item.item_name),
            item.team.as_str().to_string(),
            optional_date(item.start_date),
            optional_date(item.end_date),
            item.months.to_string(),
        ]
    });
    render(&ITEM_HEADERS, rows)
}

fn render<I>(headers: &[&str], rows: I) -> String
where
    I: Iterator<Item = Vec<String>>,
{
    let mut lines = vec![headers
        .iter()
        .map(|header| csv_text(header))
        .collect::<Vec<_>>()
        .join(",")];
    lines.extend(rows.map(|cells| cells.join(",")));
    let mut out = lines.join("\r\n");
    out.push_str("\r\n");
    out
}

fn optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date).unwrap_or_default()
}

fn neutralize_formula(value: &str) -> String {
    if value.starts_with(FORMULA_TRIGGERS) {
        format!("'{value}")
    } else {
        value.to_string()
    }
}

fn csv_text(value: &str) -> String {
    let safe = neutralize_formula(value);
    if safe.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", safe.replace('"', "\"\""))
    } else {
        safe
    }
}

#[cfg(test)]
mod tests {
    use super::{csv_text, export_file_name, items_to_csv, projects_to_csv};
    use crate::model::item::Item;
    use crate::model::project::Project;
    use crate::model::team::Team;
    use chrono::NaiveDate;

    #[test]
    fn text_cells_are_quoted_and_neutralized() {
        assert_eq!(csv_text("plain"), "plain");
        assert_eq!(csv_text("a,b"), "\"a,b\"");
        assert_eq!(csv_text("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_text("=SUM(A1)"), "'=SUM(A1)");
        assert_eq!(csv_text("@cmd,x"), "\"'@cmd,x\"");
    }

    #[test]
    fn project_csv_has_header_and_blank_missing_cod() {
        let mut project = Project::new("P001", "Solar, One", "CAISO");
        project.voltage = 230;
        project.capacity = 150.5;
        project.duration = 4.0;
        let csv = projects_to_csv(&[project]);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "ID,Name,ISO,Voltage,Capacity,Duration,Target COD");
        assert_eq!(lines[1], "P001,\"Solar, One\",CAISO,230,150.5,4,");
    }

    #[test]
    fn item_csv_writes_canonical_dates() {
        let item = Item::new(
            "I001",
            "P001",
            "Site survey",
            Team::Construction,
            NaiveDate::from_ymd_opt(2025, 1, 1),
            NaiveDate::from_ymd_opt(2025, 3, 15),
        );
        let csv = items_to_csv(&[item]);
        assert_eq!(
            csv.lines().nth(1),
            Some("I001,P001,Site survey,Construction,2025-01-01,2025-03-15,3")
        );
    }

    #[test]
    fn export_name_uses_compact_date() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 4).unwrap();
        assert_eq!(export_file_name(date), "project_timeline_export_20250704.csv");
    }
}
