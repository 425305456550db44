use std::path::Path;

use chrono::NaiveDate;

use crate::error::ExportError;
use crate::model::activity::Domain;
use crate::model::{Activity, PointKind};

/// Column set written by [`export_csv`]; re-importable by `import_csv`.
pub const EXPORT_HEADERS: [&str; 36] = [
    "Objective_Title",
    "Objective_ID",
    "LOE_Title",
    "LOE_ID",
    "IMO_Title",
    "IMO_ID",
    "OAI_ID",
    "OAI_Description",
    "Land",
    "Sea",
    "Air",
    "Cyber",
    "Space",
    "Decisive_Point",
    "DP_Date",
    "Decision_Point",
    "Decision_Date",
    "Start_Date",
    "End_Date",
    "Decision_Point_1_Label",
    "Decision_Point_1_Date",
    "Decision_Point_2_Label",
    "Decision_Point_2_Date",
    "Decision_Point_3_Label",
    "Decision_Point_3_Date",
    "Decisive_Point_1_Label",
    "Decisive_Point_1_Date",
    "Decisive_Point_2_Label",
    "Decisive_Point_2_Date",
    "Decisive_Point_3_Label",
    "Decisive_Point_3_Date",
    "Depends_On",
    "Branch_Notes",
    "Notes",
    "Priority",
    "Status",
];

fn date(d: Option<NaiveDate>) -> String {
    d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn text(t: &Option<String>) -> String {
    t.clone().unwrap_or_default()
}

fn row(activity: &Activity) -> Vec<String> {
    let mut row = vec![
        activity.objective_name.clone(),
        activity.objective_id.clone(),
        activity.loe_name.clone(),
        activity.loe_id.clone(),
        activity.imo_name.clone(),
        activity.imo_id.clone(),
        activity.activity_id.clone(),
        activity.description.clone(),
    ];
    row.extend(
        Domain::all()
            .iter()
            .map(|d| activity.domain_text(*d).unwrap_or_default().to_string()),
    );
    row.extend([
        text(&activity.legacy_decisive.flag),
        date(activity.legacy_decisive.date),
        text(&activity.legacy_decision.flag),
        date(activity.legacy_decision.date),
        date(activity.start_date),
        date(activity.end_date),
    ]);
    for kind in [PointKind::Decision, PointKind::Decisive] {
        for point in activity.points(kind) {
            row.push(text(&point.label));
            row.push(date(point.date));
        }
    }
    row.extend([
        text(&activity.depends_on),
        text(&activity.branch_notes),
        text(&activity.notes),
        activity.priority.label().to_lowercase(),
        activity.status.label().to_lowercase().replace(' ', "_"),
    ]);
    row
}

/// Export activities to a comma-delimited CSV file matching the import format.
///
/// Returns the number of activities written.
pub fn export_csv(activities: &[Activity], path: &Path) -> Result<usize, ExportError> {
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(EXPORT_HEADERS)?;
    for activity in activities {
        wtr.write_record(row(activity))?;
    }
    wtr.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(activities.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::csv_import::parse_csv;
    use crate::model::PointSlot;

    #[test]
    fn every_row_matches_the_header_width() {
        let activity = Activity::new("O", "L", "I", "1.1.1");
        assert_eq!(row(&activity).len(), EXPORT_HEADERS.len());
    }

    #[test]
    fn exported_file_imports_back() {
        let mut activity = Activity::new("Secure the region", "Maritime", "Patrols", "1.1.1.2");
        activity.objective_id = "1".into();
        activity.loe_id = "1.1".into();
        activity.imo_id = "1.1.1".into();
        activity.description = "Escort convoys, day and night".into();
        activity.air = Some("Maritime patrol aircraft".into());
        activity.start_date = NaiveDate::from_ymd_opt(2026, 2, 1);
        activity.end_date = NaiveDate::from_ymd_opt(2026, 9, 30);
        activity.decisive_points[2].label = Some("Convoy lanes open".into());
        activity.decisive_points[2].date = NaiveDate::from_ymd_opt(2026, 7, 1);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.csv");
        assert_eq!(export_csv(std::slice::from_ref(&activity), &path).unwrap(), 1);

        let content = std::fs::read_to_string(&path).unwrap();
        let (imported, skipped) = parse_csv(&content).unwrap();
        assert_eq!(skipped, 0);
        let back = &imported[0];
        assert_eq!(back.activity_id, "1.1.1.2");
        assert_eq!(back.description, activity.description);
        assert_eq!(back.air, activity.air);
        assert_eq!(back.end_date, activity.end_date);
        assert_eq!(
            back.point(PointKind::Decisive, PointSlot::Numbered(3)),
            activity.point(PointKind::Decisive, PointSlot::Numbered(3))
        );
    }
}
