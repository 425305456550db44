use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::ImportError;
use crate::model::activity::{ActivityStatus, Domain, Priority};
use crate::model::{Activity, PointKind};

/// Date formats accepted in date columns, tried in order.
const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d", "%d-%m-%Y", "%d.%m.%Y", "%m-%d-%Y",
];

/// Try parsing a date string with several common formats.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    // Timestamps such as `2026-01-15T00:00:00Z` keep only the date part.
    let s = s.split('T').next().unwrap_or(s);
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Detect delimiter by checking the first line for common separators.
fn detect_delimiter(first_line: &str) -> u8 {
    let semicolons = first_line.matches(';').count();
    let commas = first_line.matches(',').count();
    let tabs = first_line.matches('\t').count();

    if commas >= semicolons && commas >= tabs {
        b','
    } else if semicolons >= tabs {
        b';'
    } else {
        b'\t'
    }
}

/// Normalize a header string to a canonical column key.
fn normalize_header(h: &str) -> String {
    h.trim().to_lowercase().replace([' ', '-', '_'], "")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Column {
    Objective,
    ObjectiveId,
    Loe,
    LoeId,
    Imo,
    ImoId,
    ActivityId,
    Description,
    Domain(Domain),
    LegacyFlag(PointKind),
    LegacyDate(PointKind),
    Start,
    End,
    PointLabel(PointKind, u8),
    PointDate(PointKind, u8),
    DependsOn,
    BranchNotes,
    Notes,
    Priority,
    Status,
}

/// `decisionpoint2label` -> `(Decision, 2, "label")`
fn numbered_point(normalized: &str) -> Option<(PointKind, u8, &str)> {
    let (kind, rest) = if let Some(rest) = normalized.strip_prefix("decisionpoint") {
        (PointKind::Decision, rest)
    } else {
        (PointKind::Decisive, normalized.strip_prefix("decisivepoint")?)
    };
    let mut chars = rest.chars();
    let n = chars.next()?.to_digit(10)?;
    (1..=3)
        .contains(&n)
        .then(|| (kind, n as u8, chars.as_str()))
}

fn header_to_col(normalized: &str) -> Option<Column> {
    if let Some((kind, n, field)) = numbered_point(normalized) {
        return match field {
            "label" => Some(Column::PointLabel(kind, n)),
            "date" => Some(Column::PointDate(kind, n)),
            _ => None,
        };
    }
    match normalized {
        "objectivetitle" | "objective" => Some(Column::Objective),
        "objectiveid" => Some(Column::ObjectiveId),
        "loetitle" | "loe" | "lineofeffort" => Some(Column::Loe),
        "loeid" => Some(Column::LoeId),
        "imotitle" | "imo" => Some(Column::Imo),
        "imoid" => Some(Column::ImoId),
        "oaiid" | "suboaiid" => Some(Column::ActivityId),
        "oaidescription" | "description" => Some(Column::Description),
        "land" => Some(Column::Domain(Domain::Land)),
        "sea" => Some(Column::Domain(Domain::Sea)),
        "air" => Some(Column::Domain(Domain::Air)),
        "cyber" => Some(Column::Domain(Domain::Cyber)),
        "space" => Some(Column::Domain(Domain::Space)),
        "decisivepoint" => Some(Column::LegacyFlag(PointKind::Decisive)),
        "decisionpoint" => Some(Column::LegacyFlag(PointKind::Decision)),
        "dpdate" => Some(Column::LegacyDate(PointKind::Decisive)),
        "decisiondate" => Some(Column::LegacyDate(PointKind::Decision)),
        "startdate" | "start" => Some(Column::Start),
        "enddate" | "end" => Some(Column::End),
        "dependson" => Some(Column::DependsOn),
        "branchnotes" => Some(Column::BranchNotes),
        "notes" => Some(Column::Notes),
        "priority" => Some(Column::Priority),
        "status" => Some(Column::Status),
        _ => None,
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Fill `slot` only if nothing earlier in the row already did.
fn first_text(slot: &mut String, value: &str) {
    if slot.is_empty() {
        *slot = value.trim().to_string();
    }
}

fn date_field(value: &str, row: usize, column: &str) -> Option<NaiveDate> {
    if value.trim().is_empty() {
        return None;
    }
    let parsed = parse_date(value);
    if parsed.is_none() {
        warn!(row, column, value, "unparsable date left empty");
    }
    parsed
}

/// Import activities from an operational-approach CSV file.
///
/// Returns `(activities, skipped_count)` on success.
pub fn import_csv(path: &Path) -> Result<(Vec<Activity>, usize), ImportError> {
    let content = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_csv(&content)
}

/// Parse CSV text. Delimiter is detected from the header line.
pub fn parse_csv(content: &str) -> Result<(Vec<Activity>, usize), ImportError> {
    let content = content.trim_start_matches('\u{feff}');
    let first_line = content.lines().next().unwrap_or("");
    let delimiter = detect_delimiter(first_line);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = reader.headers()?.clone();
    let col_map: Vec<Option<Column>> = headers
        .iter()
        .map(|h| header_to_col(&normalize_header(h)))
        .collect();

    let has = |wanted: Column| col_map.iter().any(|c| *c == Some(wanted));
    if !has(Column::Objective) || !has(Column::Loe) || !has(Column::Imo) {
        return Err(ImportError::MissingColumns {
            found: headers.iter().map(str::to_string).collect(),
        });
    }

    let mut activities = Vec::new();
    let mut skipped = 0usize;

    for (i, result) in reader.records().enumerate() {
        let row = i + 2;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(row, error = %e, "skipping malformed CSV row");
                skipped += 1;
                continue;
            }
        };
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let mut activity = Activity::default();
        for (col_idx, field) in record.iter().enumerate() {
            let Some(Some(column)) = col_map.get(col_idx) else {
                continue;
            };
            let header = headers.get(col_idx).unwrap_or_default();
            match *column {
                Column::Objective => first_text(&mut activity.objective_name, field),
                Column::ObjectiveId => first_text(&mut activity.objective_id, field),
                Column::Loe => first_text(&mut activity.loe_name, field),
                Column::LoeId => first_text(&mut activity.loe_id, field),
                Column::Imo => first_text(&mut activity.imo_name, field),
                Column::ImoId => first_text(&mut activity.imo_id, field),
                Column::ActivityId => first_text(&mut activity.activity_id, field),
                Column::Description => first_text(&mut activity.description, field),
                Column::Domain(domain) => {
                    let text = non_empty(field);
                    match domain {
                        Domain::Land => activity.land = text,
                        Domain::Sea => activity.sea = text,
                        Domain::Air => activity.air = text,
                        Domain::Cyber => activity.cyber = text,
                        Domain::Space => activity.space = text,
                    }
                }
                Column::LegacyFlag(PointKind::Decision) => activity.legacy_decision.flag = non_empty(field),
                Column::LegacyFlag(PointKind::Decisive) => activity.legacy_decisive.flag = non_empty(field),
                Column::LegacyDate(PointKind::Decision) => {
                    activity.legacy_decision.date = date_field(field, row, header)
                }
                Column::LegacyDate(PointKind::Decisive) => {
                    activity.legacy_decisive.date = date_field(field, row, header)
                }
                Column::Start => activity.start_date = date_field(field, row, header),
                Column::End => activity.end_date = date_field(field, row, header),
                Column::PointLabel(kind, n) => {
                    point_slot(&mut activity, kind, n).label = non_empty(field)
                }
                Column::PointDate(kind, n) => {
                    point_slot(&mut activity, kind, n).date = date_field(field, row, header)
                }
                Column::DependsOn => activity.depends_on = non_empty(field),
                Column::BranchNotes => activity.branch_notes = non_empty(field),
                Column::Notes => activity.notes = non_empty(field),
                Column::Priority => activity.priority = Priority::parse(field),
                Column::Status => activity.status = ActivityStatus::parse(field),
            }
        }

        if activity.objective_name.is_empty()
            || activity.loe_name.is_empty()
            || activity.imo_name.is_empty()
        {
            warn!(row, "skipping row without objective, LOE and IMO names");
            skipped += 1;
            continue;
        }
        activities.push(activity);
    }

    if activities.is_empty() {
        return Err(ImportError::Empty { skipped });
    }
    debug!(imported = activities.len(), skipped, "CSV parsed");
    Ok((activities, skipped))
}

fn point_slot(activity: &mut Activity, kind: PointKind, n: u8) -> &mut crate::model::activity::KeyPoint {
    let points = match kind {
        PointKind::Decision => &mut activity.decision_points,
        PointKind::Decisive => &mut activity.decisive_points,
    };
    // Column parsing only yields 1..=3.
    &mut points[usize::from(n.clamp(1, 3)) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PointSlot;

    const SAMPLE: &str = "\
Objective_Title,Objective_ID,LOE_Title,LOE_ID,IMO_Title,IMO_ID,OAI_ID,OAI_Description,Land,Sea,Start_Date,End_Date,Decisive_Point,DP_Date,Decision_Point_2_Label,Decision_Point_2_Date,Priority,Status
Secure the region,1,Maritime security,1.1,Coastal patrols,1.1.1,1.1.1.1,Establish patrol schedule,,Frigates,2026-01-01,2026-12-31,Port secured,2026-06-01,Go / no-go,2026-03-15,High,In Progress
Secure the region,1,Maritime security,1.1,Coastal patrols,1.1.1,1.1.1.2,Train partner navy,Trainers,,01/15/2026,not a date,,,,,,
,1,Maritime security,1.1,Coastal patrols,1.1.1,1.1.1.3,Orphan row,,,,,,,,,,
";

    #[test]
    fn imports_hierarchy_dates_and_points() {
        let (activities, skipped) = parse_csv(SAMPLE).unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(skipped, 1);

        let first = &activities[0];
        assert_eq!(first.objective_name, "Secure the region");
        assert_eq!(first.imo_id, "1.1.1");
        assert_eq!(first.activity_id, "1.1.1.1");
        assert_eq!(first.sea.as_deref(), Some("Frigates"));
        assert!(first.land.is_none());
        assert_eq!(first.priority, Priority::High);
        assert_eq!(first.status, ActivityStatus::InProgress);
        let (date, label) = first
            .point(PointKind::Decision, PointSlot::Numbered(2))
            .unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        assert_eq!(label, "Go / no-go");
        assert!(first.point(PointKind::Decisive, PointSlot::Legacy).is_some());

        let second = &activities[1];
        assert_eq!(second.start_date, NaiveDate::from_ymd_opt(2026, 1, 15));
        assert!(second.end_date.is_none());
        assert_eq!(second.priority, Priority::Medium);
        assert_eq!(second.status, ActivityStatus::Planned);
    }

    #[test]
    fn headers_match_loosely() {
        assert_eq!(header_to_col(&normalize_header("Sub OAI ID")), Some(Column::ActivityId));
        assert_eq!(
            header_to_col(&normalize_header("decisive-point-3-date")),
            Some(Column::PointDate(PointKind::Decisive, 3))
        );
        assert_eq!(header_to_col(&normalize_header("Decision_Point_4_Date")), None);
        assert_eq!(header_to_col(&normalize_header("LOE")), Some(Column::Loe));
    }

    #[test]
    fn missing_hierarchy_columns_is_an_error() {
        let err = parse_csv("Task,Start,End\nA,2026-01-01,2026-02-01\n").unwrap_err();
        assert!(matches!(err, ImportError::MissingColumns { .. }));
    }

    #[test]
    fn semicolon_files_are_detected() {
        let csv = "Objective;LOE;IMO;OAI_ID\nO;L;I;1.1.1\n";
        let (activities, _) = parse_csv(csv).unwrap();
        assert_eq!(activities[0].activity_id, "1.1.1");
    }

    #[test]
    fn file_without_usable_rows_is_empty() {
        let err = parse_csv("Objective,LOE,IMO\n,,x\n").unwrap_err();
        assert!(matches!(err, ImportError::Empty { skipped: 1 }));
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("approach.csv");
        std::fs::write(&path, SAMPLE).unwrap();
        let (activities, _) = import_csv(&path).unwrap();
        assert_eq!(activities.len(), 2);
        let missing = import_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(missing, ImportError::Io { .. }));
    }
}
