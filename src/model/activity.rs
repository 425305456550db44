use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dotted_id::DottedId;

/// Operational domains an activity can be active in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    Land,
    Sea,
    Air,
    Cyber,
    Space,
}

impl Domain {
    pub fn all() -> &'static [Domain] {
        &[Domain::Land, Domain::Sea, Domain::Air, Domain::Cyber, Domain::Space]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Domain::Land => "Land",
            Domain::Sea => "Sea",
            Domain::Air => "Air",
            Domain::Cyber => "Cyber",
            Domain::Space => "Space",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    pub fn all() -> &'static [Priority] {
        &[Priority::Critical, Priority::High, Priority::Medium, Priority::Low]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Critical => "Critical",
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "critical" => Priority::Critical,
            "high" => Priority::High,
            "low" => Priority::Low,
            _ => Priority::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityStatus {
    #[default]
    Planned,
    InProgress,
    Completed,
    Cancelled,
}

impl ActivityStatus {
    pub fn all() -> &'static [ActivityStatus] {
        &[
            ActivityStatus::Planned,
            ActivityStatus::InProgress,
            ActivityStatus::Completed,
            ActivityStatus::Cancelled,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActivityStatus::Planned => "Planned",
            ActivityStatus::InProgress => "In Progress",
            ActivityStatus::Completed => "Completed",
            ActivityStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().replace([' ', '-'], "_").as_str() {
            "in_progress" | "active" | "started" => ActivityStatus::InProgress,
            "completed" | "complete" | "done" | "finished" => ActivityStatus::Completed,
            "cancelled" | "canceled" => ActivityStatus::Cancelled,
            _ => ActivityStatus::Planned,
        }
    }
}

/// Decision points render as stars, decisive points as triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointKind {
    Decision,
    Decisive,
}

impl PointKind {
    pub fn label(&self) -> &'static str {
        match self {
            PointKind::Decision => "Decision Point",
            PointKind::Decisive => "Decisive Point",
        }
    }

    fn field_stem(&self) -> &'static str {
        match self {
            PointKind::Decision => "decisionPoint",
            PointKind::Decisive => "decisivePoint",
        }
    }
}

/// Which of an activity's point fields a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PointSlot {
    /// The single flag + date pair kept for older datasets.
    Legacy,
    /// One of the three labelled points, numbered 1..=3.
    Numbered(u8),
}

/// A labelled point in time attached to an activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyPoint {
    pub label: Option<String>,
    pub date: Option<NaiveDate>,
}

/// The older single decision / decisive point: a free-text flag plus a date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LegacyPoint {
    pub flag: Option<String>,
    pub date: Option<NaiveDate>,
}

impl LegacyPoint {
    pub fn is_set(&self) -> bool {
        self.flag.as_deref().is_some_and(|f| !f.trim().is_empty()) && self.date.is_some()
    }
}

/// An operational activity or investment (OAI), the atomic schedulable unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Activity {
    pub id: Uuid,
    pub objective_name: String,
    pub objective_id: String,
    pub loe_name: String,
    pub loe_id: String,
    pub imo_name: String,
    pub imo_id: String,
    /// Dotted display id, e.g. `1.2.3.1`.
    pub activity_id: String,
    pub description: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub decision_points: [KeyPoint; 3],
    pub decisive_points: [KeyPoint; 3],
    pub legacy_decision: LegacyPoint,
    pub legacy_decisive: LegacyPoint,
    pub land: Option<String>,
    pub sea: Option<String>,
    pub air: Option<String>,
    pub cyber: Option<String>,
    pub space: Option<String>,
    pub depends_on: Option<String>,
    pub branch_notes: Option<String>,
    pub priority: Priority,
    pub status: ActivityStatus,
    pub notes: Option<String>,
}

impl Default for Activity {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            objective_name: String::new(),
            objective_id: String::new(),
            loe_name: String::new(),
            loe_id: String::new(),
            imo_name: String::new(),
            imo_id: String::new(),
            activity_id: String::new(),
            description: String::new(),
            start_date: None,
            end_date: None,
            decision_points: Default::default(),
            decisive_points: Default::default(),
            legacy_decision: LegacyPoint::default(),
            legacy_decisive: LegacyPoint::default(),
            land: None,
            sea: None,
            air: None,
            cyber: None,
            space: None,
            depends_on: None,
            branch_notes: None,
            priority: Priority::Medium,
            status: ActivityStatus::Planned,
            notes: None,
        }
    }
}

impl Activity {
    /// Create an activity placed in the given Objective / LOE / IMO.
    pub fn new(
        objective: impl Into<String>,
        loe: impl Into<String>,
        imo: impl Into<String>,
        activity_id: impl Into<String>,
    ) -> Self {
        Self {
            objective_name: objective.into(),
            loe_name: loe.into(),
            imo_name: imo.into(),
            activity_id: activity_id.into(),
            ..Default::default()
        }
    }

    pub fn dotted_id(&self) -> DottedId {
        DottedId::parse(&self.activity_id)
    }

    pub fn domain_text(&self, domain: Domain) -> Option<&str> {
        let text = match domain {
            Domain::Land => &self.land,
            Domain::Sea => &self.sea,
            Domain::Air => &self.air,
            Domain::Cyber => &self.cyber,
            Domain::Space => &self.space,
        };
        text.as_deref().filter(|t| !t.trim().is_empty())
    }

    pub fn set_domain_text(&mut self, domain: Domain, text: Option<String>) {
        let slot = match domain {
            Domain::Land => &mut self.land,
            Domain::Sea => &mut self.sea,
            Domain::Air => &mut self.air,
            Domain::Cyber => &mut self.cyber,
            Domain::Space => &mut self.space,
        };
        *slot = text;
    }

    /// First domain with non-empty text; drives bar colour.
    pub fn primary_domain(&self) -> Option<Domain> {
        Domain::all()
            .iter()
            .copied()
            .find(|d| self.domain_text(*d).is_some())
    }

    /// Date and label of a point, if the point is present.
    pub fn point(&self, kind: PointKind, slot: PointSlot) -> Option<(NaiveDate, String)> {
        match slot {
            PointSlot::Legacy => {
                let legacy = match kind {
                    PointKind::Decision => &self.legacy_decision,
                    PointKind::Decisive => &self.legacy_decisive,
                };
                if !legacy.is_set() {
                    return None;
                }
                legacy.date.map(|d| (d, kind.label().to_string()))
            }
            PointSlot::Numbered(n) => {
                let point = self.points(kind).get(usize::from(n).checked_sub(1)?)?;
                let label = point
                    .label
                    .clone()
                    .filter(|l| !l.trim().is_empty())
                    .unwrap_or_else(|| format!("{} {}", kind.label(), n));
                point.date.map(|d| (d, label))
            }
        }
    }

    pub fn points(&self, kind: PointKind) -> &[KeyPoint; 3] {
        match kind {
            PointKind::Decision => &self.decision_points,
            PointKind::Decisive => &self.decisive_points,
        }
    }

    pub fn points_mut(&mut self, kind: PointKind) -> &mut [KeyPoint; 3] {
        match kind {
            PointKind::Decision => &mut self.decision_points,
            PointKind::Decisive => &mut self.decisive_points,
        }
    }

    /// Points without a full parent date range are always shown.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => start <= date && date <= end,
            _ => true,
        }
    }

    /// Apply a single field update.
    pub fn apply(&mut self, value: &FieldValue) {
        match value {
            FieldValue::StartDate(d) => self.start_date = Some(*d),
            FieldValue::EndDate(d) => self.end_date = Some(*d),
            FieldValue::PointDate { kind, slot, date } => match slot {
                PointSlot::Legacy => match kind {
                    PointKind::Decision => self.legacy_decision.date = Some(*date),
                    PointKind::Decisive => self.legacy_decisive.date = Some(*date),
                },
                PointSlot::Numbered(n) => {
                    if let Some(point) = usize::from(*n)
                        .checked_sub(1)
                        .and_then(|i| self.points_mut(*kind).get_mut(i))
                    {
                        point.date = Some(*date);
                    }
                }
            },
            FieldValue::ActivityId(id) => self.activity_id = id.clone(),
            FieldValue::ImoId(id) => self.imo_id = id.clone(),
            FieldValue::LoeId(id) => self.loe_id = id.clone(),
        }
    }
}

/// A single field update sent to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldValue {
    StartDate(NaiveDate),
    EndDate(NaiveDate),
    PointDate {
        kind: PointKind,
        slot: PointSlot,
        date: NaiveDate,
    },
    ActivityId(String),
    ImoId(String),
    LoeId(String),
}

impl FieldValue {
    /// Name of the record field this value targets, e.g. `decisionPoint2Date`.
    pub fn field_name(&self) -> String {
        match self {
            FieldValue::StartDate(_) => "startDate".into(),
            FieldValue::EndDate(_) => "endDate".into(),
            FieldValue::PointDate { kind, slot, .. } => match (kind, slot) {
                (PointKind::Decision, PointSlot::Legacy) => "decisionDate".into(),
                (PointKind::Decisive, PointSlot::Legacy) => "dpDate".into(),
                (kind, PointSlot::Numbered(n)) => format!("{}{}Date", kind.field_stem(), n),
            },
            FieldValue::ActivityId(_) => "activityId".into(),
            FieldValue::ImoId(_) => "imoId".into(),
            FieldValue::LoeId(_) => "loeId".into(),
        }
    }
}

/// A batch entry: every field to rewrite on one activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityPatch {
    pub id: Uuid,
    pub fields: Vec<FieldValue>,
}

impl ActivityPatch {
    pub fn apply_to(&self, activity: &mut Activity) {
        for field in &self.fields {
            activity.apply(field);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn numbered_point_falls_back_to_default_label() {
        let mut a = Activity::new("O", "L", "I", "1.1.1.1");
        a.decisive_points[1].date = Some(date(2026, 3, 1));
        let (d, label) = a.point(PointKind::Decisive, PointSlot::Numbered(2)).unwrap();
        assert_eq!(d, date(2026, 3, 1));
        assert_eq!(label, "Decisive Point 2");
        assert!(a.point(PointKind::Decisive, PointSlot::Numbered(1)).is_none());
        assert!(a.point(PointKind::Decisive, PointSlot::Numbered(4)).is_none());
    }

    #[test]
    fn legacy_point_needs_flag_and_date() {
        let mut a = Activity::default();
        a.legacy_decisive.date = Some(date(2026, 1, 1));
        assert!(a.point(PointKind::Decisive, PointSlot::Legacy).is_none());
        a.legacy_decisive.flag = Some("Seize port".into());
        assert!(a.point(PointKind::Decisive, PointSlot::Legacy).is_some());
    }

    #[test]
    fn apply_point_date_targets_exact_slot() {
        let mut a = Activity::default();
        let value = FieldValue::PointDate {
            kind: PointKind::Decision,
            slot: PointSlot::Numbered(3),
            date: date(2027, 6, 30),
        };
        assert_eq!(value.field_name(), "decisionPoint3Date");
        a.apply(&value);
        assert_eq!(a.decision_points[2].date, Some(date(2027, 6, 30)));
        assert!(a.decision_points[0].date.is_none());
    }

    #[test]
    fn primary_domain_ignores_blank_text() {
        let mut a = Activity::default();
        a.land = Some("  ".into());
        a.cyber = Some("Network defence".into());
        assert_eq!(a.primary_domain(), Some(Domain::Cyber));
    }

    #[test]
    fn serializes_with_camel_case_names() {
        let a = Activity::new("O", "L", "I", "1.1.1.1");
        let json = serde_json::to_value(&a).unwrap();
        assert!(json.get("activityId").is_some());
        assert!(json.get("objectiveName").is_some());
        let back: Activity = serde_json::from_value(json).unwrap();
        assert_eq!(back, a);
    }
}
