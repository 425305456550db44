use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::activity::{Activity, ActivityPatch, FieldValue};
use super::dotted_id::DottedId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetStatus {
    #[default]
    Draft,
    InReview,
    Approved,
    Archived,
}

impl DatasetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DatasetStatus::Draft => "Draft",
            DatasetStatus::InReview => "In Review",
            DatasetStatus::Approved => "Approved",
            DatasetStatus::Archived => "Archived",
        }
    }
}

/// Free-text context shown around the timeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Narrative {
    pub problem_statement: Option<String>,
    pub current_environment: Option<String>,
    pub desired_end_state: Option<String>,
    pub objective_conditions: Option<String>,
    pub effects: Option<String>,
    pub communication_narrative: Option<String>,
}

impl Narrative {
    /// Non-empty blocks paired with their panel titles, in display order.
    pub fn blocks(&self) -> Vec<(&'static str, &str)> {
        [
            ("Current Operational Environment", &self.current_environment),
            ("Problem Statement", &self.problem_statement),
            ("Desired Future State", &self.desired_end_state),
            ("Objective Desired Conditions", &self.objective_conditions),
            ("Effects", &self.effects),
            ("Core Communication Narrative", &self.communication_narrative),
        ]
        .into_iter()
        .filter_map(|(title, text)| {
            text.as_deref()
                .filter(|t| !t.trim().is_empty())
                .map(|t| (title, t))
        })
        .collect()
    }
}

/// A named operational approach: activities plus narrative context.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub narrative: Narrative,
    #[serde(default)]
    pub status: DatasetStatus,
    #[serde(default)]
    pub activities: Vec<Activity>,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

impl Default for Dataset {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: "Untitled Approach".to_string(),
            description: None,
            narrative: Narrative::default(),
            status: DatasetStatus::Draft,
            activities: Vec::new(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn activity(&self, id: Uuid) -> Option<&Activity> {
        self.activities.iter().find(|a| a.id == id)
    }

    /// Apply one field update. Returns `false` if the activity is unknown.
    pub fn apply_update(&mut self, id: Uuid, value: &FieldValue) -> bool {
        match self.activities.iter_mut().find(|a| a.id == id) {
            Some(activity) => {
                activity.apply(value);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Overwrite the stored record with the same id.
    pub fn replace_activity(&mut self, activity: &Activity) -> bool {
        match self.activities.iter_mut().find(|a| a.id == activity.id) {
            Some(slot) => {
                *slot = activity.clone();
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Append a new activity. Returns `false` if its id is already taken.
    pub fn add_activity(&mut self, activity: Activity) -> bool {
        if self.activity(activity.id).is_some() {
            return false;
        }
        self.activities.push(activity);
        self.touch();
        true
    }

    pub fn remove_activity(&mut self, id: Uuid) -> Option<Activity> {
        let index = self.activities.iter().position(|a| a.id == id)?;
        self.touch();
        Some(self.activities.remove(index))
    }

    pub fn set_narrative(&mut self, narrative: Narrative) {
        self.narrative = narrative;
        self.touch();
    }

    /// Dotted id for a new activity placed in the same IMO as `template`:
    /// one past the highest sibling position under the IMO id.
    pub fn next_activity_id(&self, template: &Activity) -> String {
        let mut prefix = DottedId::parse(&template.imo_id);
        if prefix.is_empty() {
            prefix = template.dotted_id().parent();
        }
        let last = self
            .activities
            .iter()
            .filter(|a| {
                a.objective_name == template.objective_name
                    && a.loe_name == template.loe_name
                    && a.imo_name == template.imo_name
            })
            .map(|a| a.dotted_id())
            .filter(|id| id.parent() == prefix)
            .filter_map(|id| id.segments().last().copied())
            .max()
            .unwrap_or(0);
        prefix.child(last + 1).to_string()
    }

    /// Apply a batch of patches; ids that are not present are skipped.
    pub fn apply_patches(&mut self, patches: &[ActivityPatch]) -> usize {
        let mut applied = 0;
        for patch in patches {
            if let Some(activity) = self.activities.iter_mut().find(|a| a.id == patch.id) {
                patch.apply_to(activity);
                applied += 1;
            }
        }
        if applied > 0 {
            self.touch();
        }
        applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn narrative_blocks_skip_blank_text() {
        let narrative = Narrative {
            problem_statement: Some("Adversary holds the strait".into()),
            effects: Some("   ".into()),
            ..Default::default()
        };
        let blocks = narrative.blocks();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].0, "Problem Statement");
    }

    fn patrol(id: &str) -> Activity {
        let mut a = Activity::new("Secure", "Maritime", "Patrols", id);
        a.imo_id = "1.1.1".into();
        a
    }

    #[test]
    fn next_activity_id_follows_the_highest_sibling() {
        let mut dataset = Dataset::new("Test");
        dataset.activities = vec![patrol("1.1.1.1"), patrol("1.1.1.4"), patrol("1.1.1.2")];
        let mut other = Activity::new("Secure", "Maritime", "Convoys", "1.1.2.9");
        other.imo_id = "1.1.2".into();
        dataset.activities.push(other);
        assert_eq!(dataset.next_activity_id(&dataset.activities[0].clone()), "1.1.1.5");

        let mut fresh = Activity::new("Secure", "Maritime", "Escort", "");
        fresh.imo_id = "1.1.3".into();
        assert_eq!(dataset.next_activity_id(&fresh), "1.1.3.1");
    }

    #[test]
    fn add_replace_and_remove_activities() {
        let mut dataset = Dataset::new("Test");
        let a = patrol("1.1.1.1");
        let id = a.id;
        assert!(dataset.add_activity(a.clone()));
        assert!(!dataset.add_activity(a.clone()));

        let mut edited = a;
        edited.description = "Harbour patrol".into();
        assert!(dataset.replace_activity(&edited));
        assert_eq!(dataset.activity(id).unwrap().description, "Harbour patrol");

        assert_eq!(dataset.remove_activity(id).map(|a| a.id), Some(id));
        assert!(dataset.remove_activity(id).is_none());
        assert!(!dataset.replace_activity(&edited));
    }

    #[test]
    fn apply_patches_counts_known_ids_only() {
        let mut dataset = Dataset::new("Test");
        let a = Activity::new("O", "L", "I", "1.1.1.1");
        let id = a.id;
        dataset.activities.push(a);
        let patches = vec![
            ActivityPatch {
                id,
                fields: vec![FieldValue::ActivityId("1.1.1.2".into())],
            },
            ActivityPatch {
                id: Uuid::new_v4(),
                fields: vec![FieldValue::ActivityId("9".into())],
            },
        ];
        assert_eq!(dataset.apply_patches(&patches), 1);
        assert_eq!(dataset.activity(id).unwrap().activity_id, "1.1.1.2");
    }
}
