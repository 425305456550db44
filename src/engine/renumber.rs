//! Dotted-id renumbering after a reorder drag.
//!
//! A reorder moves one entity within its siblings, then every sibling gets
//! `parent.(position + 1)` and the new prefix cascades into the id fields of
//! every activity below it. The result is one patch per affected activity,
//! meant to be committed as a single batch.

use uuid::Uuid;

use super::hierarchy::{find_imo, find_loe, group_activities, ObjectiveGroup};
use super::regions::{IdChain, ReorderLevel, ReorderSubject};
use crate::error::RenumberError;
use crate::model::{Activity, ActivityPatch, DottedId, FieldValue};

/// A committed reorder, as produced by the drag machine.
#[derive(Debug, Clone, PartialEq)]
pub struct ReorderRequest {
    pub subject: ReorderSubject,
    /// Parent ids captured when the drag started.
    pub chain: IdChain,
    pub source_index: usize,
    pub target_index: usize,
}

impl ReorderRequest {
    /// Signed number of sibling positions the entity moves.
    pub fn positions_moved(&self) -> i64 {
        self.target_index as i64 - self.source_index as i64
    }
}

/// Ids for `count` siblings under `prefix`, in order.
///
/// A lone activity takes the prefix itself rather than `prefix.1`.
pub fn sibling_ids(prefix: &DottedId, count: usize, level: ReorderLevel) -> Vec<DottedId> {
    if count == 1 && level == ReorderLevel::Activity {
        return vec![prefix.clone()];
    }
    (1..=count as u64).map(|n| prefix.child(n)).collect()
}

/// Replace a leading `old` prefix of a raw id with `new`, keeping the raw
/// text of the remaining segments. `None` when `old` is not a prefix.
pub fn rewrite_prefix(raw: &str, old: &DottedId, new: &DottedId) -> Option<String> {
    if !DottedId::parse(raw).starts_with(old) {
        return None;
    }
    let mut out = new.to_string();
    for segment in raw.trim().split('.').skip(old.segments().len()) {
        out.push('.');
        out.push_str(segment.trim());
    }
    Some(out)
}

fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to, item);
}

/// Apply the request's displacement to the entity's current index.
fn new_index(current: usize, count: usize, request: &ReorderRequest) -> usize {
    (current as i64 + request.positions_moved()).clamp(0, count as i64 - 1) as usize
}

/// The captured parent id, then the parent group's current id, then the
/// parent of the moved entity's own id.
fn base_prefix(captured: &DottedId, parent: &DottedId, own: &DottedId) -> DottedId {
    [captured, parent]
        .into_iter()
        .find(|p| !p.is_empty())
        .cloned()
        .unwrap_or_else(|| own.parent())
}

/// Compute the patch batch for a committed reorder.
///
/// An empty batch means the move does not change the order.
pub fn renumber(
    activities: &[Activity],
    request: &ReorderRequest,
) -> Result<Vec<ActivityPatch>, RenumberError> {
    let groups = group_activities(activities);
    match &request.subject {
        ReorderSubject::Activity { id, imo } => {
            let group = find_imo(&groups, imo).ok_or_else(|| RenumberError::EntityNotFound {
                level: ReorderLevel::Imo.label(),
                key: imo.imo.clone(),
            })?;
            renumber_activities(&group.activities, *id, &group.id, request)
        }
        ReorderSubject::Imo(key) => {
            let loe = find_loe(&groups, &key.loe_key()).ok_or_else(|| {
                RenumberError::EntityNotFound {
                    level: ReorderLevel::Loe.label(),
                    key: key.loe.clone(),
                }
            })?;
            let current = loe
                .imos
                .iter()
                .position(|i| i.key == *key)
                .ok_or_else(|| RenumberError::EntityNotFound {
                    level: ReorderLevel::Imo.label(),
                    key: key.imo.clone(),
                })?;
            let target = new_index(current, loe.imos.len(), request);
            if target == current {
                return Ok(Vec::new());
            }
            let prefix = base_prefix(&request.chain.loe, &loe.id, &loe.imos[current].id);
            let mut order: Vec<_> = loe.imos.iter().collect();
            move_item(&mut order, current, target);
            let ids = sibling_ids(&prefix, order.len(), ReorderLevel::Imo);

            let mut patches = Vec::new();
            for (imo, new_id) in order.iter().zip(ids) {
                for activity in &imo.activities {
                    let mut fields = vec![FieldValue::ImoId(new_id.to_string())];
                    if let Some(rewritten) = rewrite_prefix(&activity.activity_id, &imo.id, &new_id) {
                        fields.push(FieldValue::ActivityId(rewritten));
                    }
                    patches.push(ActivityPatch {
                        id: activity.id,
                        fields,
                    });
                }
            }
            Ok(patches)
        }
        ReorderSubject::Loe(key) => {
            let objective = objective_of(&groups, &key.objective).ok_or_else(|| {
                RenumberError::EntityNotFound {
                    level: "objective",
                    key: key.objective.clone(),
                }
            })?;
            let current = objective
                .loes
                .iter()
                .position(|l| l.key == *key)
                .ok_or_else(|| RenumberError::EntityNotFound {
                    level: ReorderLevel::Loe.label(),
                    key: key.loe.clone(),
                })?;
            let target = new_index(current, objective.loes.len(), request);
            if target == current {
                return Ok(Vec::new());
            }
            let prefix = base_prefix(
                &request.chain.objective,
                &objective.id,
                &objective.loes[current].id,
            );
            let mut order: Vec<_> = objective.loes.iter().collect();
            move_item(&mut order, current, target);
            let ids = sibling_ids(&prefix, order.len(), ReorderLevel::Loe);

            let mut patches = Vec::new();
            for (loe, new_id) in order.iter().zip(ids) {
                for imo in &loe.imos {
                    for activity in &imo.activities {
                        let mut fields = vec![FieldValue::LoeId(new_id.to_string())];
                        if let Some(rewritten) = rewrite_prefix(&activity.imo_id, &loe.id, &new_id) {
                            fields.push(FieldValue::ImoId(rewritten));
                        }
                        if let Some(rewritten) =
                            rewrite_prefix(&activity.activity_id, &loe.id, &new_id)
                        {
                            fields.push(FieldValue::ActivityId(rewritten));
                        }
                        patches.push(ActivityPatch {
                            id: activity.id,
                            fields,
                        });
                    }
                }
            }
            Ok(patches)
        }
    }
}

fn objective_of<'g, 'a>(groups: &'g [ObjectiveGroup<'a>], name: &str) -> Option<&'g ObjectiveGroup<'a>> {
    groups.iter().find(|o| o.name == name)
}

fn renumber_activities(
    siblings: &[&Activity],
    id: Uuid,
    imo_id: &DottedId,
    request: &ReorderRequest,
) -> Result<Vec<ActivityPatch>, RenumberError> {
    let current = siblings
        .iter()
        .position(|a| a.id == id)
        .ok_or_else(|| RenumberError::EntityNotFound {
            level: ReorderLevel::Activity.label(),
            key: id.to_string(),
        })?;
    let target = new_index(current, siblings.len(), request);
    if target == current {
        return Ok(Vec::new());
    }
    let prefix = base_prefix(&request.chain.imo, imo_id, &siblings[current].dotted_id());
    let mut order = siblings.to_vec();
    move_item(&mut order, current, target);
    let ids = sibling_ids(&prefix, order.len(), ReorderLevel::Activity);

    Ok(order
        .iter()
        .zip(ids)
        .map(|(activity, new_id)| ActivityPatch {
            id: activity.id,
            fields: vec![FieldValue::ActivityId(new_id.to_string())],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::hierarchy::{ImoKey, LoeKey};
    use crate::model::Dataset;

    fn activity(loe: &str, imo: &str, ids: (&str, &str, &str)) -> Activity {
        let mut a = Activity::new("Obj", loe, imo, ids.2);
        a.objective_id = ids.0.split('.').next().unwrap_or_default().to_string();
        a.loe_id = ids.0.into();
        a.imo_id = ids.1.into();
        a
    }

    fn chain(objective: &str, loe: &str, imo: &str) -> IdChain {
        IdChain {
            objective: DottedId::parse(objective),
            loe: DottedId::parse(loe),
            imo: DottedId::parse(imo),
        }
    }

    fn three_in_one_imo() -> Vec<Activity> {
        ["1.1.1.1", "1.1.1.2", "1.1.1.3"]
            .iter()
            .map(|id| activity("L", "I", ("1.1", "1.1.1", id)))
            .collect()
    }

    fn ids_after(activities: &[Activity], patches: &[ActivityPatch]) -> Vec<(Uuid, String)> {
        let mut dataset = Dataset::new("test");
        dataset.activities = activities.to_vec();
        dataset.apply_patches(patches);
        dataset
            .activities
            .iter()
            .map(|a| (a.id, a.activity_id.clone()))
            .collect()
    }

    #[test]
    fn moving_third_to_top_rotates_ids() {
        let acts = three_in_one_imo();
        let request = ReorderRequest {
            subject: ReorderSubject::Activity {
                id: acts[2].id,
                imo: ImoKey::of(&acts[2]),
            },
            chain: chain("1", "1.1", "1.1.1"),
            source_index: 2,
            target_index: 0,
        };
        let patches = renumber(&acts, &request).unwrap();
        assert_eq!(patches.len(), 3);
        let after = ids_after(&acts, &patches);
        assert_eq!(after[2], (acts[2].id, "1.1.1.1".to_string()));
        assert_eq!(after[0], (acts[0].id, "1.1.1.2".to_string()));
        assert_eq!(after[1], (acts[1].id, "1.1.1.3".to_string()));
    }

    #[test]
    fn same_index_is_a_no_op() {
        let acts = three_in_one_imo();
        let request = ReorderRequest {
            subject: ReorderSubject::Activity {
                id: acts[1].id,
                imo: ImoKey::of(&acts[1]),
            },
            chain: chain("1", "1.1", "1.1.1"),
            source_index: 1,
            target_index: 1,
        };
        assert!(renumber(&acts, &request).unwrap().is_empty());
    }

    #[test]
    fn lone_activity_takes_the_imo_id() {
        let prefix = DottedId::parse("3.2.1");
        let ids = sibling_ids(&prefix, 1, ReorderLevel::Activity);
        assert_eq!(ids, vec![DottedId::parse("3.2.1")]);
        let ids = sibling_ids(&prefix, 1, ReorderLevel::Imo);
        assert_eq!(ids, vec![DottedId::parse("3.2.1.1")]);
    }

    #[test]
    fn loe_move_cascades_into_imo_and_activity_ids() {
        let moved = activity("Governance", "Councils", ("2.1", "2.1.1", "2.1.1.1"));
        let other = activity("Security", "Police", ("2.2", "2.2.1", "2.2.1"));
        let mut moved = moved;
        moved.objective_name = "Stability".into();
        let mut other = other;
        other.objective_name = "Stability".into();
        let acts = vec![moved, other];
        let request = ReorderRequest {
            subject: ReorderSubject::Loe(LoeKey {
                objective: "Stability".into(),
                loe: "Governance".into(),
            }),
            chain: chain("2", "2.1", ""),
            source_index: 0,
            target_index: 1,
        };
        let patches = renumber(&acts, &request).unwrap();
        let moved_patch = patches.iter().find(|p| p.id == acts[0].id).unwrap();
        assert_eq!(
            moved_patch.fields,
            vec![
                FieldValue::LoeId("2.2".into()),
                FieldValue::ImoId("2.2.1".into()),
                FieldValue::ActivityId("2.2.1.1".into()),
            ]
        );
        let other_patch = patches.iter().find(|p| p.id == acts[1].id).unwrap();
        assert_eq!(
            other_patch.fields,
            vec![
                FieldValue::LoeId("2.1".into()),
                FieldValue::ImoId("2.1.1".into()),
                FieldValue::ActivityId("2.1.1".into()),
            ]
        );
    }

    #[test]
    fn imo_move_rewrites_children_under_new_prefix() {
        let acts = vec![
            activity("L", "Alpha", ("1.1", "1.1.1", "1.1.1.1")),
            activity("L", "Alpha", ("1.1", "1.1.1", "1.1.1.2")),
            activity("L", "Bravo", ("1.1", "1.1.2", "1.1.2")),
        ];
        let request = ReorderRequest {
            subject: ReorderSubject::Imo(ImoKey::of(&acts[2])),
            chain: chain("1", "1.1", "1.1.2"),
            source_index: 1,
            target_index: 0,
        };
        let patches = renumber(&acts, &request).unwrap();
        assert_eq!(patches.len(), 3);
        let mut dataset = Dataset::new("t");
        dataset.activities = acts.clone();
        dataset.apply_patches(&patches);
        let by_id = |id: Uuid| dataset.activity(id).unwrap();
        assert_eq!(by_id(acts[2].id).imo_id, "1.1.1");
        assert_eq!(by_id(acts[2].id).activity_id, "1.1.1");
        assert_eq!(by_id(acts[0].id).imo_id, "1.1.2");
        assert_eq!(by_id(acts[0].id).activity_id, "1.1.2.1");
        assert_eq!(by_id(acts[1].id).activity_id, "1.1.2.2");
    }

    #[test]
    fn missing_entity_is_reported_without_patches() {
        let acts = three_in_one_imo();
        let request = ReorderRequest {
            subject: ReorderSubject::Activity {
                id: Uuid::new_v4(),
                imo: ImoKey::of(&acts[0]),
            },
            chain: chain("1", "1.1", "1.1.1"),
            source_index: 0,
            target_index: 2,
        };
        assert!(matches!(
            renumber(&acts, &request),
            Err(RenumberError::EntityNotFound { level: "activity", .. })
        ));
    }

    #[test]
    fn empty_captured_prefix_falls_back_to_parent_of_own_id() {
        let mut acts = three_in_one_imo();
        for a in &mut acts {
            a.imo_id.clear();
        }
        let request = ReorderRequest {
            subject: ReorderSubject::Activity {
                id: acts[0].id,
                imo: ImoKey::of(&acts[0]),
            },
            chain: IdChain::default(),
            source_index: 0,
            target_index: 1,
        };
        let patches = renumber(&acts, &request).unwrap();
        let after = ids_after(&acts, &patches);
        assert_eq!(after[0].1, "1.1.1.2");
        assert_eq!(after[1].1, "1.1.1.1");
    }

    #[test]
    fn prefix_rewrite_respects_segment_boundaries() {
        let old = DottedId::parse("1.1");
        let new = DottedId::parse("1.3");
        assert_eq!(rewrite_prefix("1.1.2.a", &old, &new).as_deref(), Some("1.3.2.a"));
        assert_eq!(rewrite_prefix("1.10.2", &old, &new), None);
        assert_eq!(rewrite_prefix("1.1", &old, &new).as_deref(), Some("1.3"));
    }
}
