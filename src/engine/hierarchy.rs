//! Objective → LOE → IMO → activity grouping.
//!
//! Hierarchy nodes are never stored; they are projected from the flat
//! activity list on every layout pass. Groups are partitioned by name in
//! first-seen order, then each level is sorted (stably) by the dotted id of
//! the first activity encountered in the group.

use crate::model::{Activity, DottedId};

/// Identifies an LOE band by its names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LoeKey {
    pub objective: String,
    pub loe: String,
}

/// Identifies an IMO band by its names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImoKey {
    pub objective: String,
    pub loe: String,
    pub imo: String,
}

impl ImoKey {
    pub fn of(activity: &Activity) -> Self {
        Self {
            objective: activity.objective_name.clone(),
            loe: activity.loe_name.clone(),
            imo: activity.imo_name.clone(),
        }
    }

    pub fn loe_key(&self) -> LoeKey {
        LoeKey {
            objective: self.objective.clone(),
            loe: self.loe.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImoGroup<'a> {
    pub key: ImoKey,
    pub id: DottedId,
    pub activities: Vec<&'a Activity>,
}

#[derive(Debug, Clone)]
pub struct LoeGroup<'a> {
    pub key: LoeKey,
    pub id: DottedId,
    pub imos: Vec<ImoGroup<'a>>,
}

impl LoeGroup<'_> {
    pub fn activity_count(&self) -> usize {
        self.imos.iter().map(|i| i.activities.len()).sum()
    }
}

#[derive(Debug, Clone)]
pub struct ObjectiveGroup<'a> {
    pub name: String,
    pub id: DottedId,
    pub loes: Vec<LoeGroup<'a>>,
}

/// Group and order the activities for display.
pub fn group_activities(activities: &[Activity]) -> Vec<ObjectiveGroup<'_>> {
    let mut objectives: Vec<ObjectiveGroup<'_>> = Vec::new();

    for activity in activities {
        let obj_idx = match objectives
            .iter()
            .position(|o| o.name == activity.objective_name)
        {
            Some(i) => i,
            None => {
                objectives.push(ObjectiveGroup {
                    name: activity.objective_name.clone(),
                    id: DottedId::parse(&activity.objective_id),
                    loes: Vec::new(),
                });
                objectives.len() - 1
            }
        };
        let objective = &mut objectives[obj_idx];

        let loe_idx = match objective
            .loes
            .iter()
            .position(|l| l.key.loe == activity.loe_name)
        {
            Some(i) => i,
            None => {
                objective.loes.push(LoeGroup {
                    key: LoeKey {
                        objective: activity.objective_name.clone(),
                        loe: activity.loe_name.clone(),
                    },
                    id: DottedId::parse(&activity.loe_id),
                    imos: Vec::new(),
                });
                objective.loes.len() - 1
            }
        };
        let loe = &mut objective.loes[loe_idx];

        match loe.imos.iter_mut().find(|i| i.key.imo == activity.imo_name) {
            Some(imo) => imo.activities.push(activity),
            None => loe.imos.push(ImoGroup {
                key: ImoKey::of(activity),
                id: DottedId::parse(&activity.imo_id),
                activities: vec![activity],
            }),
        }
    }

    objectives.sort_by(|a, b| a.id.numeric_cmp(&b.id));
    for objective in &mut objectives {
        objective.loes.sort_by(|a, b| a.id.numeric_cmp(&b.id));
        for loe in &mut objective.loes {
            loe.imos.sort_by(|a, b| a.id.numeric_cmp(&b.id));
            for imo in &mut loe.imos {
                sort_activities(&mut imo.activities);
            }
        }
    }

    objectives
}

/// Stable numeric sort by each activity's own dotted id.
pub fn sort_activities(activities: &mut [&Activity]) {
    activities.sort_by(|a, b| a.dotted_id().numeric_cmp(&b.dotted_id()));
}

/// Locate an IMO group by key.
pub fn find_imo<'g, 'a>(
    groups: &'g [ObjectiveGroup<'a>],
    key: &ImoKey,
) -> Option<&'g ImoGroup<'a>> {
    find_loe(groups, &key.loe_key())?
        .imos
        .iter()
        .find(|i| i.key == *key)
}

/// Locate an LOE group by key.
pub fn find_loe<'g, 'a>(
    groups: &'g [ObjectiveGroup<'a>],
    key: &LoeKey,
) -> Option<&'g LoeGroup<'a>> {
    groups
        .iter()
        .find(|o| o.name == key.objective)?
        .loes
        .iter()
        .find(|l| l.key == *key)
}
