//! Persistence collaborator for datasets.
//!
//! The application talks to storage only through [`ActivityStore`]. Commits
//! are all-or-nothing: a batch naming an unknown activity writes nothing.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::dataset::Narrative;
use crate::model::{Activity, ActivityPatch, Dataset, FieldValue};

pub trait ActivityStore {
    /// Fetch the full dataset.
    fn load(&self) -> Result<Dataset, StoreError>;

    /// Persist a single field change.
    fn update_activity(&mut self, id: Uuid, value: &FieldValue) -> Result<(), StoreError>;

    /// Persist a batch of patches atomically.
    fn bulk_update_activities(&mut self, patches: &[ActivityPatch]) -> Result<(), StoreError>;

    /// Overwrite a whole record, as saved from the edit form.
    fn replace_activity(&mut self, activity: &Activity) -> Result<(), StoreError>;

    fn create_activity(&mut self, activity: &Activity) -> Result<(), StoreError>;

    fn delete_activity(&mut self, id: Uuid) -> Result<(), StoreError>;

    fn update_narrative(&mut self, narrative: &Narrative) -> Result<(), StoreError>;

    /// Human-readable location, for the status bar.
    fn describe(&self) -> String;
}

fn validate(dataset: &Dataset, ids: impl IntoIterator<Item = Uuid>) -> Result<(), StoreError> {
    for id in ids {
        if dataset.activity(id).is_none() {
            return Err(StoreError::UnknownActivity(id));
        }
    }
    Ok(())
}

fn replace_in(dataset: &mut Dataset, activity: &Activity) -> Result<(), StoreError> {
    if dataset.replace_activity(activity) {
        Ok(())
    } else {
        Err(StoreError::UnknownActivity(activity.id))
    }
}

fn create_in(dataset: &mut Dataset, activity: &Activity) -> Result<(), StoreError> {
    if dataset.add_activity(activity.clone()) {
        Ok(())
    } else {
        Err(StoreError::DuplicateActivity(activity.id))
    }
}

fn delete_in(dataset: &mut Dataset, id: Uuid) -> Result<(), StoreError> {
    dataset
        .remove_activity(id)
        .map(|_| ())
        .ok_or(StoreError::UnknownActivity(id))
}

/// A dataset kept as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Write `dataset` to `path` and return a store over it.
    pub fn create(path: impl Into<PathBuf>, dataset: &Dataset) -> Result<Self, StoreError> {
        let store = Self::open(path);
        if let Some(parent) = store.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        store.write(dataset)?;
        info!(path = %store.path.display(), activities = dataset.activities.len(), "dataset created");
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write through a sibling temp file so a failed write leaves the old file.
    fn write(&self, dataset: &Dataset) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(dataset)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl ActivityStore for JsonFileStore {
    fn load(&self) -> Result<Dataset, StoreError> {
        let json = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    fn update_activity(&mut self, id: Uuid, value: &FieldValue) -> Result<(), StoreError> {
        let mut dataset = self.load()?;
        if !dataset.apply_update(id, value) {
            return Err(StoreError::UnknownActivity(id));
        }
        self.write(&dataset)?;
        debug!(%id, field = %value.field_name(), "activity updated");
        Ok(())
    }

    fn bulk_update_activities(&mut self, patches: &[ActivityPatch]) -> Result<(), StoreError> {
        let mut dataset = self.load()?;
        validate(&dataset, patches.iter().map(|p| p.id))?;
        dataset.apply_patches(patches);
        self.write(&dataset)?;
        debug!(patches = patches.len(), "bulk update written");
        Ok(())
    }

    fn replace_activity(&mut self, activity: &Activity) -> Result<(), StoreError> {
        let mut dataset = self.load()?;
        replace_in(&mut dataset, activity)?;
        self.write(&dataset)?;
        debug!(id = %activity.id, "activity replaced");
        Ok(())
    }

    fn create_activity(&mut self, activity: &Activity) -> Result<(), StoreError> {
        let mut dataset = self.load()?;
        create_in(&mut dataset, activity)?;
        self.write(&dataset)?;
        info!(id = %activity.id, activity_id = %activity.activity_id, "activity created");
        Ok(())
    }

    fn delete_activity(&mut self, id: Uuid) -> Result<(), StoreError> {
        let mut dataset = self.load()?;
        delete_in(&mut dataset, id)?;
        self.write(&dataset)?;
        info!(%id, "activity deleted");
        Ok(())
    }

    fn update_narrative(&mut self, narrative: &Narrative) -> Result<(), StoreError> {
        let mut dataset = self.load()?;
        dataset.set_narrative(narrative.clone());
        self.write(&dataset)?;
        debug!(blocks = narrative.blocks().len(), "narrative updated");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory store. Can be switched to reject every commit.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    dataset: Option<Dataset>,
    pub reject_commits: bool,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: Some(dataset),
            reject_commits: false,
        }
    }

    fn dataset_mut(&mut self) -> Result<&mut Dataset, StoreError> {
        if self.reject_commits {
            return Err(StoreError::Rejected("store is read-only".into()));
        }
        self.dataset.as_mut().ok_or(StoreError::NoDataset)
    }
}

impl ActivityStore for MemoryStore {
    fn load(&self) -> Result<Dataset, StoreError> {
        self.dataset.clone().ok_or(StoreError::NoDataset)
    }

    fn update_activity(&mut self, id: Uuid, value: &FieldValue) -> Result<(), StoreError> {
        let dataset = self.dataset_mut()?;
        if dataset.apply_update(id, value) {
            Ok(())
        } else {
            Err(StoreError::UnknownActivity(id))
        }
    }

    fn bulk_update_activities(&mut self, patches: &[ActivityPatch]) -> Result<(), StoreError> {
        let dataset = self.dataset_mut()?;
        validate(dataset, patches.iter().map(|p| p.id))?;
        dataset.apply_patches(patches);
        Ok(())
    }

    fn replace_activity(&mut self, activity: &Activity) -> Result<(), StoreError> {
        replace_in(self.dataset_mut()?, activity)
    }

    fn create_activity(&mut self, activity: &Activity) -> Result<(), StoreError> {
        create_in(self.dataset_mut()?, activity)
    }

    fn delete_activity(&mut self, id: Uuid) -> Result<(), StoreError> {
        delete_in(self.dataset_mut()?, id)
    }

    fn update_narrative(&mut self, narrative: &Narrative) -> Result<(), StoreError> {
        self.dataset_mut()?.set_narrative(narrative.clone());
        Ok(())
    }

    fn describe(&self) -> String {
        match &self.dataset {
            Some(d) => format!("{} (in memory)", d.name),
            None => "no dataset".to_string(),
        }
    }
}
