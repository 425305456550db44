use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::AppSettings;
use crate::engine::{renumber, ChartEvent, DragMachine, ReorderRequest};
use crate::error::StoreError;
use crate::io::{ActivityStore, JsonFileStore, MemoryStore};
use crate::model::dataset::Narrative;
use crate::model::{Activity, ActivityPatch, Dataset, FieldValue};
use crate::ui;
use crate::ui::activity_panel::{EditAction, EditDraft, PanelAction};
use crate::ui::narrative::{NarrativeAction, NarrativeDraft};

/// Main application state.
pub struct OpApproachApp {
    pub store: Box<dyn ActivityStore>,
    pub dataset: Dataset,
    pub settings: AppSettings,
    pub drag: DragMachine,
    pub selected: Option<Uuid>,
    pub editing: Option<EditDraft>,
    pub editing_narrative: Option<NarrativeDraft>,

    // Dialog and panel state
    pub show_about: bool,
    pub show_csv_help: bool,
    pub show_narrative: bool,

    // Status message
    pub status_message: String,
}

impl OpApproachApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);
        ui::theme::apply_theme(&cc.egui_ctx);

        let settings = AppSettings::load();
        let store: Box<dyn ActivityStore> = match &settings.last_dataset {
            Some(path) if path.exists() => Box::new(JsonFileStore::open(path)),
            _ => Box::new(MemoryStore::new(Dataset::default())),
        };
        Self::with_store(store, settings)
    }

    /// Build the app around `store`, loading its dataset immediately.
    pub fn with_store(store: Box<dyn ActivityStore>, settings: AppSettings) -> Self {
        let mut app = Self {
            store: Box::new(MemoryStore::new(Dataset::default())),
            dataset: Dataset::default(),
            drag: DragMachine::new(settings.drag_threshold),
            settings,
            selected: None,
            editing: None,
            editing_narrative: None,
            show_about: false,
            show_csv_help: false,
            show_narrative: true,
            status_message: "Ready".to_string(),
        };
        if let Err(e) = app.open_store(store) {
            app.status_message = format!("Error loading: {}", e);
        }
        app
    }

    /// Replace the active store and load its dataset. The old store stays
    /// active if the new one cannot be read.
    fn open_store(&mut self, store: Box<dyn ActivityStore>) -> Result<(), StoreError> {
        let dataset = store.load()?;
        info!(
            store = %store.describe(),
            activities = dataset.activities.len(),
            "dataset loaded"
        );
        self.store = store;
        self.dataset = dataset;
        self.selected = None;
        self.editing = None;
        self.editing_narrative = None;
        self.drag = DragMachine::new(self.settings.drag_threshold);
        Ok(())
    }

    fn remember_dataset(&mut self, path: &Path) {
        self.settings.last_dataset = Some(path.to_path_buf());
        if let Err(e) = self.settings.save() {
            warn!(error = %e, "failed to save settings");
        }
    }

    // --- File operations ---

    pub fn open_dataset(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Operational Approach", &["json"])
            .set_directory(&self.settings.data_dir)
            .pick_file()
        {
            match self.open_store(Box::new(JsonFileStore::open(&path))) {
                Ok(()) => {
                    self.remember_dataset(&path);
                    self.status_message = format!("Opened {}", self.dataset.name);
                }
                Err(e) => {
                    self.status_message = format!("Error loading: {}", e);
                }
            }
        }
    }

    /// Discard local state and re-read the dataset from the store.
    pub fn reload(&mut self) {
        match self.store.load() {
            Ok(dataset) => {
                self.dataset = dataset;
                if self
                    .selected
                    .is_some_and(|id| self.dataset.activity(id).is_none())
                {
                    self.selected = None;
                }
                self.status_message = "Reloaded".to_string();
            }
            Err(e) => {
                self.status_message = format!("Reload failed: {}", e);
            }
        }
    }

    pub fn import_csv(&mut self) {
        // Guard: if the current dataset has activities, confirm before replacing
        if !self.dataset.activities.is_empty() {
            let confirm = rfd::MessageDialog::new()
                .set_title("Import CSV")
                .set_description("This will open the imported data as a new dataset. Continue?")
                .set_buttons(rfd::MessageButtons::YesNo)
                .show();
            if confirm != rfd::MessageDialogResult::Yes {
                return;
            }
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        {
            match self.import_from(&path) {
                Ok((target, count, skipped)) => {
                    self.remember_dataset(&target);
                    self.status_message = if skipped > 0 {
                        format!("Imported {} activities ({} rows skipped)", count, skipped)
                    } else {
                        format!("Imported {} activities", count)
                    };
                }
                Err(message) => {
                    self.status_message = message;
                }
            }
        }
    }

    /// Import `csv_path` into a new dataset file under the data directory.
    fn import_from(&mut self, csv_path: &Path) -> Result<(PathBuf, usize, usize), String> {
        let (activities, skipped) = crate::io::csv_import::import_csv(csv_path)
            .map_err(|e| format!("CSV import failed: {}", e))?;

        // Derive dataset name from filename
        let name = csv_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Imported Approach")
            .to_string();
        let count = activities.len();
        let mut dataset = Dataset::new(name);
        dataset.activities = activities;

        let target = dataset_path(&self.settings.data_dir, &dataset);
        let store = JsonFileStore::create(&target, &dataset)
            .map_err(|e| format!("Could not save imported dataset: {}", e))?;
        self.open_store(Box::new(store))
            .map_err(|e| format!("Error loading: {}", e))?;
        Ok((target, count, skipped))
    }

    pub fn export_csv(&mut self) {
        if self.dataset.activities.is_empty() {
            self.status_message = "Nothing to export, the dataset has no activities".to_string();
            return;
        }

        let default_name = format!("{}.csv", self.dataset.name);
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name(&default_name)
            .save_file()
        {
            match crate::io::csv_export::export_csv(&self.dataset.activities, &path) {
                Ok(count) => {
                    self.status_message = format!("Exported {} activities to CSV", count);
                }
                Err(e) => {
                    self.status_message = format!("CSV export failed: {}", e);
                }
            }
        }
    }

    pub fn open_data_folder(&mut self) {
        let dir = self.settings.data_dir.clone();
        if let Err(e) = std::fs::create_dir_all(&dir) {
            self.status_message = format!("Cannot create {}: {}", dir.display(), e);
            return;
        }
        if let Err(e) = open::that(&dir) {
            self.status_message = format!("Cannot open {}: {}", dir.display(), e);
        }
    }

    // --- Commits ---

    /// Apply one field change locally, then persist it.
    pub fn commit_update(&mut self, id: Uuid, value: FieldValue) {
        if !self.dataset.apply_update(id, &value) {
            warn!(%id, "update for an activity that is no longer loaded");
            return;
        }
        if let Err(e) = self.store.update_activity(id, &value) {
            self.recover_from(e);
        }
    }

    /// Apply a batch locally, then persist it atomically.
    pub fn commit_batch(&mut self, patches: &[ActivityPatch]) {
        if patches.is_empty() {
            return;
        }
        self.dataset.apply_patches(patches);
        if let Err(e) = self.store.bulk_update_activities(patches) {
            self.recover_from(e);
        }
    }

    /// Apply a full record from the edit form, then persist it.
    pub fn commit_record(&mut self, activity: Activity) {
        if !self.dataset.replace_activity(&activity) {
            warn!(id = %activity.id, "edit for an activity that is no longer loaded");
            return;
        }
        match self.store.replace_activity(&activity) {
            Ok(()) => self.status_message = format!("Saved activity {}", activity.activity_id),
            Err(e) => self.recover_from(e),
        }
    }

    /// Add a new activity locally and in the store, and select it.
    pub fn create_activity(&mut self, activity: Activity) {
        let id = activity.id;
        let label = activity.activity_id.clone();
        if !self.dataset.add_activity(activity.clone()) {
            warn!(%id, "new activity collides with a loaded one");
            return;
        }
        match self.store.create_activity(&activity) {
            Ok(()) => {
                info!(%id, activity_id = %label, "activity added");
                self.selected = Some(id);
                self.status_message = format!("Added activity {}", label);
            }
            Err(e) => self.recover_from(e),
        }
    }

    /// Remove an activity locally and from the store.
    pub fn delete_activity(&mut self, id: Uuid) {
        let Some(removed) = self.dataset.remove_activity(id) else {
            warn!(%id, "delete for an activity that is no longer loaded");
            return;
        };
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.editing.as_ref().is_some_and(|d| d.id() == id) {
            self.editing = None;
        }
        match self.store.delete_activity(id) {
            Ok(()) => {
                info!(%id, activity_id = %removed.activity_id, "activity deleted");
                self.status_message = format!("Deleted activity {}", removed.activity_id);
            }
            Err(e) => self.recover_from(e),
        }
    }

    /// Ask before deleting.
    pub fn confirm_delete(&mut self, id: Uuid) {
        let Some(activity) = self.dataset.activity(id) else {
            return;
        };
        let confirm = rfd::MessageDialog::new()
            .set_title("Delete Activity")
            .set_description(format!(
                "Delete activity {} {}? This cannot be undone.",
                activity.activity_id, activity.description
            ))
            .set_buttons(rfd::MessageButtons::YesNo)
            .show();
        if confirm == rfd::MessageDialogResult::Yes {
            self.delete_activity(id);
        }
    }

    pub fn save_narrative(&mut self, narrative: Narrative) {
        self.dataset.set_narrative(narrative.clone());
        match self.store.update_narrative(&narrative) {
            Ok(()) => self.status_message = "Narrative saved".to_string(),
            Err(e) => self.recover_from(e),
        }
    }

    fn recover_from(&mut self, e: StoreError) {
        warn!(error = %e, "commit failed, reloading from store");
        self.reload();
        self.status_message = format!("Change was not saved: {}", e);
    }

    fn commit_reorder(&mut self, request: &ReorderRequest) {
        match renumber(&self.dataset.activities, request) {
            Ok(patches) => {
                debug!(
                    subject = %request.subject.describe(),
                    patches = patches.len(),
                    "renumber batch ready"
                );
                self.commit_batch(&patches);
            }
            Err(e) => {
                error!(error = %e, "reorder dropped");
            }
        }
    }

    /// Act on the outcome of a chart gesture.
    pub fn handle_chart_event(&mut self, event: ChartEvent) {
        match event {
            ChartEvent::None | ChartEvent::Cancelled => {}
            ChartEvent::Selected(id) => {
                self.selected = Some(id);
            }
            ChartEvent::CommitDate { activity, value } => {
                self.commit_update(activity, value);
            }
            ChartEvent::CommitReorder(request) => {
                self.commit_reorder(&request);
            }
        }
    }

    // --- Forms ---

    pub fn begin_edit(&mut self, id: Uuid) {
        if let Some(activity) = self.dataset.activity(id) {
            self.editing = Some(EditDraft::for_activity(activity, today()));
        }
    }

    /// Open the add form, placed next to the selected activity if any.
    pub fn begin_new_activity(&mut self) {
        match self.selected {
            Some(id) => self.begin_add_sibling(id),
            None => self.editing = Some(EditDraft::new_activity(today())),
        }
    }

    pub fn begin_add_sibling(&mut self, sibling: Uuid) {
        if let Some(activity) = self.dataset.activity(sibling) {
            let next = self.dataset.next_activity_id(activity);
            self.editing = Some(EditDraft::new_in_imo(activity, next, today()));
        }
    }

    pub fn begin_narrative_edit(&mut self) {
        self.editing_narrative = Some(NarrativeDraft::from_narrative(&self.dataset.narrative));
    }

    fn handle_edit(&mut self, action: EditAction) {
        match action {
            EditAction::None => {}
            EditAction::Cancel => self.editing = None,
            EditAction::Save(activity) => {
                if let Some(draft) = self.editing.take() {
                    if draft.is_new {
                        self.create_activity(activity);
                    } else if draft.has_changes() {
                        self.commit_record(activity);
                    }
                }
            }
        }
    }

    fn handle_narrative_edit(&mut self, action: NarrativeAction) {
        match action {
            NarrativeAction::None => {}
            NarrativeAction::Cancel => self.editing_narrative = None,
            NarrativeAction::Save(narrative) => {
                self.editing_narrative = None;
                self.save_narrative(narrative);
            }
        }
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

/// `<data_dir>/<name>.json`, with a numeric suffix if the file exists.
fn dataset_path(data_dir: &Path, dataset: &Dataset) -> PathBuf {
    let stem: String = dataset
        .name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    let stem = if stem.is_empty() { "approach".to_string() } else { stem };
    let mut path = data_dir.join(format!("{stem}.json"));
    let mut n = 2;
    while path.exists() {
        path = data_dir.join(format!("{stem}-{n}.json"));
        n += 1;
    }
    path
}

impl eframe::App for OpApproachApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Handle keyboard shortcuts outside closures to avoid borrow issues
        if ctx.input(|i| i.key_pressed(egui::Key::F5)) && !self.drag.is_dragging() {
            self.reload();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_AXIS)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(self.store.describe())
                                .size(10.5)
                                .color(ui::theme::TEXT_SECONDARY),
                        );
                        ui.label(egui::RichText::new(" · ").size(10.5));
                        ui.label(
                            egui::RichText::new(format!(
                                "Activities: {}",
                                self.dataset.activities.len()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_SECONDARY),
                        );
                    });
                });
            });

        // Top panel: narrative blocks
        if self.show_narrative {
            egui::TopBottomPanel::top("narrative")
                .resizable(true)
                .default_height(140.0)
                .show(ctx, |ui| {
                    if ui::narrative::show_narrative(&self.dataset.narrative, ui) {
                        self.begin_narrative_edit();
                    }
                });
        }

        // Right panel: details of the selected activity
        let mut panel_action = PanelAction::None;
        if let Some(activity) = self.selected.and_then(|id| self.dataset.activity(id)) {
            egui::SidePanel::right("activity_panel")
                .default_width(300.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panel_action = ui::activity_panel::show_activity_panel(activity, ui);
                });
        }
        match panel_action {
            PanelAction::None => {}
            PanelAction::Close => self.selected = None,
            PanelAction::RequestEdit(id) => self.begin_edit(id),
            PanelAction::AddSibling(id) => self.begin_add_sibling(id),
            PanelAction::Delete(id) => self.confirm_delete(id),
        }

        // Central panel: timeline
        let mut interaction = ui::gantt_chart::ChartInteraction::default();
        egui::CentralPanel::default()
            .frame(egui::Frame::default().fill(ui::theme::BG_CANVAS))
            .show(ctx, |ui| {
                if self.dataset.activities.is_empty() {
                    ui.centered_and_justified(|ui| {
                        ui.label(
                            egui::RichText::new("No activities. Import a CSV from the File menu or add one from the Edit menu.")
                                .color(ui::theme::TEXT_SECONDARY),
                        );
                    });
                    return;
                }
                interaction = ui::gantt_chart::show_gantt_chart(
                    &self.dataset.activities,
                    self.settings.horizon_year,
                    &mut self.drag,
                    self.selected,
                    ui,
                );
            });
        self.handle_chart_event(interaction.event);

        // Dialogs
        if let Some(draft) = self.editing.as_mut() {
            let action = ui::activity_panel::show_edit_window(draft, ctx);
            self.handle_edit(action);
        }
        if let Some(draft) = self.editing_narrative.as_mut() {
            let action = ui::narrative::show_narrative_editor(draft, ctx);
            self.handle_narrative_edit(action);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        if self.show_csv_help {
            ui::dialogs::show_csv_help_dialog(self, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::hierarchy::ImoKey;
    use crate::engine::regions::{IdChain, ReorderSubject};
    use crate::model::{Activity, DottedId};
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        let mut dataset = Dataset::new("Operation Harbour");
        let mut activities = Vec::new();
        for n in 1..=3 {
            let mut a = Activity::new("Secure", "Maritime", "Patrols", format!("1.1.1.{n}"));
            a.objective_id = "1".into();
            a.loe_id = "1.1".into();
            a.imo_id = "1.1.1".into();
            a.start_date = NaiveDate::from_ymd_opt(2026, n, 1);
            a.end_date = NaiveDate::from_ymd_opt(2026, n + 3, 1);
            activities.push(a);
        }
        dataset.activities = activities;
        dataset
    }

    fn app_with(store: MemoryStore) -> OpApproachApp {
        OpApproachApp::with_store(Box::new(store), AppSettings::default())
    }

    fn request(activity: &Activity, source: usize, target: usize) -> ReorderRequest {
        ReorderRequest {
            subject: ReorderSubject::Activity {
                id: activity.id,
                imo: ImoKey::of(activity),
            },
            chain: IdChain {
                objective: DottedId::parse("1"),
                loe: DottedId::parse("1.1"),
                imo: DottedId::parse("1.1.1"),
            },
            source_index: source,
            target_index: target,
        }
    }

    #[test]
    fn date_commit_updates_local_and_stored_dataset() {
        let mut app = app_with(MemoryStore::new(dataset()));
        let id = app.dataset.activities[0].id;
        let date = NaiveDate::from_ymd_opt(2026, 2, 14).unwrap();
        app.handle_chart_event(ChartEvent::CommitDate {
            activity: id,
            value: FieldValue::EndDate(date),
        });
        assert_eq!(app.dataset.activity(id).unwrap().end_date, Some(date));
        assert_eq!(app.store.load().unwrap().activity(id).unwrap().end_date, Some(date));
    }

    #[test]
    fn failed_commit_reloads_from_store() {
        let mut store = MemoryStore::new(dataset());
        store.reject_commits = true;
        let mut app = app_with(store);
        let id = app.dataset.activities[0].id;
        let before = app.dataset.activity(id).unwrap().start_date;

        app.commit_update(id, FieldValue::StartDate(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()));

        assert_eq!(app.dataset.activity(id).unwrap().start_date, before);
        assert!(app.status_message.starts_with("Change was not saved"));
    }

    #[test]
    fn reorder_commit_renumbers_siblings() {
        let mut app = app_with(MemoryStore::new(dataset()));
        let third = app.dataset.activities[2].clone();
        app.handle_chart_event(ChartEvent::CommitReorder(request(&third, 2, 0)));

        let ids: Vec<_> = app
            .dataset
            .activities
            .iter()
            .map(|a| a.activity_id.as_str())
            .collect();
        assert_eq!(ids, vec!["1.1.1.2", "1.1.1.3", "1.1.1.1"]);
        let stored = app.store.load().unwrap();
        assert_eq!(stored.activity(third.id).unwrap().activity_id, "1.1.1.1");
    }

    #[test]
    fn reorder_of_unknown_entity_changes_nothing() {
        let mut app = app_with(MemoryStore::new(dataset()));
        let mut stranger = Activity::new("Secure", "Maritime", "Convoys", "1.1.2.1");
        stranger.imo_id = "1.1.2".into();
        let before: Vec<_> = app.dataset.activities.clone();

        app.handle_chart_event(ChartEvent::CommitReorder(request(&stranger, 0, 1)));

        assert_eq!(app.dataset.activities, before);
        assert_eq!(app.store.load().unwrap().activities, before);
    }

    #[test]
    fn selection_follows_click_events() {
        let mut app = app_with(MemoryStore::new(dataset()));
        let id = app.dataset.activities[1].id;
        app.handle_chart_event(ChartEvent::Selected(id));
        assert_eq!(app.selected, Some(id));
        app.handle_chart_event(ChartEvent::Cancelled);
        assert_eq!(app.selected, Some(id));
    }

    #[test]
    fn added_sibling_takes_the_next_id_and_is_selected() {
        let mut app = app_with(MemoryStore::new(dataset()));
        let first = app.dataset.activities[0].id;
        app.begin_add_sibling(first);
        let draft = app.editing.clone().unwrap();
        assert!(draft.is_new);
        assert_eq!(draft.record.activity_id, "1.1.1.4");

        let record = draft.edited();
        app.handle_edit(EditAction::Save(record.clone()));

        assert!(app.editing.is_none());
        assert_eq!(app.selected, Some(record.id));
        assert_eq!(app.dataset.activities.len(), 4);
        assert_eq!(app.store.load().unwrap().activity(record.id), Some(&record));
    }

    #[test]
    fn form_save_replaces_the_whole_record() {
        let mut app = app_with(MemoryStore::new(dataset()));
        let id = app.dataset.activities[1].id;
        app.begin_edit(id);
        let mut draft = app.editing.clone().unwrap();
        draft.record.description = "Escort tankers".into();
        draft.domains[2] = "Maritime patrol aircraft".into();
        draft.decision[0].label = "Open strait".into();
        draft.decision[0].dated = true;
        app.editing = Some(draft.clone());

        app.handle_edit(EditAction::Save(draft.edited()));

        let stored = app.store.load().unwrap();
        let saved = stored.activity(id).unwrap();
        assert_eq!(saved.description, "Escort tankers");
        assert_eq!(saved.air.as_deref(), Some("Maritime patrol aircraft"));
        assert_eq!(saved.decision_points[0].label.as_deref(), Some("Open strait"));
        assert_eq!(app.dataset.activity(id), Some(saved));
    }

    #[test]
    fn delete_clears_selection_and_store() {
        let mut app = app_with(MemoryStore::new(dataset()));
        let id = app.dataset.activities[0].id;
        app.handle_chart_event(ChartEvent::Selected(id));
        app.delete_activity(id);

        assert_eq!(app.selected, None);
        assert!(app.dataset.activity(id).is_none());
        assert!(app.store.load().unwrap().activity(id).is_none());
        assert_eq!(app.status_message, "Deleted activity 1.1.1.1");
    }

    #[test]
    fn rejected_structural_changes_are_rolled_back() {
        let mut store = MemoryStore::new(dataset());
        store.reject_commits = true;
        let mut app = app_with(store);
        let first = app.dataset.activities[0].id;

        app.create_activity(Activity::new("Secure", "Maritime", "Patrols", "1.1.1.4"));
        assert_eq!(app.dataset.activities.len(), 3);
        assert!(app.status_message.starts_with("Change was not saved"));

        app.delete_activity(first);
        assert!(app.dataset.activity(first).is_some());

        app.save_narrative(Narrative {
            effects: Some("Deny resupply".into()),
            ..Default::default()
        });
        assert_eq!(app.dataset.narrative, Narrative::default());
    }

    #[test]
    fn narrative_edit_is_saved_to_the_store() {
        let mut app = app_with(MemoryStore::new(dataset()));
        app.begin_narrative_edit();
        let mut draft = app.editing_narrative.clone().unwrap();
        draft.problem_statement = "Shipping lanes contested".into();

        app.handle_narrative_edit(NarrativeAction::Save(draft.to_narrative()));

        assert!(app.editing_narrative.is_none());
        let stored = app.store.load().unwrap().narrative;
        assert_eq!(stored.problem_statement.as_deref(), Some("Shipping lanes contested"));
        assert_eq!(app.dataset.narrative, stored);
    }

    #[test]
    fn imported_dataset_is_written_to_the_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("harbour plan.csv");
        std::fs::write(
            &csv_path,
            "Objective_Title,LOE_Title,IMO_Title,OAI_ID,Start_Date,End_Date\n\
             Secure,Maritime,Patrols,1.1.1.1,2026-01-01,2026-03-01\n",
        )
        .unwrap();
        let settings = AppSettings {
            data_dir: dir.path().join("datasets"),
            ..AppSettings::default()
        };
        let mut app = OpApproachApp::with_store(Box::new(MemoryStore::new(Dataset::default())), settings);

        let (target, count, skipped) = app.import_from(&csv_path).unwrap();

        assert_eq!((count, skipped), (1, 0));
        assert_eq!(target, dir.path().join("datasets/harbour_plan.json"));
        assert!(target.exists());
        assert_eq!(app.dataset.name, "harbour plan");
        assert_eq!(app.store.describe(), target.display().to_string());
    }

    #[test]
    fn dataset_path_avoids_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = Dataset::new("Op/Harbour");
        let first = dataset_path(dir.path(), &dataset);
        assert_eq!(first.file_name().unwrap(), "Op_Harbour.json");
        std::fs::write(&first, "{}").unwrap();
        assert_eq!(
            dataset_path(dir.path(), &dataset).file_name().unwrap(),
            "Op_Harbour-2.json"
        );
    }
}
