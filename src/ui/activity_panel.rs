use chrono::NaiveDate;
use egui::{Context, RichText, Ui, Window};
use egui_phosphor::regular::{PENCIL_SIMPLE, PLUS, TRASH, X};
use uuid::Uuid;

use crate::model::activity::{ActivityStatus, Domain, KeyPoint, Priority};
use crate::model::{Activity, PointKind, PointSlot};
use crate::ui::theme;

/// Actions the detail panel can request.
pub enum PanelAction {
    None,
    Close,
    RequestEdit(Uuid),
    /// Start a new activity in the same IMO.
    AddSibling(Uuid),
    Delete(Uuid),
}

fn section(ui: &mut Ui, title: &str) {
    ui.add_space(6.0);
    ui.label(
        RichText::new(title)
            .size(10.0)
            .strong()
            .color(theme::TEXT_SECONDARY),
    );
}

fn date_text(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "not set".to_string())
}

fn optional_text(ui: &mut Ui, title: &str, text: &Option<String>) {
    if let Some(text) = text.as_deref().filter(|t| !t.trim().is_empty()) {
        section(ui, title);
        ui.label(RichText::new(text).size(11.0));
    }
}

/// Render the details of the selected activity.
pub fn show_activity_panel(activity: &Activity, ui: &mut Ui) -> PanelAction {
    let mut action = PanelAction::None;

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new(format!("OAI {}", activity.activity_id))
                .strong()
                .size(13.0)
                .color(theme::ARMY_GREEN),
        );
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button(X).on_hover_text("Close").clicked() {
                action = PanelAction::Close;
            }
            if ui.small_button(TRASH).on_hover_text("Delete activity").clicked() {
                action = PanelAction::Delete(activity.id);
            }
            if ui.small_button(PLUS).on_hover_text("Add activity to this IMO").clicked() {
                action = PanelAction::AddSibling(activity.id);
            }
            if ui
                .small_button(format!("{PENCIL_SIMPLE} Edit"))
                .clicked()
            {
                action = PanelAction::RequestEdit(activity.id);
            }
        });
    });
    if !activity.description.trim().is_empty() {
        ui.label(RichText::new(&activity.description).size(12.0));
    }
    ui.separator();

    egui::ScrollArea::vertical()
        .id_salt("activity_details")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            section(ui, "HIERARCHY");
            egui::Grid::new("activity_hierarchy")
                .num_columns(2)
                .spacing([10.0, 2.0])
                .show(ui, |ui| {
                    for (level, id, name) in [
                        ("Objective", &activity.objective_id, &activity.objective_name),
                        ("LOE", &activity.loe_id, &activity.loe_name),
                        ("IMO", &activity.imo_id, &activity.imo_name),
                    ] {
                        ui.label(RichText::new(level).color(theme::TEXT_SECONDARY));
                        ui.label(format!("{id} {name}").trim().to_string());
                        ui.end_row();
                    }
                });

            section(ui, "SCHEDULE");
            egui::Grid::new("activity_schedule")
                .num_columns(2)
                .spacing([10.0, 2.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Start").color(theme::TEXT_SECONDARY));
                    ui.label(date_text(activity.start_date));
                    ui.end_row();
                    ui.label(RichText::new("End").color(theme::TEXT_SECONDARY));
                    ui.label(date_text(activity.end_date));
                    ui.end_row();
                    ui.label(RichText::new("Priority").color(theme::TEXT_SECONDARY));
                    ui.label(activity.priority.label());
                    ui.end_row();
                    ui.label(RichText::new("Status").color(theme::TEXT_SECONDARY));
                    ui.label(activity.status.label());
                    ui.end_row();
                });

            let domains: Vec<(Domain, &str)> = Domain::all()
                .iter()
                .filter_map(|d| activity.domain_text(*d).map(|t| (*d, t)))
                .collect();
            if !domains.is_empty() {
                section(ui, "DOMAINS");
                for (domain, text) in domains {
                    ui.horizontal_wrapped(|ui| {
                        ui.label(
                            RichText::new(domain.label())
                                .strong()
                                .color(theme::domain_color(Some(domain))),
                        );
                        ui.label(RichText::new(text).size(11.0));
                    });
                }
            }

            let slots = [
                PointSlot::Legacy,
                PointSlot::Numbered(1),
                PointSlot::Numbered(2),
                PointSlot::Numbered(3),
            ];
            let points: Vec<(PointKind, NaiveDate, String)> = [PointKind::Decisive, PointKind::Decision]
                .into_iter()
                .flat_map(|kind| {
                    slots
                        .iter()
                        .filter_map(move |slot| activity.point(kind, *slot).map(|(d, l)| (kind, d, l)))
                })
                .collect();
            if !points.is_empty() {
                section(ui, "KEY POINTS");
                for (kind, date, label) in points {
                    let color = match kind {
                        PointKind::Decisive => theme::DECISIVE_MARKER,
                        PointKind::Decision => theme::DECISION_MARKER,
                    };
                    ui.horizontal_wrapped(|ui| {
                        ui.label(RichText::new("●").color(color));
                        ui.label(RichText::new(date.format("%Y-%m-%d").to_string()).monospace());
                        ui.label(label);
                    });
                }
            }

            optional_text(ui, "DEPENDS ON", &activity.depends_on);
            optional_text(ui, "BRANCH NOTES", &activity.branch_notes);
            optional_text(ui, "NOTES", &activity.notes);
        });

    action
}

/// Editable copy of one key point. The date is kept even while unset so
/// the picker has something to show.
#[derive(Debug, Clone, PartialEq)]
pub struct PointDraft {
    pub label: String,
    pub dated: bool,
    pub date: NaiveDate,
}

impl PointDraft {
    fn of(point: &KeyPoint, fallback: NaiveDate) -> Self {
        Self {
            label: point.label.clone().unwrap_or_default(),
            dated: point.date.is_some(),
            date: point.date.unwrap_or(fallback),
        }
    }

    fn to_point(&self) -> KeyPoint {
        KeyPoint {
            label: non_blank(&self.label),
            date: self.dated.then_some(self.date),
        }
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Working copy of an activity in the edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct EditDraft {
    original: Activity,
    /// Hierarchy, ids, description, priority and status are edited in place.
    pub record: Activity,
    pub is_new: bool,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub domains: [String; 5],
    pub decision: [PointDraft; 3],
    pub decisive: [PointDraft; 3],
    pub depends_on: String,
    pub branch_notes: String,
    pub notes: String,
}

impl EditDraft {
    /// Missing dates start at `today`, and a missing end at the start.
    pub fn for_activity(activity: &Activity, today: NaiveDate) -> Self {
        let start = activity.start_date.unwrap_or(today);
        let end = activity.end_date.unwrap_or(start).max(start);
        let text = |t: &Option<String>| t.clone().unwrap_or_default();
        Self {
            original: activity.clone(),
            record: activity.clone(),
            is_new: false,
            start,
            end,
            domains: [Domain::Land, Domain::Sea, Domain::Air, Domain::Cyber, Domain::Space]
                .map(|d| activity.domain_text(d).unwrap_or_default().to_string()),
            decision: activity
                .decision_points
                .each_ref()
                .map(|p| PointDraft::of(p, start)),
            decisive: activity
                .decisive_points
                .each_ref()
                .map(|p| PointDraft::of(p, start)),
            depends_on: text(&activity.depends_on),
            branch_notes: text(&activity.branch_notes),
            notes: text(&activity.notes),
        }
    }

    /// A new activity placed in the same IMO as `sibling`, numbered `activity_id`.
    pub fn new_in_imo(sibling: &Activity, activity_id: String, today: NaiveDate) -> Self {
        let mut activity = Activity::new(
            sibling.objective_name.clone(),
            sibling.loe_name.clone(),
            sibling.imo_name.clone(),
            activity_id,
        );
        activity.objective_id = sibling.objective_id.clone();
        activity.loe_id = sibling.loe_id.clone();
        activity.imo_id = sibling.imo_id.clone();
        Self::blank(activity, today)
    }

    /// A new activity with an empty hierarchy.
    pub fn new_activity(today: NaiveDate) -> Self {
        Self::blank(Activity::default(), today)
    }

    fn blank(mut activity: Activity, today: NaiveDate) -> Self {
        activity.start_date = Some(today);
        activity.end_date = Some(today);
        let mut draft = Self::for_activity(&activity, today);
        draft.is_new = true;
        draft
    }

    pub fn id(&self) -> Uuid {
        self.original.id
    }

    pub fn title(&self) -> String {
        if self.is_new {
            return "New Activity".to_string();
        }
        format!("{} {}", self.original.activity_id, self.original.description)
            .trim()
            .to_string()
    }

    /// Reason the draft cannot be saved yet.
    pub fn problem(&self) -> Option<&'static str> {
        if self.start > self.end {
            return Some("End date must not be before the start date.");
        }
        let names = [
            &self.record.objective_name,
            &self.record.loe_name,
            &self.record.imo_name,
        ];
        if names.iter().any(|n| n.trim().is_empty()) {
            return Some("Objective, LOE and IMO names are required.");
        }
        if self.record.activity_id.trim().is_empty() {
            return Some("An activity id is required.");
        }
        None
    }

    pub fn is_valid(&self) -> bool {
        self.problem().is_none()
    }

    /// The record as it would be saved. Blank text clears optional fields.
    pub fn edited(&self) -> Activity {
        let mut activity = self.record.clone();
        activity.activity_id = activity.activity_id.trim().to_string();
        activity.start_date = Some(self.start);
        activity.end_date = Some(self.end);
        for (domain, text) in Domain::all().iter().zip(&self.domains) {
            activity.set_domain_text(*domain, non_blank(text));
        }
        activity.decision_points = self.decision.each_ref().map(PointDraft::to_point);
        activity.decisive_points = self.decisive.each_ref().map(PointDraft::to_point);
        activity.depends_on = non_blank(&self.depends_on);
        activity.branch_notes = non_blank(&self.branch_notes);
        activity.notes = non_blank(&self.notes);
        activity
    }

    pub fn has_changes(&self) -> bool {
        self.is_new || self.edited() != self.original
    }
}

pub enum EditAction {
    None,
    Save(Activity),
    Cancel,
}

fn form_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).color(theme::TEXT_SECONDARY));
}

fn text_row(ui: &mut Ui, label: &str, text: &mut String) {
    form_label(ui, label);
    ui.add(egui::TextEdit::singleline(text).desired_width(f32::INFINITY));
    ui.end_row();
}

fn multiline_row(ui: &mut Ui, label: &str, text: &mut String) {
    form_label(ui, label);
    ui.add(
        egui::TextEdit::multiline(text)
            .desired_rows(2)
            .desired_width(f32::INFINITY),
    );
    ui.end_row();
}

fn points_grid(ui: &mut Ui, kind: PointKind, points: &mut [PointDraft; 3]) {
    egui::Grid::new(("edit_points", kind))
        .num_columns(3)
        .spacing([8.0, 6.0])
        .show(ui, |ui| {
            for (i, point) in points.iter_mut().enumerate() {
                ui.add(
                    egui::TextEdit::singleline(&mut point.label)
                        .hint_text(format!("{} {}", kind.label(), i + 1))
                        .desired_width(200.0),
                );
                ui.checkbox(&mut point.dated, "");
                ui.add_enabled(
                    point.dated,
                    egui_extras::DatePickerButton::new(&mut point.date)
                        .id_salt(&format!("edit_dp_{kind:?}_{i}")),
                );
                ui.end_row();
            }
        });
}

/// Render the edit window for `draft`.
pub fn show_edit_window(draft: &mut EditDraft, ctx: &Context) -> EditAction {
    let mut action = EditAction::None;
    let heading = if draft.is_new { "Add Activity" } else { "Edit Activity" };
    Window::new(RichText::new(heading).strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([440.0, 0.0])
        .show(ctx, |ui| {
            ui.label(RichText::new(draft.title()).color(theme::TEXT_SECONDARY));
            ui.add_space(4.0);

            egui::ScrollArea::vertical()
                .id_salt("edit_activity_scroll")
                .max_height(460.0)
                .show(ui, |ui| {
                    section(ui, "HIERARCHY");
                    egui::Grid::new("edit_hierarchy_grid")
                        .num_columns(2)
                        .spacing([12.0, 6.0])
                        .show(ui, |ui| {
                            let record = &mut draft.record;
                            if draft.is_new {
                                text_row(ui, "Objective", &mut record.objective_name);
                                text_row(ui, "Objective id", &mut record.objective_id);
                                text_row(ui, "LOE", &mut record.loe_name);
                                text_row(ui, "LOE id", &mut record.loe_id);
                                text_row(ui, "IMO", &mut record.imo_name);
                                text_row(ui, "IMO id", &mut record.imo_id);
                                text_row(ui, "Activity id", &mut record.activity_id);
                            } else {
                                for (level, id, name) in [
                                    ("Objective", &record.objective_id, &record.objective_name),
                                    ("LOE", &record.loe_id, &record.loe_name),
                                    ("IMO", &record.imo_id, &record.imo_name),
                                    ("Activity", &record.activity_id, &String::new()),
                                ] {
                                    form_label(ui, level);
                                    ui.label(format!("{id} {name}").trim().to_string());
                                    ui.end_row();
                                }
                            }
                        });

                    section(ui, "DETAILS");
                    egui::Grid::new("edit_activity_grid")
                        .num_columns(2)
                        .spacing([12.0, 6.0])
                        .show(ui, |ui| {
                            multiline_row(ui, "Description", &mut draft.record.description);

                            form_label(ui, "Start");
                            ui.add(egui_extras::DatePickerButton::new(&mut draft.start).id_salt("edit_dp_start"));
                            ui.end_row();

                            form_label(ui, "End");
                            ui.add(egui_extras::DatePickerButton::new(&mut draft.end).id_salt("edit_dp_end"));
                            ui.end_row();

                            form_label(ui, "Priority");
                            egui::ComboBox::from_id_salt("edit_priority")
                                .selected_text(draft.record.priority.label())
                                .show_ui(ui, |ui| {
                                    for p in Priority::all() {
                                        ui.selectable_value(&mut draft.record.priority, *p, p.label());
                                    }
                                });
                            ui.end_row();

                            form_label(ui, "Status");
                            egui::ComboBox::from_id_salt("edit_status")
                                .selected_text(draft.record.status.label())
                                .show_ui(ui, |ui| {
                                    for s in ActivityStatus::all() {
                                        ui.selectable_value(&mut draft.record.status, *s, s.label());
                                    }
                                });
                            ui.end_row();
                        });

                    section(ui, "DOMAINS");
                    egui::Grid::new("edit_domains_grid")
                        .num_columns(2)
                        .spacing([12.0, 6.0])
                        .show(ui, |ui| {
                            for (domain, text) in Domain::all().iter().zip(draft.domains.iter_mut()) {
                                multiline_row(ui, domain.label(), text);
                            }
                        });

                    section(ui, "DECISION POINTS");
                    points_grid(ui, PointKind::Decision, &mut draft.decision);
                    section(ui, "DECISIVE POINTS");
                    points_grid(ui, PointKind::Decisive, &mut draft.decisive);

                    section(ui, "NOTES");
                    egui::Grid::new("edit_notes_grid")
                        .num_columns(2)
                        .spacing([12.0, 6.0])
                        .show(ui, |ui| {
                            text_row(ui, "Depends on", &mut draft.depends_on);
                            multiline_row(ui, "Branch notes", &mut draft.branch_notes);
                            multiline_row(ui, "Notes", &mut draft.notes);
                        });
                });

            if let Some(problem) = draft.problem() {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(problem)
                        .small()
                        .color(theme::OBJECTIVE_BORDER),
                );
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save_btn = egui::Button::new(RichText::new("Save").color(egui::Color32::WHITE))
                    .fill(theme::ARMY_GREEN)
                    .rounding(egui::Rounding::same(4.0));
                if ui
                    .add_enabled_ui(draft.is_valid(), |ui| ui.add_sized([80.0, 28.0], save_btn))
                    .inner
                    .clicked()
                {
                    action = EditAction::Save(draft.edited());
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    action = EditAction::Cancel;
                }
            });
            ui.add_space(2.0);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = EditAction::Cancel;
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn scheduled() -> Activity {
        let mut activity = Activity::new("O", "L", "I", "1.1.1.1");
        activity.start_date = Some(d(2026, 1, 1));
        activity.end_date = Some(d(2026, 3, 1));
        activity.sea = Some("Two frigates".into());
        activity.decision_points[1] = KeyPoint {
            label: Some("Commit reserve".into()),
            date: Some(d(2026, 2, 1)),
        };
        activity
    }

    #[test]
    fn unchanged_draft_has_no_changes() {
        let activity = scheduled();
        let draft = EditDraft::for_activity(&activity, d(2026, 10, 19));
        assert_eq!(draft.edited(), activity);
        assert!(!draft.has_changes());
        assert!(draft.is_valid());
    }

    #[test]
    fn edited_fields_land_in_the_saved_record() {
        let activity = scheduled();
        let mut draft = EditDraft::for_activity(&activity, d(2026, 10, 19));
        draft.end = d(2026, 4, 15);
        draft.record.description = "Harbour patrols".into();
        draft.record.status = ActivityStatus::InProgress;
        draft.domains[4] = "Satellite cover".into();
        draft.decisive[0] = PointDraft {
            label: "Port seized".into(),
            dated: true,
            date: d(2026, 3, 20),
        };
        draft.notes = "  check tides  ".into();

        let saved = draft.edited();
        assert!(draft.has_changes());
        assert_eq!(saved.id, activity.id);
        assert_eq!(saved.start_date, activity.start_date);
        assert_eq!(saved.end_date, Some(d(2026, 4, 15)));
        assert_eq!(saved.description, "Harbour patrols");
        assert_eq!(saved.status, ActivityStatus::InProgress);
        assert_eq!(saved.space.as_deref(), Some("Satellite cover"));
        assert_eq!(saved.sea.as_deref(), Some("Two frigates"));
        assert_eq!(saved.decisive_points[0].date, Some(d(2026, 3, 20)));
        assert_eq!(saved.notes.as_deref(), Some("check tides"));
        assert_eq!(saved.decision_points, activity.decision_points);
    }

    #[test]
    fn cleared_text_and_undated_points_are_dropped() {
        let activity = scheduled();
        let mut draft = EditDraft::for_activity(&activity, d(2026, 10, 19));
        draft.domains[1] = "   ".into();
        draft.decision[1].dated = false;

        let saved = draft.edited();
        assert_eq!(saved.sea, None);
        assert_eq!(saved.decision_points[1].date, None);
        assert_eq!(saved.decision_points[1].label.as_deref(), Some("Commit reserve"));
    }

    #[test]
    fn missing_dates_default_to_today_and_count_as_changes() {
        let activity = Activity::new("O", "L", "I", "1.1.1.1");
        let today = d(2026, 10, 19);
        let draft = EditDraft::for_activity(&activity, today);
        assert_eq!((draft.start, draft.end), (today, today));
        assert!(draft.has_changes());
        assert_eq!(draft.edited().start_date, Some(today));
    }

    #[test]
    fn inverted_range_is_invalid() {
        let activity = Activity::new("O", "L", "I", "1.1.1.1");
        let mut draft = EditDraft::for_activity(&activity, d(2026, 5, 1));
        draft.end = d(2026, 4, 1);
        assert!(!draft.is_valid());
    }

    #[test]
    fn new_draft_inherits_the_sibling_imo() {
        let mut sibling = scheduled();
        sibling.objective_id = "1".into();
        sibling.loe_id = "1.1".into();
        sibling.imo_id = "1.1.1".into();
        let today = d(2026, 10, 19);
        let draft = EditDraft::new_in_imo(&sibling, "1.1.1.2".into(), today);

        assert!(draft.is_new && draft.has_changes() && draft.is_valid());
        let record = draft.edited();
        assert_ne!(record.id, sibling.id);
        assert_eq!(record.imo_id, "1.1.1");
        assert_eq!(record.imo_name, sibling.imo_name);
        assert_eq!(record.activity_id, "1.1.1.2");
        assert_eq!((record.start_date, record.end_date), (Some(today), Some(today)));
        assert_eq!(record.sea, None);
    }

    #[test]
    fn new_activity_needs_a_hierarchy_and_id() {
        let mut draft = EditDraft::new_activity(d(2026, 10, 19));
        assert!(!draft.is_valid());
        draft.record.objective_name = "Secure".into();
        draft.record.loe_name = "Maritime".into();
        draft.record.imo_name = "Patrols".into();
        assert_eq!(draft.problem(), Some("An activity id is required."));
        draft.record.activity_id = "1.1.1.1".into();
        assert!(draft.is_valid());
    }
}
