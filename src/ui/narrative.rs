use egui::{Context, RichText, Ui, Window};
use egui_phosphor::regular::PENCIL_SIMPLE;

use crate::model::dataset::Narrative;
use crate::ui::theme;

const PANEL_WIDTH: f32 = 260.0;
const PANEL_TEXT_HEIGHT: f32 = 90.0;

/// Render the non-empty narrative blocks side by side. Text is shown raw.
/// Returns `true` when the user asks to edit the narrative.
pub fn show_narrative(narrative: &Narrative, ui: &mut Ui) -> bool {
    let mut edit = false;
    let blocks = narrative.blocks();
    ui.horizontal_top(|ui| {
        if ui
            .small_button(PENCIL_SIMPLE)
            .on_hover_text("Edit narrative")
            .clicked()
        {
            edit = true;
        }

        if blocks.is_empty() {
            ui.label(
                RichText::new("No narrative has been written for this approach.")
                    .italics()
                    .color(theme::TEXT_SECONDARY),
            );
            return;
        }

        egui::ScrollArea::horizontal()
            .id_salt("narrative_scroll")
            .show(ui, |ui| {
                ui.horizontal_top(|ui| {
                    for (title, text) in blocks {
                        egui::Frame::group(ui.style())
                            .fill(theme::BEIGE)
                            .stroke(egui::Stroke::new(1.0, theme::KHAKI))
                            .show(ui, |ui| {
                                ui.set_width(PANEL_WIDTH);
                                ui.label(
                                    RichText::new(title)
                                        .font(theme::font_header())
                                        .strong()
                                        .color(theme::ARMY_GREEN),
                                );
                                ui.separator();
                                egui::ScrollArea::vertical()
                                    .id_salt(title)
                                    .max_height(PANEL_TEXT_HEIGHT)
                                    .show(ui, |ui| {
                                        ui.label(RichText::new(text).size(11.0));
                                    });
                            });
                    }
                });
            });
    });
    edit
}

/// Editable copy of the six narrative blocks, in panel order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NarrativeDraft {
    pub current_environment: String,
    pub problem_statement: String,
    pub desired_end_state: String,
    pub objective_conditions: String,
    pub effects: String,
    pub communication_narrative: String,
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl NarrativeDraft {
    pub fn from_narrative(narrative: &Narrative) -> Self {
        let text = |t: &Option<String>| t.clone().unwrap_or_default();
        Self {
            current_environment: text(&narrative.current_environment),
            problem_statement: text(&narrative.problem_statement),
            desired_end_state: text(&narrative.desired_end_state),
            objective_conditions: text(&narrative.objective_conditions),
            effects: text(&narrative.effects),
            communication_narrative: text(&narrative.communication_narrative),
        }
    }

    /// Blank blocks are stored as absent.
    pub fn to_narrative(&self) -> Narrative {
        Narrative {
            problem_statement: non_blank(&self.problem_statement),
            current_environment: non_blank(&self.current_environment),
            desired_end_state: non_blank(&self.desired_end_state),
            objective_conditions: non_blank(&self.objective_conditions),
            effects: non_blank(&self.effects),
            communication_narrative: non_blank(&self.communication_narrative),
        }
    }

    fn fields_mut(&mut self) -> [(&'static str, &mut String); 6] {
        [
            ("Current Operational Environment", &mut self.current_environment),
            ("Problem Statement", &mut self.problem_statement),
            ("Desired Future State", &mut self.desired_end_state),
            ("Objective Desired Conditions", &mut self.objective_conditions),
            ("Effects", &mut self.effects),
            ("Core Communication Narrative", &mut self.communication_narrative),
        ]
    }
}

pub enum NarrativeAction {
    None,
    Save(Narrative),
    Cancel,
}

/// Render the narrative edit window.
pub fn show_narrative_editor(draft: &mut NarrativeDraft, ctx: &Context) -> NarrativeAction {
    let mut action = NarrativeAction::None;
    Window::new(RichText::new("Edit Narrative").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([520.0, 0.0])
        .show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .id_salt("narrative_editor_scroll")
                .max_height(480.0)
                .show(ui, |ui| {
                    for (title, text) in draft.fields_mut() {
                        ui.label(RichText::new(title).strong().color(theme::ARMY_GREEN));
                        ui.add(
                            egui::TextEdit::multiline(text)
                                .desired_rows(3)
                                .desired_width(f32::INFINITY),
                        );
                        ui.add_space(6.0);
                    }
                });

            ui.separator();
            ui.horizontal(|ui| {
                let save_btn = egui::Button::new(RichText::new("Save").color(egui::Color32::WHITE))
                    .fill(theme::ARMY_GREEN)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save_btn).clicked() {
                    action = NarrativeAction::Save(draft.to_narrative());
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    action = NarrativeAction::Cancel;
                }
            });
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        action = NarrativeAction::Cancel;
    }
    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draft_keeps_text_and_drops_blank_blocks() {
        let narrative = Narrative {
            problem_statement: Some("Adversary holds the strait".into()),
            effects: Some("Deny resupply".into()),
            ..Default::default()
        };
        let mut draft = NarrativeDraft::from_narrative(&narrative);
        assert_eq!(draft.to_narrative(), narrative);

        draft.effects = "  ".into();
        draft.desired_end_state = " Strait open to shipping\n".into();
        let saved = draft.to_narrative();
        assert_eq!(saved.effects, None);
        assert_eq!(saved.desired_end_state.as_deref(), Some("Strait open to shipping"));
        assert_eq!(saved.problem_statement, narrative.problem_statement);
    }

    #[test]
    fn editor_lists_blocks_in_panel_order() {
        let mut draft = NarrativeDraft::default();
        let titles: Vec<_> = draft.fields_mut().map(|(t, _)| t).to_vec();
        let shown = Narrative {
            problem_statement: Some("a".into()),
            current_environment: Some("b".into()),
            desired_end_state: Some("c".into()),
            objective_conditions: Some("d".into()),
            effects: Some("e".into()),
            communication_narrative: Some("f".into()),
        };
        let panel: Vec<_> = shown.blocks().into_iter().map(|(t, _)| t).collect();
        assert_eq!(titles, panel);
    }
}
