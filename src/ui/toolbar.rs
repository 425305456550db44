use crate::app::OpApproachApp;
use crate::ui::theme;
use egui::{menu, RichText, Ui};

fn font_menu() -> egui::FontId {
    egui::FontId::proportional(13.0)
}

/// Render the top menu bar.
pub fn show_toolbar(app: &mut OpApproachApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(font_menu()), |ui| {
            if ui.button("  Open Dataset...").clicked() {
                app.open_dataset();
                ui.close_menu();
            }
            if ui.button("  Reload          F5").clicked() {
                app.reload();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Import CSV...").clicked() {
                app.import_csv();
                ui.close_menu();
            }
            if ui.button("  Export CSV...").clicked() {
                app.export_csv();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Open Data Folder").clicked() {
                app.open_data_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Edit  ").font(font_menu()), |ui| {
            if ui.button("  Add Activity...").clicked() {
                app.begin_new_activity();
                ui.close_menu();
            }
            let selected = app.selected;
            if ui
                .add_enabled(selected.is_some(), egui::Button::new("  Edit Activity..."))
                .clicked()
            {
                if let Some(id) = selected {
                    app.begin_edit(id);
                }
                ui.close_menu();
            }
            if ui
                .add_enabled(selected.is_some(), egui::Button::new("  Delete Activity"))
                .clicked()
            {
                if let Some(id) = selected {
                    app.confirm_delete(id);
                }
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Edit Narrative...").clicked() {
                app.begin_narrative_edit();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(font_menu()), |ui| {
            if ui.checkbox(&mut app.show_narrative, "Narrative panels").clicked() {
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(font_menu()), |ui| {
            if ui.button("CSV Format").clicked() {
                app.show_csv_help = true;
                ui.close_menu();
            }
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned dataset name
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!(
                    "{} ({})",
                    app.dataset.name,
                    app.dataset.status.label()
                ))
                .size(11.0)
                .color(theme::TEXT_SECONDARY),
            );
        });
    });
}
