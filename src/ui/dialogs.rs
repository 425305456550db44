use crate::app::OpApproachApp;
use crate::ui::theme;
use egui::{Context, RichText, Window};

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut OpApproachApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([320.0, 190.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Operational Approach Timeline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Objectives, lines of effort and activities");
                ui.label("on one draggable timeline.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

fn column_row(ui: &mut egui::Ui, column: &str, headers: &str) {
    ui.label(RichText::new(column).strong());
    ui.label(headers);
    ui.end_row();
}

/// Render the "CSV Import Format" help dialog.
pub fn show_csv_help_dialog(app: &mut OpApproachApp, ctx: &Context) {
    let mut should_close = false;

    Window::new(RichText::new("CSV Import Format").strong().size(14.0))
        .resizable(true)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_size([600.0, 520.0])
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.add_space(4.0);

                // ── Delimiters ───────────────────────────────────────────
                ui.label(RichText::new("Delimiters").strong());
                ui.label("The delimiter is auto-detected: comma (,), semicolon (;), or tab.");
                ui.add_space(8.0);

                // ── Required columns ─────────────────────────────────────
                ui.label(RichText::new("Required Columns").strong());
                ui.add_space(2.0);
                egui::Grid::new("csv_required")
                    .num_columns(2)
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Column").underline());
                        ui.label(RichText::new("Accepted headers (case-insensitive)").underline());
                        ui.end_row();
                        column_row(ui, "Objective", "Objective_Title, Objective");
                        column_row(ui, "Line of Effort", "LOE_Title, LOE, Line of Effort");
                        column_row(ui, "IMO", "IMO_Title, IMO");
                    });
                ui.add_space(8.0);

                // ── Optional columns ─────────────────────────────────────
                ui.label(RichText::new("Optional Columns").strong());
                ui.add_space(2.0);
                egui::Grid::new("csv_optional")
                    .num_columns(2)
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Column").underline());
                        ui.label(RichText::new("Accepted headers").underline());
                        ui.end_row();
                        column_row(ui, "Dotted ids", "Objective_ID, LOE_ID, IMO_ID, OAI_ID, Sub_OAI_ID");
                        column_row(ui, "Description", "OAI_Description, Description");
                        column_row(ui, "Domains", "Land, Sea, Air, Cyber, Space");
                        column_row(ui, "Dates", "Start_Date, End_Date");
                        column_row(ui, "Key points", "Decision_Point_{1-3}_Label / _Date, Decisive_Point_{1-3}_Label / _Date");
                        column_row(ui, "Single key point", "Decisive_Point + DP_Date, Decision_Point + Decision_Date");
                        column_row(ui, "Planning notes", "Depends_On, Branch_Notes, Notes");
                        column_row(ui, "Priority", "Priority (critical / high / medium / low)");
                        column_row(ui, "Status", "Status (planned / in_progress / completed / cancelled)");
                    });
                ui.add_space(8.0);

                // ── Date formats ─────────────────────────────────────────
                ui.label(RichText::new("Supported Date Formats").strong());
                ui.add_space(2.0);
                for fmt in &[
                    "YYYY-MM-DD   (e.g. 2026-06-15)",
                    "MM/DD/YYYY   (e.g. 06/15/2026)",
                    "DD/MM/YYYY   (e.g. 15/06/2026)",
                    "YYYY/MM/DD   (e.g. 2026/06/15)",
                    "DD-MM-YYYY   (e.g. 15-06-2026)",
                    "DD.MM.YYYY   (e.g. 15.06.2026)",
                ] {
                    ui.label(RichText::new(*fmt).monospace().size(11.0));
                }
                ui.add_space(8.0);

                // ── Notes ────────────────────────────────────────────────
                ui.label(RichText::new("Notes").strong());
                ui.add_space(2.0);
                let notes = [
                    "• Header matching ignores case, spaces, hyphens and underscores.",
                    "• Rows without an objective, LOE or IMO name are skipped.",
                    "• Dates that cannot be parsed are left empty and logged.",
                    "• Imported data is saved as a new dataset in the data folder.",
                ];
                for note in &notes {
                    ui.label(RichText::new(*note).small());
                }
                ui.add_space(10.0);

                // ── Example ──────────────────────────────────────────────
                ui.label(RichText::new("Minimal Example").strong());
                ui.add_space(2.0);
                let example = "Objective_Title,LOE_Title,LOE_ID,IMO_Title,IMO_ID,OAI_ID,Start_Date,End_Date\n\
                               Secure the region,Maritime,1.1,Patrols,1.1.1,1.1.1.1,2026-01-01,2026-06-30\n\
                               Secure the region,Maritime,1.1,Patrols,1.1.1,1.1.1.2,2026-03-01,2026-09-30";
                egui::Frame::canvas(ui.style()).show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut example.to_string())
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .interactive(false),
                    );
                });
                ui.add_space(8.0);
            });

            ui.separator();
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                if ui.add_sized([80.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
            ui.add_space(2.0);
        });

    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_csv_help = false;
    }
}
