use std::time::Instant;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::SourceFormat;
use crate::state::{AppState, ResultDisplay};

const FOUND_GREEN: Color32 = Color32::from_rgb(0x27, 0xae, 0x60);
const ERROR_RED: Color32 = Color32::from_rgb(0xe7, 0x4c, 0x3c);

// ---------------------------------------------------------------------------
// Left side panel – query inputs and result
// ---------------------------------------------------------------------------

/// Render the lookup panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Lookup");
    ui.separator();

    if state.session.dataset().is_none() {
        ui.label("No dataset loaded.");
        if ui.button("Open…").clicked() {
            open_file_dialog(state);
        }
        return;
    }

    egui::Grid::new("query_inputs")
        .num_columns(2)
        .spacing([8.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Measured Density:");
            ui.text_edit_singleline(&mut state.density_input);
            ui.end_row();

            ui.strong("Observed Temperature:");
            let temp = ui.text_edit_singleline(&mut state.temperature_input);
            ui.end_row();

            if temp.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
                state.find();
            }
        });

    ui.add_space(8.0);
    if ui
        .button(RichText::new("Find Corresponding Density").strong())
        .clicked()
    {
        state.find();
    }

    ui.add_space(8.0);
    ui.strong("Result:");
    let color = match state.result {
        ResultDisplay::Found(_) => FOUND_GREEN,
        ResultDisplay::NoMatch => ERROR_RED,
        ResultDisplay::Prompt => ui.visuals().text_color(),
    };
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.label(RichText::new(state.result.text()).color(color));
    });

    // ---- Dataset summary ----
    ui.add_space(12.0);
    ui.separator();
    if let Some(ds) = state.session.dataset() {
        ui.strong("Data Summary");
        ui.label(format!("Rows: {}", ds.len()));
        ui.label(format!("Columns: {}", ds.columns().len()));
        if let Some(name) = state.session.source_name() {
            ui.label(format!("File: {name}"));
        }
    }

    if let Some(scale) = &state.color_scale {
        ui.add_space(8.0);
        ui.strong("Corresponding Density");
        for (label, c) in scale.legend_entries(5) {
            ui.label(RichText::new(format!("■ {label}")).color(c));
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = state.session.dataset() {
            let name = state.session.source_name().unwrap_or("data");
            ui.label(format!("Loaded: {name} ({} rows)", ds.len()));
        } else {
            ui.label("No file selected");
        }

        if state.gate.is_enabled() {
            ui.separator();
            if let Some(left) = state.session.remaining(Instant::now()) {
                ui.label(format!("Session expires in: {} minutes", left.as_secs() / 60));
            }
            if ui.button("Logout").clicked() {
                state.logout();
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Login form
// ---------------------------------------------------------------------------

/// Render the password form that replaces the main view while locked.
pub fn login_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(80.0);
        ui.heading("Density-Temperature Lookup");
        ui.label("Authentication Required");
        ui.add_space(12.0);

        let field = ui.add(
            egui::TextEdit::singleline(&mut state.password_input)
                .password(true)
                .hint_text("Enter Password")
                .desired_width(240.0),
        );
        let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Login").clicked() || submitted {
            state.login(Instant::now());
        }

        if let Some(msg) = &state.status_message {
            ui.add_space(8.0);
            ui.label(RichText::new(msg).color(ERROR_RED));
        }

        ui.add_space(16.0);
        ui.small(format!(
            "Sessions expire after {} minutes · Files are limited to {} MB",
            state.config.session_timeout_secs / 60,
            state.config.max_source_bytes / 1024 / 1024
        ));
    });
}

// ---------------------------------------------------------------------------
// Data preview table
// ---------------------------------------------------------------------------

/// Render the first `preview_rows` rows, highlighting the last match.
pub fn preview_table(ui: &mut Ui, state: &AppState) {
    let Some(ds) = state.session.dataset() else {
        return;
    };
    let matched = state
        .session
        .last_lookup()
        .and_then(|l| l.result)
        .map(|m| m.row_index);
    let shown = ds.len().min(state.config.preview_rows);

    ui.strong("Data Preview");
    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .columns(Column::auto().at_least(90.0), ds.columns().len())
        .header(20.0, |mut header| {
            for col in ds.columns() {
                header.col(|ui: &mut Ui| {
                    ui.strong(col);
                });
            }
        })
        .body(|mut body| {
            for idx in 0..shown {
                let Some(cells) = ds.cells(idx) else {
                    continue;
                };
                body.row(18.0, |mut row| {
                    row.set_selected(matched == Some(idx));
                    for cell in cells {
                        row.col(|ui: &mut Ui| {
                            ui.label(cell.to_string());
                        });
                    }
                });
            }
        });

    if ds.len() > shown {
        ui.small(format!("Showing first {shown} rows of {} total rows", ds.len()));
    }
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open density/temperature table")
        .add_filter("Supported files", &SourceFormat::EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("Excel", &["xlsx", "xls"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
