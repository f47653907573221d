use std::time::{Duration, Instant};

use eframe::egui;

use crate::config::Config;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DensityLookupApp {
    pub state: AppState,
}

impl DensityLookupApp {
    pub fn new(config: Config) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl Default for DensityLookupApp {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl eframe::App for DensityLookupApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let unlocked = self.state.check_access(Instant::now());

        if !unlocked {
            egui::CentralPanel::default().show(ctx, |ui| {
                panels::login_panel(ui, &mut self.state);
            });
            return;
        }

        // Keep the expiry countdown moving while gated.
        if self.state.gate.is_enabled() {
            ctx.request_repaint_after(Duration::from_secs(30));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: query and result ----
        egui::SidePanel::left("lookup_panel")
            .default_width(280.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot and preview ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let plot_height = ui.available_height() * 0.6;
            plot::scatter_plot(ui, &self.state, plot_height);
            ui.separator();
            panels::preview_table(ui, &self.state);
        });
    }
}
