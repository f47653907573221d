use eframe::egui::{Color32, Ui};
use egui_plot::{MarkerShape, Plot, PlotPoints, Points};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Density / temperature scatter plot (central panel)
// ---------------------------------------------------------------------------

const QUERY_COLOR: Color32 = Color32::from_rgb(0xd6, 0x1f, 0x1f);

/// Render the scatter plot of the loaded rows, coloured by corresponding
/// density, with the last query marked by a red cross.
pub fn scatter_plot(ui: &mut Ui, state: &AppState, height: f32) {
    let dataset = match state.session.dataset() {
        Some(ds) => ds,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to begin  (File → Open…)");
            });
            return;
        }
    };

    let last = state.session.last_lookup();
    let matched = last.and_then(|l| l.result).map(|m| m.row_index);

    Plot::new("density_temperature_plot")
        .height(height)
        .legend(egui_plot::Legend::default())
        .x_axis_label("Measured Density")
        .y_axis_label("Observed Temperature")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (idx, row) in dataset.rows().iter().enumerate() {
                let color = state
                    .color_scale
                    .map(|s| s.color_for(row.corresponding_density))
                    .unwrap_or(Color32::LIGHT_BLUE);
                let point: PlotPoints =
                    std::iter::once([row.measured_density, row.observed_temperature]).collect();

                let mut points = Points::new(point)
                    .color(color)
                    .filled(true)
                    .radius(4.0);
                if matched == Some(idx) {
                    points = points
                        .shape(MarkerShape::Diamond)
                        .radius(7.0)
                        .name("Nearest Match");
                }
                plot_ui.points(points);
            }

            if let Some(l) = last {
                let q = l.query;
                let marker: PlotPoints =
                    std::iter::once([q.measured_density(), q.observed_temperature()]).collect();
                plot_ui.points(
                    Points::new(marker)
                        .shape(MarkerShape::Cross)
                        .radius(8.0)
                        .color(QUERY_COLOR)
                        .name("Your Input"),
                );
            }
        });
}
