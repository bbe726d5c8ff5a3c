use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::{Size, StripBuilder};

use agri_climate_dash::presentation::{ChartSpec, DeviceClass};

use crate::state::AppState;
use crate::ui::{charts, panels};

/// Vertical room for a chart's title and notice line above the plot.
const CHART_HEADER: f32 = 48.0;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.update_viewport(ctx.screen_rect().width());
        let mobile = self.state.device == DeviceClass::Mobile;

        // ---- Top panel: menu bar, title, mobile filters ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
            if mobile {
                ui.separator();
                panels::mobile_filter_panel(ui, &mut self.state);
            }
        });

        egui::TopBottomPanel::bottom("footer").show(ctx, |ui| {
            panels::footer(ui);
        });

        // ---- Left side panel: filters (desktop only) ----
        if !mobile {
            egui::SidePanel::left("filter_panel")
                .default_width(220.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::side_panel(ui, &mut self.state);
                });
        }

        // ---- Central panel: charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &self.state;
            let (Some(views), Some(dashboard)) = (&state.views, &state.dashboard) else {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a data file to view the dashboard  (File → Open…)");
                });
                return;
            };

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    if mobile {
                        for spec in &dashboard.charts {
                            charts::chart(ui, spec, views, state);
                            ui.add_space(12.0);
                        }
                    } else {
                        chart_grid(ui, &dashboard.charts, |ui, spec| {
                            charts::chart(ui, spec, views, state)
                        });
                    }
                });
        });
    }
}

/// Lay the charts out two per row.
fn chart_grid(ui: &mut Ui, specs: &[ChartSpec], mut draw: impl FnMut(&mut Ui, &ChartSpec)) {
    let rows: Vec<&[ChartSpec]> = specs.chunks(2).collect();
    let mut builder = StripBuilder::new(ui);
    for row in &rows {
        let height = row.iter().map(|s| s.height).fold(0.0, f32::max) + CHART_HEADER;
        builder = builder.size(Size::exact(height));
    }
    builder.vertical(|mut strip| {
        for row in &rows {
            strip.strip(|builder| {
                builder
                    .sizes(Size::remainder(), 2)
                    .horizontal(|mut strip| {
                        for spec in row.iter() {
                            strip.cell(|ui| draw(ui, spec));
                        }
                        if row.len() == 1 {
                            strip.empty();
                        }
                    });
            });
        }
    });
}
