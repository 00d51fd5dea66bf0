use depgraph_view::layout::Phase;
use eframe::egui::{self, Align, Color32, Context, Layout};

use super::super::{GraphSource, ViewModel};

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &GraphSource,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("depgraph-view");
                    ui.separator();
                    ui.label(format!("source: {source}"));
                    ui.label(format!("nodes: {}", self.simulation.graph().node_count()));
                    ui.label(format!("links: {}", self.simulation.graph().link_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload graph"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    if is_loading {
                        ui.spinner();
                    }
                    if let Some(message) = &self.reload_error {
                        ui.colored_label(Color32::from_rgb(240, 110, 100), "reload failed")
                            .on_hover_text(message.as_str());
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.status_text());
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_graph(ui));
    }

    fn status_text(&self) -> String {
        let phase = match self.simulation.phase() {
            Phase::Warming => "warming",
            Phase::Cooling => "cooling",
            Phase::Settled => "settled",
        };
        format!(
            "{phase}  |  alpha {:.4}  |  tick {}",
            self.simulation.state().alpha,
            self.simulation.ticks()
        )
    }
}
