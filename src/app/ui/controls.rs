use depgraph_view::layout::{Control, DragController};
use eframe::egui::{self, Response, Ui};

use super::super::render_utils::to_color32;
use super::super::{LabelMode, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search nodes")
            .on_hover_text("Fuzzy-highlight matching node ids; everything else is dimmed.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Matches against the full slash-separated node id.");

        ui.separator();

        ui.label("Labels");
        ui.horizontal_wrapped(|ui| {
            ui.selectable_value(&mut self.label_mode, LabelMode::FullId, "Full id")
                .on_hover_text("Show the complete node path next to each node.");
            ui.selectable_value(&mut self.label_mode, LabelMode::Name, "Name")
                .on_hover_text("Show only the last path segment.");
            ui.selectable_value(&mut self.label_mode, LabelMode::Hidden, "Hidden");
        });

        ui.separator();

        ui.horizontal_wrapped(|ui| {
            if ui
                .button("Restart layout")
                .on_hover_text("Return every node to its initial spiral position and run again.")
                .clicked()
            {
                self.simulation.reset();
                self.drag = DragController::new();
            }
            if ui
                .add_enabled(self.simulation.is_running(), egui::Button::new("Stop"))
                .on_hover_text("Freeze the layout where it is.")
                .clicked()
            {
                self.simulation.stop();
            }
            if ui
                .button("Reset view")
                .on_hover_text("Center the graph origin at 1:1 scale.")
                .clicked()
            {
                self.viewport = None;
            }
        });

        ui.add_space(4.0);
        self.draw_physics_tuning(ui);

        ui.add_space(4.0);
        ui.collapsing("Groups", |ui| {
            for (group, color) in self.colors.legend() {
                ui.horizontal(|ui| {
                    ui.colored_label(to_color32(color), "⏺");
                    ui.label(if group.is_empty() { "(root)" } else { group });
                });
            }
        });
    }

    fn draw_physics_tuning(&mut self, ui: &mut Ui) {
        let mut forces = self.forces();
        let mut simulation = self.simulation_config();
        let mut sliders = SliderActivity::default();

        ui.collapsing("Physics tuning", |ui| {
            sliders.record(
                &ui.add(
                    egui::Slider::new(&mut forces.charge_strength, -20_000.0..=-100.0)
                        .text("Charge")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Many-body strength; more negative pushes nodes further apart."),
            );

            sliders.record(
                &ui.add(
                    egui::Slider::new(&mut forces.link_distance, 5.0..=200.0)
                        .text("Link distance")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Rest length of every link spring."),
            );

            sliders.record(
                &ui.add(
                    egui::Slider::new(&mut forces.link_strength_scale, 0.1..=3.0)
                        .text("Link strength")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Multiplier on the degree-weighted spring strength."),
            );

            sliders.record(
                &ui.add(
                    egui::Slider::new(&mut forces.center_strength, 0.0..=0.5)
                        .text("Centering")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Pull of each axis toward the graph origin."),
            );

            sliders.record(
                &ui.add(
                    egui::Slider::new(&mut simulation.velocity_decay, 0.1..=0.95)
                        .text("Velocity retention")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Share of velocity kept between ticks; lower values settle faster."),
            );

            sliders.record(
                &ui.add(
                    egui::Slider::new(&mut forces.theta, 0.3..=1.5)
                        .text("Barnes-Hut theta")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text(
                    "Accuracy of approximate repulsion on large graphs; lower is more exact.",
                ),
            );
        });

        if sliders.changed {
            self.simulation.set_force_config(forces);
            self.simulation.set_config(simulation);
            self.simulation.apply(Control::Reheat);
            self.tuning_hot = true;
        }
        if sliders.settles(self.tuning_hot) && self.drag.active().is_none() {
            self.simulation.apply(Control::Cool);
            self.tuning_hot = false;
        }
    }
}

/// Pointer state of the tuning sliders for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct SliderActivity {
    changed: bool,
    held: bool,
    released: bool,
}

impl SliderActivity {
    fn record(&mut self, response: &Response) {
        self.changed |= response.changed();
        self.held |= response.dragged();
        self.released |= response.drag_stopped();
    }

    /// A reheated layout stays warm while any slider is held. It cools on
    /// release, or one quiet frame after a click or keyboard edit.
    fn settles(self, hot: bool) -> bool {
        hot && !self.held && (self.released || !self.changed)
    }
}
