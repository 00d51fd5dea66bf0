use depgraph_view::layout::Scene;
use eframe::egui::{self, PointerButton, Rect, Ui};

use super::super::ViewModel;
use super::super::render_utils::to_device;

impl ViewModel {
    pub(in crate::app) fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .unwrap_or_else(|| rect.center());
        if let Some(viewport) = self.viewport.as_mut() {
            // Wheel up grows the content, which means a smaller graph window.
            viewport.zoom_at(to_device(rect, pointer), -(scroll as f64));
        }
    }

    pub(in crate::app) fn handle_graph_pan(&mut self, response: &egui::Response) {
        let pan_drag = (self.panning && response.dragged_by(PointerButton::Primary))
            || response.dragged_by(PointerButton::Secondary)
            || response.dragged_by(PointerButton::Middle);

        if pan_drag && let Some(viewport) = self.viewport.as_mut() {
            let delta = response.drag_delta();
            viewport.pan(delta.x as f64, delta.y as f64);
        }

        if response.drag_stopped() {
            self.panning = false;
        }
    }

    /// Primary drag that starts on a node moves the node; anywhere else it pans.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
        scene: &Scene,
    ) {
        let Some(viewport) = self.viewport else {
            return;
        };

        if response.drag_started_by(PointerButton::Primary) {
            let pressed_node = ui
                .input(|input| input.pointer.press_origin())
                .and_then(|origin| scene.node_at(to_device(rect, origin)));
            match pressed_node {
                Some(node) => {
                    self.drag.start(node, &mut self.simulation);
                }
                None => self.panning = true,
            }
        }

        let Some(node) = self.drag.active() else {
            return;
        };

        if response.dragged_by(PointerButton::Primary)
            && let Some(pointer) = response.interact_pointer_pos()
        {
            self.drag
                .move_to(node, to_device(rect, pointer), &viewport, &mut self.simulation);
        }

        if response.drag_stopped() {
            self.drag.end(node, &mut self.simulation);
        }
    }

    pub(in crate::app) fn hovered_node(&self, ui: &Ui, rect: Rect, scene: &Scene) -> Option<usize> {
        ui.input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))
            .and_then(|pointer| scene.node_at(to_device(rect, pointer)))
    }
}
