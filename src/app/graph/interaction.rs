use eframe::egui::{self, Rect, Ui};

use super::super::GraphCanvas;

/// Small nodes stay clickable at low zoom.
const MIN_PICK_RADIUS: f32 = 6.0;

impl GraphCanvas {
    /// Mouse wheel zooms around the pointer.
    pub(in crate::app) fn handle_zoom(&mut self, ui: &Ui, rect: Rect, response: &egui::Response) {
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
        let zoom_factor = (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15);
        self.zoom.zoom_about(zoom_factor, pointer - rect.min);
    }

    /// Primary or middle drags that start on the background pan the view.
    /// The secondary button never pans.
    pub(in crate::app) fn handle_pan(&mut self, response: &egui::Response) {
        if response.drag_started() {
            self.pan_allowed = self.hovered.is_none();
        }

        if self.pan_allowed
            && (response.dragged_by(egui::PointerButton::Primary)
                || response.dragged_by(egui::PointerButton::Middle))
        {
            self.zoom.pan_by(response.drag_delta());
        }

        if response.drag_stopped() {
            self.pan_allowed = false;
        }
    }

    /// Closest visible node under the pointer, if any.
    pub(in crate::app) fn hovered_index(&self, ui: &Ui, rect: Rect) -> Option<usize> {
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|pointer| rect.contains(*pointer))?;

        let scratch = &self.view_scratch;
        scratch
            .visible_indices
            .iter()
            .filter_map(|&index| {
                let distance = scratch.screen_positions[index].distance(pointer);
                let reach = scratch.screen_radii[index].max(MIN_PICK_RADIUS);
                (distance <= reach).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }
}
