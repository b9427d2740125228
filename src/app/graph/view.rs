use std::collections::HashSet;

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, Vec2, vec2};

use crate::util::truncate_label;

use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, edge_visible, with_opacity,
};
use super::super::{CanvasResponse, GraphCanvas};

const LABEL_MAX_CHARS: usize = 24;
const MIN_SCREEN_RADIUS: f32 = 1.5;

/// Label opacity at zoom scale `scale`: opaque at or above `threshold`,
/// gone at half of it, linear in between.
pub(in crate::app) fn label_opacity(scale: f32, threshold: f32) -> f32 {
    if scale >= threshold {
        return 1.0;
    }
    let hidden_below = threshold * 0.5;
    ((scale - hidden_below) / (threshold - hidden_below)).clamp(0.0, 1.0)
}

impl GraphCanvas {
    /// Tracks the viewport size; a new size moves the centering target but
    /// keeps every position.
    fn track_viewport(&mut self, size: Vec2) {
        if self.viewport == Some(size) {
            return;
        }
        self.viewport = Some(size);
        self.simulation.set_center(size * 0.5);
    }

    fn update_screen_space(&mut self, rect: Rect) {
        let scale = self.zoom.transform().k;
        let positions = self.simulation.positions();

        let scratch = &mut self.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        scratch.visible_indices.clear();

        for (index, (node, world)) in self.nodes.iter().zip(positions).enumerate() {
            let position = self.zoom.world_to_screen(rect.min, *world);
            let radius = (node.size * scale).max(MIN_SCREEN_RADIUS);
            scratch.screen_positions.push(position);
            scratch.screen_radii.push(radius);
            if circle_visible(rect, position, radius) {
                scratch.visible_indices.push(index);
            }
        }
    }

    /// Draws one frame and reports clicks and hover changes. Runs one
    /// simulation tick per call.
    pub(in crate::app) fn show(
        &mut self,
        ui: &mut Ui,
        selected: Option<&str>,
        search_matches: Option<&HashSet<usize>>,
    ) -> CanvasResponse {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        self.track_viewport(rect.size());
        self.handle_zoom(ui, rect, &response);
        self.handle_pan(&response);

        let frame_seconds = ui.input(|input| input.stable_dt).clamp(0.0, 0.1);
        let zoom_animating = self.zoom.advance(frame_seconds);
        draw_background(&painter, rect, self.zoom.transform());

        let mut canvas_response = CanvasResponse::default();

        if self.nodes.is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Nothing to show. Enable a record type or load a portfolio with records.",
                FontId::proportional(14.0),
                Color32::from_gray(170),
            );
            canvas_response.hover_changed = self.hovered.take().is_some();
            canvas_response.background_clicked =
                response.clicked_by(egui::PointerButton::Primary);
            if zoom_animating {
                ui.ctx().request_repaint();
            }
            return canvas_response;
        }

        let simulation_running = self.simulation.tick();
        if simulation_running || zoom_animating {
            ui.ctx().request_repaint();
        }

        self.update_screen_space(rect);

        let hovered = self.hovered_index(ui, rect);
        if hovered != self.hovered {
            canvas_response.hover_changed = true;
            self.hovered = hovered;
        }
        canvas_response.hovered = hovered.map(|index| self.nodes[index].id.clone());

        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        } else if self.pan_allowed && response.dragged() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            match hovered {
                Some(index) => canvas_response.clicked = Some(self.nodes[index].id.clone()),
                None => canvas_response.background_clicked = true,
            }
        }

        let selected_index =
            selected.and_then(|id| self.nodes.iter().position(|node| node.id == id));
        let search_active = search_matches.is_some_and(|matches| !matches.is_empty());

        self.draw_links(&painter, rect, selected_index);
        self.draw_nodes(&painter, selected_index, search_matches, search_active);
        self.draw_labels(&painter, search_matches);

        if let Some(index) = hovered {
            let node = &self.nodes[index];
            let mut summary = format!("{}  |  {}", node.title, node.kind.label());
            if let Some(status) = &node.status {
                summary.push_str(&format!("  |  {status}"));
            }
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                summary,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        canvas_response
    }

    fn draw_links(&self, painter: &egui::Painter, rect: Rect, selected: Option<usize>) {
        let positions = &self.view_scratch.screen_positions;
        let base_stroke = Stroke::new(
            self.style.line_thickness,
            Color32::from_rgba_unmultiplied(120, 128, 140, 110),
        );
        let selected_stroke = Stroke::new(
            self.style.line_thickness + 1.0,
            Color32::from_rgb(241, 166, 94),
        );

        for (source, target) in self.simulation.link_endpoints() {
            let (start, end) = (positions[source], positions[target]);
            if !edge_visible(rect, start, end, self.style.line_thickness) {
                continue;
            }

            let stroke = if selected.is_some_and(|index| index == source || index == target) {
                selected_stroke
            } else {
                base_stroke
            };
            painter.line_segment([start, end], stroke);
        }
    }

    fn draw_nodes(
        &self,
        painter: &egui::Painter,
        selected: Option<usize>,
        search_matches: Option<&HashSet<usize>>,
        search_active: bool,
    ) {
        let scratch = &self.view_scratch;
        let search_color = Color32::from_rgb(103, 196, 255);
        let selected_color = Color32::from_rgb(245, 206, 93);

        for &index in &scratch.visible_indices {
            let node = &self.nodes[index];
            let position = scratch.screen_positions[index];
            let radius = scratch.screen_radii[index];

            let is_match = search_matches.is_some_and(|matches| matches.contains(&index));
            let is_selected = selected == Some(index);
            let is_hovered = self.hovered == Some(index);

            let color = if is_hovered {
                blend_color(node.color, Color32::WHITE, 0.3)
            } else if is_match {
                blend_color(node.color, search_color, 0.55)
            } else if search_active && !is_selected {
                dim_color(node.color, 0.4)
            } else {
                node.color
            };

            painter.circle_filled(position, radius, color);
            painter.circle_stroke(
                position,
                radius,
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(12, 14, 18, 200)),
            );

            if is_match {
                painter.circle_stroke(position, radius + 2.5, Stroke::new(1.5, search_color));
            }
            if is_selected {
                painter.circle_stroke(position, radius + 4.0, Stroke::new(2.2, selected_color));
            }
        }
    }

    fn draw_labels(&self, painter: &egui::Painter, search_matches: Option<&HashSet<usize>>) {
        let opacity = label_opacity(self.zoom.transform().k, self.style.text_fade_threshold);
        if opacity <= 0.0 {
            return;
        }

        let scratch = &self.view_scratch;
        for &index in &scratch.visible_indices {
            let node = &self.nodes[index];
            if !node.kind.has_label() {
                continue;
            }

            let dimmed = search_matches
                .is_some_and(|matches| !matches.is_empty() && !matches.contains(&index));
            let color = if dimmed {
                Color32::from_gray(150)
            } else {
                Color32::from_gray(232)
            };

            painter.text(
                scratch.screen_positions[index] + vec2(0.0, scratch.screen_radii[index] + 4.0),
                Align2::CENTER_TOP,
                truncate_label(&node.title, LABEL_MAX_CHARS),
                FontId::proportional(12.0),
                with_opacity(color, opacity),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::physics::SimulationPhase;
    use crate::app::zoom::ViewTransform;
    use crate::strategy::{GraphData, GraphSettings, PortfolioSource, visible_graph};
    use eframe::egui::{Context, Event, Modifiers, PointerButton, Pos2, RawInput, pos2};

    fn run_frame(ctx: &Context, canvas: &mut GraphCanvas) -> CanvasResponse {
        run_frame_with(ctx, canvas, Vec::new())
    }

    fn run_frame_with(ctx: &Context, canvas: &mut GraphCanvas, events: Vec<Event>) -> CanvasResponse {
        let input = RawInput {
            screen_rect: Some(Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0))),
            events,
            ..Default::default()
        };
        let mut response = CanvasResponse::default();
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                response = canvas.show(ui, None, None);
            });
        });
        response
    }

    #[test]
    fn labels_fade_between_half_threshold_and_threshold() {
        assert_eq!(label_opacity(1.0, 0.7), 1.0);
        assert_eq!(label_opacity(0.7, 0.7), 1.0);
        assert_eq!(label_opacity(0.35, 0.7), 0.0);
        assert_eq!(label_opacity(0.1, 0.7), 0.0);
        let middle = label_opacity(0.525, 0.7);
        assert!((middle - 0.5).abs() < 1e-4);
    }

    #[test]
    fn empty_canvas_reports_nothing_and_stays_idle() {
        let ctx = Context::default();
        let settings = GraphSettings::default();
        let mut canvas = GraphCanvas::new(&settings);
        canvas.load(&GraphData::default(), &settings);

        let response = run_frame(&ctx, &mut canvas);
        assert_eq!(response, CanvasResponse::default());
        assert_eq!(canvas.phase(), SimulationPhase::Idle);
    }

    #[test]
    fn frames_tick_the_layout_and_track_the_viewport() {
        let ctx = Context::default();
        let settings = GraphSettings::default();
        let portfolio = PortfolioSource::Sample { scale: 1 }.load().unwrap();
        let mut canvas = GraphCanvas::new(&settings);
        canvas.load(&visible_graph(&portfolio, &settings), &settings);

        run_frame(&ctx, &mut canvas);
        assert!(canvas.alpha() < 1.0);
        assert!(canvas.viewport.is_some());
        assert_eq!(canvas.view_scratch.screen_positions.len(), canvas.nodes.len());
    }

    #[test]
    fn resize_keeps_positions() {
        let settings = GraphSettings::default();
        let portfolio = PortfolioSource::Sample { scale: 1 }.load().unwrap();
        let mut canvas = GraphCanvas::new(&settings);
        canvas.load(&visible_graph(&portfolio, &settings), &settings);

        canvas.track_viewport(vec2(800.0, 600.0));
        let before = canvas.simulation.positions().to_vec();
        canvas.track_viewport(vec2(1200.0, 900.0));
        assert_eq!(canvas.simulation.positions(), before.as_slice());
        assert_eq!(canvas.viewport, Some(vec2(1200.0, 900.0)));
    }

    fn button(pos: Pos2, button: PointerButton, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button,
            pressed,
            modifiers: Modifiers::NONE,
        }
    }

    /// A laid-out sample graph whose positions no longer move, so screen
    /// positions from one frame are valid for the next.
    fn frozen_canvas(ctx: &Context) -> GraphCanvas {
        let settings = GraphSettings::default();
        let portfolio = PortfolioSource::Sample { scale: 1 }.load().unwrap();
        let mut canvas = GraphCanvas::new(&settings);
        canvas.load(&visible_graph(&portfolio, &settings), &settings);
        run_frame(ctx, &mut canvas);
        canvas.dispose();
        run_frame(ctx, &mut canvas);
        canvas
    }

    /// A point inside the canvas far from every node.
    fn background_point(canvas: &GraphCanvas) -> Pos2 {
        let point = pos2(40.0, 40.0);
        assert!(
            canvas
                .view_scratch
                .screen_positions
                .iter()
                .all(|position| position.distance(point) > 40.0)
        );
        point
    }

    fn drag(
        ctx: &Context,
        canvas: &mut GraphCanvas,
        from: Pos2,
        with: PointerButton,
    ) -> Vec<CanvasResponse> {
        let mut responses = vec![
            run_frame_with(ctx, canvas, vec![Event::PointerMoved(from)]),
            run_frame_with(ctx, canvas, vec![button(from, with, true)]),
        ];
        for step in 1..=4 {
            let to = from + vec2(30.0 * step as f32, 0.0);
            responses.push(run_frame_with(ctx, canvas, vec![Event::PointerMoved(to)]));
        }
        let end = from + vec2(120.0, 0.0);
        responses.push(run_frame_with(ctx, canvas, vec![button(end, with, false)]));
        responses.push(run_frame(ctx, canvas));
        responses
    }

    #[test]
    fn node_click_reports_the_node_and_not_the_background() {
        let ctx = Context::default();
        let mut canvas = frozen_canvas(&ctx);
        let target = canvas.view_scratch.screen_positions[0];

        run_frame_with(&ctx, &mut canvas, vec![Event::PointerMoved(target)]);
        let hovered = canvas.hovered.expect("pointer rests on a node");
        run_frame_with(&ctx, &mut canvas, vec![button(target, PointerButton::Primary, true)]);
        let response =
            run_frame_with(&ctx, &mut canvas, vec![button(target, PointerButton::Primary, false)]);

        assert_eq!(response.clicked.as_deref(), Some(canvas.nodes[hovered].id.as_str()));
        assert!(!response.background_clicked);
        assert_eq!(canvas.zoom.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn background_click_clears_without_reporting_a_node() {
        let ctx = Context::default();
        let mut canvas = frozen_canvas(&ctx);
        let point = background_point(&canvas);

        run_frame_with(&ctx, &mut canvas, vec![Event::PointerMoved(point)]);
        run_frame_with(&ctx, &mut canvas, vec![button(point, PointerButton::Primary, true)]);
        let response =
            run_frame_with(&ctx, &mut canvas, vec![button(point, PointerButton::Primary, false)]);

        assert!(response.background_clicked);
        assert_eq!(response.clicked, None);
    }

    #[test]
    fn primary_background_drag_pans_the_view() {
        let ctx = Context::default();
        let mut canvas = frozen_canvas(&ctx);
        let point = background_point(&canvas);

        let responses = drag(&ctx, &mut canvas, point, PointerButton::Primary);

        let transform = canvas.zoom.transform();
        assert!(transform.x > 60.0, "pan was {}", transform.x);
        assert!(transform.y.abs() < 1.0);
        assert!(responses.iter().all(|response| response.clicked.is_none()));
    }

    #[test]
    fn secondary_drag_never_pans() {
        let ctx = Context::default();
        let mut canvas = frozen_canvas(&ctx);
        let point = background_point(&canvas);

        drag(&ctx, &mut canvas, point, PointerButton::Secondary);

        assert_eq!(canvas.zoom.transform(), ViewTransform::IDENTITY);
    }

    #[test]
    fn drag_starting_on_a_node_does_not_pan() {
        let ctx = Context::default();
        let mut canvas = frozen_canvas(&ctx);
        let target = canvas.view_scratch.screen_positions[0];

        let responses = drag(&ctx, &mut canvas, target, PointerButton::Primary);

        assert_eq!(canvas.zoom.transform(), ViewTransform::IDENTITY);
        assert!(responses.iter().all(|response| !response.background_clicked));
    }
}
