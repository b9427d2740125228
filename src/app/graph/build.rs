use eframe::egui::{Vec2, vec2};

use crate::strategy::{GraphData, GraphSettings, prune_links};

use super::super::physics::{ForceConfig, Simulation, SimulationPhase};
use super::super::zoom::ZoomController;
use super::super::{CanvasStyle, GraphCanvas, ViewScratch};

/// Centering target used until the first frame reports the real size.
const DEFAULT_VIEWPORT: Vec2 = vec2(960.0, 720.0);

impl CanvasStyle {
    pub(in crate::app) fn from_settings(settings: &GraphSettings) -> Self {
        Self {
            text_fade_threshold: settings.text_fade_threshold,
            line_thickness: settings.line_thickness,
        }
    }
}

impl GraphCanvas {
    pub(in crate::app) fn new(settings: &GraphSettings) -> Self {
        Self {
            nodes: Vec::new(),
            simulation: Simulation::new(
                ForceConfig::from_settings(settings),
                DEFAULT_VIEWPORT * 0.5,
            ),
            zoom: ZoomController::default(),
            viewport: None,
            style: CanvasStyle::from_settings(settings),
            pan_allowed: false,
            hovered: None,
            view_scratch: ViewScratch {
                screen_positions: Vec::new(),
                screen_radii: Vec::new(),
                visible_indices: Vec::new(),
            },
        }
    }

    /// Takes a new graph snapshot: the running simulation is disposed and a
    /// fresh one starts on the (possibly pruned) link set. The pan/zoom
    /// transform is kept.
    pub(in crate::app) fn load(&mut self, graph: &GraphData, settings: &GraphSettings) {
        let center = self.viewport.unwrap_or(DEFAULT_VIEWPORT) * 0.5;
        let mut simulation = Simulation::new(ForceConfig::from_settings(settings), center);
        simulation.load(&graph.nodes, prune_links(&graph.nodes, &graph.links));

        let mut previous = std::mem::replace(&mut self.simulation, simulation);
        previous.dispose();

        self.nodes = graph.nodes.clone();
        self.style = CanvasStyle::from_settings(settings);
        self.hovered = None;
        self.pan_allowed = false;
    }

    pub(in crate::app) fn set_style(&mut self, settings: &GraphSettings) {
        self.style = CanvasStyle::from_settings(settings);
    }

    pub(in crate::app) fn phase(&self) -> SimulationPhase {
        self.simulation.phase()
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.simulation.alpha()
    }

    pub(in crate::app) fn simulated_link_count(&self) -> usize {
        self.simulation.link_count()
    }

    pub(in crate::app) fn scale(&self) -> f32 {
        self.zoom.transform().k
    }

    pub(in crate::app) fn zoom_in(&mut self) {
        self.zoom.zoom_in(self.viewport.unwrap_or(DEFAULT_VIEWPORT));
    }

    pub(in crate::app) fn zoom_out(&mut self) {
        self.zoom.zoom_out(self.viewport.unwrap_or(DEFAULT_VIEWPORT));
    }

    /// Back to the identity transform, and the layout gets another full run.
    pub(in crate::app) fn reset_view(&mut self) {
        self.zoom.reset();
        self.simulation.reheat();
    }

    pub(in crate::app) fn dispose(&mut self) {
        self.simulation.dispose();
    }
}

impl Drop for GraphCanvas {
    fn drop(&mut self) {
        self.dispose();
    }
}
