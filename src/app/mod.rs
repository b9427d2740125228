use std::collections::HashSet;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};

use crate::strategy::{
    GraphData, GraphNode, GraphSettings, Portfolio, PortfolioSource, SettingsStore,
};

mod graph;
mod physics;
mod render_utils;
mod search;
mod ui;
mod zoom;

use physics::Simulation;
use zoom::ZoomController;

pub struct StrategicGraphApp {
    source: PortfolioSource,
    settings_store: SettingsStore,
    state: AppState,
    reload_rx: Option<Receiver<Result<Portfolio, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Portfolio, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

struct ViewModel {
    portfolio: Portfolio,
    settings: GraphSettings,
    settings_store: SettingsStore,
    graph: GraphData,
    canvas: GraphCanvas,
    search: String,
    selected: Option<String>,
    hovered: Option<String>,
    graph_dirty: bool,
    graph_revision: u64,
    search_match_cache: Option<SearchMatchCache>,
}

struct SearchMatchCache {
    query: String,
    graph_revision: u64,
    matches: Arc<HashSet<usize>>,
    ranked: Vec<usize>,
}

/// Renderer component: owns the simulation for the current graph snapshot
/// and the pan/zoom transform. Selection stays with the host.
struct GraphCanvas {
    nodes: Vec<GraphNode>,
    simulation: Simulation,
    zoom: ZoomController,
    viewport: Option<Vec2>,
    style: CanvasStyle,
    pan_allowed: bool,
    hovered: Option<usize>,
    view_scratch: ViewScratch,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CanvasStyle {
    text_fade_threshold: f32,
    line_thickness: f32,
}

struct ViewScratch {
    screen_positions: Vec<Pos2>,
    screen_radii: Vec<f32>,
    visible_indices: Vec<usize>,
}

/// What happened on the canvas this frame.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct CanvasResponse {
    clicked: Option<String>,
    hovered: Option<String>,
    hover_changed: bool,
    background_clicked: bool,
}

impl StrategicGraphApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: PortfolioSource,
        settings_store: SettingsStore,
    ) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            settings_store,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: PortfolioSource) -> Receiver<Result<Portfolio, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = source.load().map_err(|error| {
                tracing::warn!(error = %format!("{error:#}"), "portfolio load failed");
                format!("{error:#}")
            });
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: PortfolioSource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }

    fn finish_load(result: Result<Portfolio, String>, settings_store: &SettingsStore) -> AppState {
        match result {
            Ok(portfolio) => {
                AppState::Ready(Box::new(ViewModel::new(portfolio, settings_store.clone())))
            }
            Err(error) => AppState::Error(error),
        }
    }
}

impl eframe::App for StrategicGraphApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(result) => {
                        transition = Some(Self::finish_load(result, &self.settings_store));
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error(
                            "Background load worker disconnected".to_owned(),
                        ));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading portfolio...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load portfolio");
                    ui.add_space(6.0);
                    ui.label(format!("source: {}", self.source.describe()));
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    &self.source.describe(),
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        Ok(result) => {
                            transition = Some(Self::finish_load(result, &self.settings_store));
                        }
                        Err(TryRecvError::Empty) => {
                            ctx.request_repaint();
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            transition = Some(AppState::Error(
                                "Background load worker disconnected".to_owned(),
                            ));
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
