use eframe::egui::{self, Align, Context, Layout};

use crate::strategy::{Portfolio, SettingsStore, visible_graph};

use super::super::{GraphCanvas, ViewModel};

impl ViewModel {
    pub(in crate::app) fn new(portfolio: Portfolio, settings_store: SettingsStore) -> Self {
        let settings = settings_store.load();
        let canvas = GraphCanvas::new(&settings);

        Self {
            portfolio,
            settings,
            settings_store,
            graph: Default::default(),
            canvas,
            search: String::new(),
            selected: None,
            hovered: None,
            graph_dirty: true,
            graph_revision: 0,
            search_match_cache: None,
        }
    }

    /// Rebuilds the graph from the records and hands it to the canvas, which
    /// restarts its layout.
    pub(in crate::app) fn rebuild_graph(&mut self) {
        self.graph = visible_graph(&self.portfolio, &self.settings);
        self.graph_revision = self.graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.canvas.load(&self.graph, &self.settings);

        if let Some(selected) = &self.selected
            && self.graph.node(selected).is_none()
        {
            self.selected = None;
        }
        self.hovered = None;
        self.graph_dirty = false;

        tracing::debug!(
            revision = self.graph_revision,
            nodes = self.graph.nodes.len(),
            links = self.graph.links.len(),
            "graph rebuilt"
        );
    }

    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        source: &str,
        reload_requested: &mut bool,
        is_loading: bool,
    ) {
        if self.graph_dirty {
            self.rebuild_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("strategic-graph");
                    ui.separator();
                    ui.label(format!("source: {source}"));
                    ui.label(format!("records: {}", self.portfolio.record_count()));
                    let reload_button =
                        ui.add_enabled(!is_loading, egui::Button::new("Reload portfolio"));
                    if reload_button.clicked() {
                        *reload_requested = true;
                    }
                    ui.separator();
                    if ui.button("−").on_hover_text("Zoom out").clicked() {
                        self.canvas.zoom_out();
                    }
                    if ui.button("+").on_hover_text("Zoom in").clicked() {
                        self.canvas.zoom_in();
                    }
                    if ui
                        .button("Reset view")
                        .on_hover_text("Reset pan and zoom and re-run the layout.")
                        .clicked()
                    {
                        self.canvas.reset_view();
                    }
                    ui.label(format!("zoom {:.0}%", self.canvas.scale() * 100.0));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!(
                            "layout: {} (alpha {:.3})",
                            self.canvas.phase().label(),
                            self.canvas.alpha()
                        ));
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(300.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            if is_loading {
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.heading("Reloading portfolio...");
                    ui.add_space(8.0);
                    ui.spinner();
                });
                return;
            }

            if self.graph_dirty {
                self.rebuild_graph();
            }
            let matches = self.cached_search_matches();
            let response = self
                .canvas
                .show(ui, self.selected.as_deref(), matches.as_deref());

            if response.hover_changed {
                self.hovered = response.hovered;
            }
            if let Some(clicked) = response.clicked {
                self.set_selected(Some(clicked));
            } else if response.background_clicked {
                self.set_selected(None);
            }
        });
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }
        tracing::debug!(selected = ?selected, "selection changed");
        self.selected = selected;
    }
}
