use std::ops::RangeInclusive;

use eframe::egui::{self, Response, RichText, Ui};

use crate::strategy::{GraphSettings, NodeKind};

use super::super::ViewModel;

/// Slider edits take effect when the drag ends or on a keyboard/typed change,
/// not on every intermediate value.
fn committed(response: &Response) -> bool {
    response.drag_stopped() || (response.changed() && !response.dragged())
}

fn setting_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    label: &str,
    hint: &str,
) -> Response {
    ui.add(egui::Slider::new(value, range).text(label))
        .on_hover_text(hint)
}

impl ViewModel {
    fn persist_settings(&self) {
        if let Err(error) = self.settings_store.save(&self.settings) {
            tracing::warn!("{error:#}");
        }
    }

    fn restore_default_settings(&mut self) {
        self.settings = GraphSettings::default();
        self.canvas.set_style(&self.settings);
        self.graph_dirty = true;
        self.persist_settings();
    }

    fn kind_toggle_label(&self, kind: NodeKind) -> String {
        format!("{}s ({})", kind.label(), self.portfolio.count_of(kind))
    }

    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        self.draw_search(ui);
        ui.separator();

        let mut rebuild = false;
        let mut save = false;

        ui.label(RichText::new("Record types").strong());
        for kind in NodeKind::ALL {
            let label = self.kind_toggle_label(kind);
            if ui.checkbox(self.settings.show_mut(kind), label).changed() {
                rebuild = true;
                save = true;
            }
        }

        ui.separator();
        ui.label(RichText::new("Display").strong());

        let fade = setting_slider(
            ui,
            &mut self.settings.text_fade_threshold,
            GraphSettings::TEXT_FADE_RANGE,
            "label fade zoom",
            "Labels fade out below this zoom level and vanish at half of it.",
        );
        let line = setting_slider(
            ui,
            &mut self.settings.line_thickness,
            GraphSettings::LINE_THICKNESS_RANGE,
            "line thickness",
            "Link stroke width in pixels.",
        );
        if fade.changed() || line.changed() {
            self.canvas.set_style(&self.settings);
        }
        save |= committed(&fade) || committed(&line);

        let node_size = setting_slider(
            ui,
            &mut self.settings.node_size,
            GraphSettings::NODE_SIZE_RANGE,
            "node size",
            "Multiplier on the per-type node size.",
        );
        rebuild |= committed(&node_size);

        ui.separator();
        ui.label(RichText::new("Forces").strong());

        let force_sliders = [
            setting_slider(
                ui,
                &mut self.settings.center_force,
                GraphSettings::CENTER_FORCE_RANGE,
                "center",
                "Pull toward the middle of the canvas.",
            ),
            setting_slider(
                ui,
                &mut self.settings.repel_force,
                GraphSettings::REPEL_FORCE_RANGE,
                "repel",
                "Many-body repulsion between all nodes.",
            ),
            setting_slider(
                ui,
                &mut self.settings.link_force,
                GraphSettings::LINK_FORCE_RANGE,
                "link",
                "Spring strength of links.",
            ),
            setting_slider(
                ui,
                &mut self.settings.link_distance,
                GraphSettings::LINK_DISTANCE_RANGE,
                "link distance",
                "Resting length of links.",
            ),
        ];
        rebuild |= force_sliders.iter().any(committed);

        ui.add_space(6.0);
        ui.horizontal(|ui| {
            if ui
                .button("Restore defaults")
                .on_hover_text("Reset every graph setting and re-run the layout.")
                .clicked()
            {
                self.restore_default_settings();
            }
            if ui
                .button("Re-run layout")
                .on_hover_text("Rebuild the graph and start the simulation again.")
                .clicked()
            {
                self.graph_dirty = true;
            }
        });

        if rebuild {
            self.graph_dirty = true;
        }
        if rebuild || save {
            self.persist_settings();
        }

        ui.separator();
        ui.label(RichText::new("Graph").strong());
        if self.graph.is_empty() {
            ui.small("No records of the enabled types.");
        }
        ui.label(format!("nodes: {}", self.graph.nodes.len()));
        ui.label(format!("links: {}", self.graph.links.len()));
        let simulated = self.canvas.simulated_link_count();
        if simulated < self.graph.links.len() {
            ui.label(format!("links in layout: {simulated} (pruned for size)"))
                .on_hover_text("Large graphs lay out a reduced link set.");
        }
        ui.small(format!(
            "settings file: {}",
            self.settings_store.path().display()
        ));
    }

    fn draw_search(&mut self, ui: &mut Ui) {
        ui.label("Search (node title)")
            .on_hover_text("Fuzzy-highlight matching nodes without changing the graph.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Type to highlight matching nodes, then click one to select it.");

        let (listed, total) = self.listed_search_matches();
        if self.search.trim().is_empty() {
            return;
        }
        if total == 0 {
            ui.small("No matches.");
            return;
        }

        ui.small(format!("{total} matches"));
        for index in listed {
            let Some(node) = self.graph.nodes.get(index) else {
                continue;
            };
            let label = format!("{}  ({})", node.title, node.kind.label());
            let id = node.id.clone();
            if ui.link(label).clicked() {
                self.set_selected(Some(id));
            }
        }
    }
}
