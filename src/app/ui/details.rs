use eframe::egui::{self, RichText, Ui};

use crate::strategy::GraphNode;

use super::super::ViewModel;

fn draw_fields(ui: &mut Ui, node: &GraphNode) {
    ui.label(RichText::new(node.title.as_str()).strong());
    ui.small(node.id.as_str());
    ui.add_space(6.0);

    ui.label(format!("Type: {}", node.kind.label()));
    if let Some(status) = &node.status {
        ui.label(format!("Status: {status}"));
    }
    if let Some(priority) = &node.priority {
        ui.label(format!("Priority: {priority}"));
    }
    if let Some(due_date) = &node.due_date {
        ui.label(format!("Due: {due_date}"));
    }
    if let Some(assignee) = &node.assignee {
        ui.label(format!("Assignee: {assignee}"));
    }
    if let Some(progress) = node.progress {
        ui.add(
            egui::ProgressBar::new(progress / 100.0)
                .text(format!("{progress:.0}%"))
                .desired_width(200.0),
        );
    }
    if let Some(description) = &node.description {
        ui.add_space(4.0);
        ui.label(description.as_str());
    }
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Click a node in the graph to see its details.");
            if let Some(node) = self.hovered.as_deref().and_then(|id| self.graph.node(id)) {
                ui.separator();
                ui.label(RichText::new("Under the pointer").weak());
                draw_fields(ui, node);
            }
            return;
        };

        let Some(node) = self.graph.node(&selected_id) else {
            ui.label("Selected node is not part of the current graph.");
            return;
        };
        draw_fields(ui, node);

        if let Some(parent) = node.parent_id.as_deref().and_then(|id| self.graph.node(id)) {
            ui.add_space(4.0);
            ui.label(format!("Belongs to: {}", parent.title));
        }

        ui.separator();
        ui.label(RichText::new("Linked nodes").strong());

        let neighbors = self
            .graph
            .neighbors(&selected_id)
            .into_iter()
            .filter_map(|id| self.graph.node(id))
            .map(|neighbor| {
                (
                    neighbor.id.clone(),
                    format!("{}  ({})", neighbor.title, neighbor.kind.label()),
                )
            })
            .collect::<Vec<_>>();

        if neighbors.is_empty() {
            ui.label("No links to other visible nodes.");
            return;
        }

        let mut next_selection = None;
        egui::ScrollArea::vertical()
            .id_salt("linked_nodes_scroll")
            .max_height(360.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (id, label) in &neighbors {
                    if ui.link(label.as_str()).on_hover_text(id.as_str()).clicked() {
                        next_selection = Some(id.clone());
                    }
                }
            });

        if let Some(id) = next_selection {
            self.set_selected(Some(id));
        }
    }
}
