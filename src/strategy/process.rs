use std::collections::{HashMap, HashSet};

use super::graph::{GraphData, GraphLink, GraphNode, NodeKind, clamp_progress, node_color};
use super::records::{Initiative, Milestone, Operation, Task};
use super::settings::GraphSettings;

struct NodeFields<'a> {
    kind: NodeKind,
    record_id: &'a str,
    title: &'a str,
    description: Option<&'a String>,
    status: Option<&'a String>,
    priority: Option<&'a String>,
    progress: Option<f32>,
    due_date: Option<&'a String>,
    assignee: Option<&'a String>,
    parent_id: Option<String>,
}

#[derive(Default)]
struct GraphBuilder {
    data: GraphData,
    node_ids: HashSet<String>,
    link_keys: HashSet<(String, String)>,
}

impl GraphBuilder {
    fn push_node(&mut self, fields: NodeFields<'_>, node_size: f32) -> Option<String> {
        let id = fields.kind.node_id(fields.record_id);
        if !self.node_ids.insert(id.clone()) {
            tracing::warn!(%id, "duplicate record id, keeping the first record");
            return None;
        }

        let status = fields.status.cloned();
        self.data.nodes.push(GraphNode {
            id: id.clone(),
            kind: fields.kind,
            title: fields.title.to_owned(),
            description: fields.description.cloned(),
            color: node_color(fields.kind, status.as_deref()),
            status,
            priority: fields.priority.cloned(),
            progress: clamp_progress(fields.progress),
            due_date: fields.due_date.cloned(),
            assignee: fields.assignee.cloned(),
            parent_id: fields.parent_id,
            size: fields.kind.base_size() * node_size,
        });
        Some(id)
    }

    fn push_link(&mut self, source: &str, target: &str) {
        if self
            .link_keys
            .insert((source.to_owned(), target.to_owned()))
        {
            self.data.links.push(GraphLink::new(source, target));
        }
    }
}

fn milestone_fields<'a>(milestone: &'a Milestone, parent_id: Option<String>) -> NodeFields<'a> {
    NodeFields {
        kind: NodeKind::Milestone,
        record_id: &milestone.id,
        title: &milestone.title,
        description: milestone.description.as_ref(),
        status: milestone.status.as_ref(),
        priority: None,
        progress: milestone.progress,
        due_date: milestone.due_date.as_ref(),
        assignee: None,
        parent_id,
    }
}

/// Builds the relationship graph for the four record collections.
///
/// Nodes come out in a fixed order: each initiative followed by its
/// milestones, then milestones whose initiative is unknown, then operations,
/// then tasks. References to records that do not exist produce no link; the
/// referring record still gets its node.
pub fn process_data(
    initiatives: &[Initiative],
    operations: &[Operation],
    milestones: &[Milestone],
    tasks: &[Task],
    settings: &GraphSettings,
) -> GraphData {
    let node_size = settings.node_size;
    let mut builder = GraphBuilder::default();

    let initiative_ids = initiatives
        .iter()
        .map(|initiative| initiative.id.as_str())
        .collect::<HashSet<_>>();
    let operation_ids = operations
        .iter()
        .map(|operation| operation.id.as_str())
        .collect::<HashSet<_>>();

    let mut milestones_by_initiative = HashMap::<&str, Vec<&Milestone>>::new();
    for milestone in milestones {
        milestones_by_initiative
            .entry(milestone.initiative_id.as_str())
            .or_default()
            .push(milestone);
    }

    for initiative in initiatives {
        let Some(initiative_node) = builder.push_node(
            NodeFields {
                kind: NodeKind::Initiative,
                record_id: &initiative.id,
                title: &initiative.title,
                description: initiative.description.as_ref(),
                status: initiative.status.as_ref(),
                priority: initiative.priority.as_ref(),
                progress: initiative.progress,
                due_date: initiative.due_date.as_ref(),
                assignee: initiative.assignee.as_ref(),
                parent_id: None,
            },
            node_size,
        ) else {
            continue;
        };

        let own_milestones = milestones_by_initiative
            .get(initiative.id.as_str())
            .map(Vec::as_slice)
            .unwrap_or_default();
        for milestone in own_milestones {
            let fields = milestone_fields(milestone, Some(initiative_node.clone()));
            if let Some(milestone_node) = builder.push_node(fields, node_size) {
                builder.push_link(&initiative_node, &milestone_node);
            }
        }
    }

    for milestone in milestones
        .iter()
        .filter(|milestone| !initiative_ids.contains(milestone.initiative_id.as_str()))
    {
        builder.push_node(milestone_fields(milestone, None), node_size);
    }

    for operation in operations {
        let Some(operation_node) = builder.push_node(
            NodeFields {
                kind: NodeKind::Operation,
                record_id: &operation.id,
                title: &operation.title,
                description: operation.description.as_ref(),
                status: operation.status.as_ref(),
                priority: operation.priority.as_ref(),
                progress: operation.progress,
                due_date: operation.due_date.as_ref(),
                assignee: operation.assignee.as_ref(),
                parent_id: None,
            },
            node_size,
        ) else {
            continue;
        };

        for initiative_id in &operation.initiative_ids {
            if initiative_ids.contains(initiative_id.as_str()) {
                builder.push_link(&NodeKind::Initiative.node_id(initiative_id), &operation_node);
            }
        }
    }

    for task in tasks {
        let strategic_item = task.strategic_item_id.as_deref().and_then(|item_id| {
            if initiative_ids.contains(item_id) {
                Some(NodeKind::Initiative.node_id(item_id))
            } else if operation_ids.contains(item_id) {
                Some(NodeKind::Operation.node_id(item_id))
            } else {
                None
            }
        });

        let Some(task_node) = builder.push_node(
            NodeFields {
                kind: NodeKind::Task,
                record_id: &task.id,
                title: &task.title,
                description: task.description.as_ref(),
                status: task.status.as_ref(),
                priority: task.priority.as_ref(),
                progress: task.progress,
                due_date: task.due_date.as_ref(),
                assignee: task.assignee.as_ref(),
                parent_id: strategic_item.clone(),
            },
            node_size,
        ) else {
            continue;
        };

        if let Some(item_node) = strategic_item {
            builder.push_link(&item_node, &task_node);
        }
    }

    builder.data
}
