use std::collections::HashMap;

use eframe::egui::Color32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Initiative,
    Operation,
    Milestone,
    Task,
}

impl NodeKind {
    pub const ALL: [NodeKind; 4] = [
        NodeKind::Initiative,
        NodeKind::Operation,
        NodeKind::Milestone,
        NodeKind::Task,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Initiative => "Initiative",
            Self::Operation => "Operation",
            Self::Milestone => "Milestone",
            Self::Task => "Task",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            Self::Initiative => "initiative",
            Self::Operation => "operation",
            Self::Milestone => "milestone",
            Self::Task => "task",
        }
    }

    /// Graph id for a record of this kind. Prefixed so ids from different
    /// collections never collide.
    pub fn node_id(self, record_id: &str) -> String {
        format!("{}:{record_id}", self.prefix())
    }

    pub fn base_size(self) -> f32 {
        match self {
            Self::Initiative => 14.0,
            Self::Operation => 11.0,
            Self::Milestone => 8.0,
            Self::Task => 6.0,
        }
    }

    /// Only these kinds get text labels on the canvas.
    pub fn has_label(self) -> bool {
        matches!(self, Self::Initiative | Self::Operation)
    }

    pub fn color(self) -> Color32 {
        match self {
            Self::Initiative => Color32::from_rgb(99, 132, 245),
            Self::Operation => Color32::from_rgb(168, 104, 232),
            Self::Milestone => Color32::from_rgb(240, 178, 72),
            Self::Task => Color32::from_rgb(92, 190, 178),
        }
    }
}

pub fn node_color(kind: NodeKind, status: Option<&str>) -> Color32 {
    let Some(status) = status else {
        return kind.color();
    };

    match status.trim().to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
        "completed" | "complete" | "done" => Color32::from_rgb(88, 196, 112),
        "at-risk" | "delayed" | "overdue" => Color32::from_rgb(238, 140, 70),
        "blocked" | "cancelled" | "canceled" => Color32::from_rgb(226, 84, 84),
        _ => kind.color(),
    }
}

pub fn clamp_progress(progress: Option<f32>) -> Option<f32> {
    progress
        .filter(|value| value.is_finite())
        .map(|value| value.clamp(0.0, 100.0))
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub progress: Option<f32>,
    pub due_date: Option<String>,
    pub assignee: Option<String>,
    pub parent_id: Option<String>,
    pub color: Color32,
    pub size: f32,
}

/// One end of a link: a node id until a simulation resolves it to the index
/// of its body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkEnd {
    Unresolved(String),
    Resolved(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GraphLink {
    pub source: LinkEnd,
    pub target: LinkEnd,
}

impl GraphLink {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: LinkEnd::Unresolved(source.into()),
            target: LinkEnd::Unresolved(target.into()),
        }
    }

    pub fn source_id(&self) -> Option<&str> {
        match &self.source {
            LinkEnd::Unresolved(id) => Some(id),
            LinkEnd::Resolved(_) => None,
        }
    }

    pub fn target_id(&self) -> Option<&str> {
        match &self.target {
            LinkEnd::Unresolved(id) => Some(id),
            LinkEnd::Resolved(_) => None,
        }
    }

    /// Replaces id endpoints with body indices. Returns false, leaving the
    /// link untouched, when either id is unknown.
    pub fn resolve(&mut self, index_by_id: &HashMap<String, usize>) -> bool {
        let lookup = |end: &LinkEnd| match end {
            LinkEnd::Unresolved(id) => index_by_id.get(id).copied(),
            LinkEnd::Resolved(index) => Some(*index),
        };

        let (Some(source), Some(target)) = (lookup(&self.source), lookup(&self.target)) else {
            return false;
        };

        self.source = LinkEnd::Resolved(source);
        self.target = LinkEnd::Resolved(target);
        true
    }

    pub fn endpoints(&self) -> Option<(usize, usize)> {
        match (&self.source, &self.target) {
            (LinkEnd::Resolved(source), LinkEnd::Resolved(target)) => Some((*source, *target)),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
}

impl GraphData {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn count_of(&self, kind: NodeKind) -> usize {
        self.nodes.iter().filter(|node| node.kind == kind).count()
    }

    /// Ids of nodes directly linked to `node_id`, in link order.
    pub fn neighbors(&self, node_id: &str) -> Vec<&str> {
        self.links
            .iter()
            .filter_map(|link| {
                let (source, target) = (link.source_id()?, link.target_id()?);
                if source == node_id {
                    Some(target)
                } else if target == node_id {
                    Some(source)
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_is_one_way_and_rejects_unknown_ids() {
        let index_by_id = HashMap::from([("a".to_owned(), 0), ("b".to_owned(), 1)]);

        let mut link = GraphLink::new("a", "b");
        assert!(link.resolve(&index_by_id));
        assert_eq!(link.endpoints(), Some((0, 1)));
        assert_eq!(link.source_id(), None);

        // Already resolved ends stay as they are.
        assert!(link.resolve(&HashMap::new()));
        assert_eq!(link.endpoints(), Some((0, 1)));

        let mut dangling = GraphLink::new("a", "missing");
        assert!(!dangling.resolve(&index_by_id));
        assert_eq!(dangling, GraphLink::new("a", "missing"));
    }

    #[test]
    fn status_overrides_kind_color() {
        assert_eq!(node_color(NodeKind::Task, None), NodeKind::Task.color());
        assert_eq!(
            node_color(NodeKind::Task, Some("In Progress")),
            NodeKind::Task.color()
        );
        assert_eq!(
            node_color(NodeKind::Initiative, Some("At Risk")),
            node_color(NodeKind::Operation, Some("at_risk"))
        );
        assert_ne!(
            node_color(NodeKind::Milestone, Some("completed")),
            NodeKind::Milestone.color()
        );
    }

    #[test]
    fn progress_is_clamped() {
        assert_eq!(clamp_progress(Some(140.0)), Some(100.0));
        assert_eq!(clamp_progress(Some(-3.0)), Some(0.0));
        assert_eq!(clamp_progress(Some(f32::NAN)), None);
        assert_eq!(clamp_progress(None), None);
    }
}
