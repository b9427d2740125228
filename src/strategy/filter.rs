use std::collections::HashSet;

use super::graph::GraphData;
use super::settings::GraphSettings;

/// Drops nodes whose kind is switched off, and every link that loses an
/// endpoint as a result.
pub fn filter_data(graph: &GraphData, settings: &GraphSettings) -> GraphData {
    let nodes = graph
        .nodes
        .iter()
        .filter(|node| settings.shows(node.kind))
        .cloned()
        .collect::<Vec<_>>();

    let kept = nodes
        .iter()
        .map(|node| node.id.as_str())
        .collect::<HashSet<_>>();

    let links = graph
        .links
        .iter()
        .filter(|link| match (link.source_id(), link.target_id()) {
            (Some(source), Some(target)) => kept.contains(source) && kept.contains(target),
            _ => false,
        })
        .cloned()
        .collect();

    GraphData { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::graph::{GraphLink, NodeKind};
    use crate::strategy::process::process_data;
    use crate::strategy::process::property_tests::portfolio_strategy;
    use crate::strategy::sample::sample_portfolio;
    use proptest::prelude::*;

    #[test]
    fn links_to_nodes_missing_from_input_are_dropped() {
        let portfolio = sample_portfolio(3);
        let mut data = process_data(
            &portfolio.initiatives,
            &portfolio.operations,
            &portfolio.milestones,
            &portfolio.tasks,
            &GraphSettings::default(),
        );
        data.links.push(GraphLink::new("initiative:ini-0", "task:does-not-exist"));

        let visible = filter_data(&data, &GraphSettings::default());
        assert_eq!(visible.nodes.len(), data.nodes.len());
        assert_eq!(visible.links.len(), data.links.len() - 1);
    }

    fn settings_strategy() -> impl Strategy<Value = GraphSettings> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(show_initiatives, show_operations, show_milestones, show_tasks)| GraphSettings {
                show_initiatives,
                show_operations,
                show_milestones,
                show_tasks,
                ..GraphSettings::default()
            },
        )
    }

    fn links_outside(visible: &GraphData) -> usize {
        let ids = visible
            .nodes
            .iter()
            .map(|node| node.id.as_str())
            .collect::<HashSet<_>>();
        visible
            .links
            .iter()
            .filter(|link| match (link.source_id(), link.target_id()) {
                (Some(source), Some(target)) => !ids.contains(source) || !ids.contains(target),
                _ => true,
            })
            .count()
    }

    proptest! {
        #[test]
        fn prop_filter_keeps_referential_integrity(
            scale in 0usize..6,
            settings in settings_strategy()
        ) {
            let portfolio = sample_portfolio(scale);
            let data = process_data(
                &portfolio.initiatives,
                &portfolio.operations,
                &portfolio.milestones,
                &portfolio.tasks,
                &settings,
            );
            let visible = filter_data(&data, &settings);

            let input_ids = data.nodes.iter().map(|node| node.id.as_str()).collect::<HashSet<_>>();
            let output_ids = visible.nodes.iter().map(|node| node.id.as_str()).collect::<HashSet<_>>();
            prop_assert!(output_ids.is_subset(&input_ids));
            prop_assert_eq!(links_outside(&visible), 0);

            for kind in NodeKind::ALL {
                if !settings.shows(kind) {
                    prop_assert_eq!(visible.count_of(kind), 0);
                }
            }
        }

        #[test]
        fn prop_filter_keeps_integrity_for_arbitrary_records(
            (initiatives, operations, milestones, tasks) in portfolio_strategy(),
            settings in settings_strategy()
        ) {
            let data = process_data(&initiatives, &operations, &milestones, &tasks, &settings);
            let visible = filter_data(&data, &settings);

            prop_assert_eq!(links_outside(&visible), 0);
            for kind in NodeKind::ALL {
                let expected = if settings.shows(kind) { data.count_of(kind) } else { 0 };
                prop_assert_eq!(visible.count_of(kind), expected);
            }
        }

        #[test]
        fn prop_hidden_tasks_leave_no_task_links(scale in 1usize..6) {
            let portfolio = sample_portfolio(scale);
            let settings = GraphSettings {
                show_tasks: false,
                ..GraphSettings::default()
            };
            let data = process_data(
                &portfolio.initiatives,
                &portfolio.operations,
                &portfolio.milestones,
                &portfolio.tasks,
                &settings,
            );
            let visible = filter_data(&data, &settings);

            prop_assert_eq!(visible.count_of(NodeKind::Task), 0);
            let task_links = visible
                .links
                .iter()
                .filter(|link| {
                    link.source_id().is_some_and(|id| id.starts_with("task:"))
                        || link.target_id().is_some_and(|id| id.starts_with("task:"))
                })
                .count();
            prop_assert_eq!(task_links, 0);
        }
    }
}
