mod filter;
mod graph;
mod load;
mod process;
mod prune;
mod records;
mod sample;
mod settings;

pub use filter::filter_data;
pub use graph::{GraphData, GraphLink, GraphNode, NodeKind};
pub use load::PortfolioSource;
pub use process::process_data;
pub use prune::prune_links;
pub use records::Portfolio;
pub use settings::{GraphSettings, SettingsStore};

/// Processed and filtered graph for a portfolio under the given settings.
pub fn visible_graph(portfolio: &Portfolio, settings: &GraphSettings) -> GraphData {
    let data = process_data(
        &portfolio.initiatives,
        &portfolio.operations,
        &portfolio.milestones,
        &portfolio.tasks,
        settings,
    );
    filter_data(&data, settings)
}
