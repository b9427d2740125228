use std::collections::HashSet;
use std::sync::Arc;

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::strategy::GraphNode;

use super::{SearchMatchCache, ViewModel};

/// Shown in the controls panel under the search box.
const MAX_LISTED_MATCHES: usize = 12;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

/// Indices of nodes whose title matches `query`, best match first.
fn ranked_matches(nodes: &[GraphNode], query: &str) -> Vec<usize> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default();
    let mut scored = nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            fuzzy_match_score(&matcher, &node.title, query).map(|score| (score, index))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, index)| index).collect()
}

impl ViewModel {
    fn refresh_search_cache(&mut self) -> Option<&SearchMatchCache> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let stale = self.search_match_cache.as_ref().is_none_or(|cached| {
            cached.graph_revision != self.graph_revision || cached.query != query
        });
        if stale {
            let ranked = ranked_matches(&self.graph.nodes, query);
            self.search_match_cache = Some(SearchMatchCache {
                query: query.to_owned(),
                graph_revision: self.graph_revision,
                matches: Arc::new(ranked.iter().copied().collect()),
                ranked,
            });
        }
        self.search_match_cache.as_ref()
    }

    /// Search matches for the current graph revision, recomputed only when
    /// the query or the graph changes.
    pub(super) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        self.refresh_search_cache()
            .map(|cached| Arc::clone(&cached.matches))
    }

    /// Best matches first, at most [`MAX_LISTED_MATCHES`].
    pub(super) fn listed_search_matches(&mut self) -> (Vec<usize>, usize) {
        self.refresh_search_cache().map_or((Vec::new(), 0), |cached| {
            let listed = cached.ranked.iter().take(MAX_LISTED_MATCHES).copied().collect();
            (listed, cached.ranked.len())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{GraphSettings, PortfolioSource, SettingsStore, visible_graph};

    fn nodes() -> Vec<GraphNode> {
        let portfolio = PortfolioSource::Sample { scale: 1 }.load().unwrap();
        visible_graph(&portfolio, &GraphSettings::default()).nodes
    }

    #[test]
    fn blank_query_matches_nothing() {
        let nodes = nodes();
        assert!(ranked_matches(&nodes, "").is_empty());
        assert!(ranked_matches(&nodes, "   ").is_empty());
    }

    #[test]
    fn matching_ignores_case() {
        let nodes = nodes();
        let title = nodes[0].title.clone();

        let exact = ranked_matches(&nodes, &title);
        assert!(exact.contains(&0));
        let shouted = ranked_matches(&nodes, &title.to_uppercase());
        assert!(shouted.contains(&0));
    }

    #[test]
    fn unrelated_query_matches_nothing() {
        let nodes = nodes();
        assert!(ranked_matches(&nodes, "zzzzqqqq").is_empty());
    }

    #[test]
    fn cache_follows_query_and_graph_revision() {
        let dir = tempfile::tempdir().unwrap();
        let portfolio = PortfolioSource::Sample { scale: 2 }.load().unwrap();
        let store = SettingsStore::new(dir.path().join("settings.json"));
        let mut model = ViewModel::new(portfolio, store);
        model.rebuild_graph();
        assert!(model.cached_search_matches().is_none());

        model.search = "Operation".to_owned();
        let first = model.cached_search_matches().unwrap();
        let again = model.cached_search_matches().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        assert!(!first.is_empty());

        model.rebuild_graph();
        let rebuilt = model.cached_search_matches().unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(*first, *rebuilt);

        let (listed, total) = model.listed_search_matches();
        assert_eq!(total, first.len());
        assert!(listed.len() <= MAX_LISTED_MATCHES);
    }
}
