mod forces;
mod quadtree;

use std::collections::HashMap;

use eframe::egui::{Vec2, vec2};

use crate::strategy::{GraphLink, GraphNode, GraphSettings};
use crate::util::stable_pair;

use forces::{
    LinkConstraint, apply_centering, apply_collisions, apply_links, apply_repulsion,
};
use quadtree::QuadNode;

pub(in crate::app) const ALPHA_MIN: f32 = 0.001;
/// Roughly twice the usual d3 decay, so layouts settle in ~150 ticks.
const ALPHA_DECAY: f32 = 0.0456;
const VELOCITY_DECAY: f32 = 0.4;
/// Repulsion charge at `repel_force == 1.0`.
const BASE_CHARGE: f32 = 30.0;
const MAX_SPEED: f32 = 60.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(in crate::app) enum SimulationPhase {
    Idle,
    Running,
    Settled,
    Disposed,
}

impl SimulationPhase {
    pub(in crate::app) fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Settled => "settled",
            Self::Disposed => "disposed",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) struct ForceConfig {
    pub(in crate::app) center_strength: f32,
    pub(in crate::app) charge: f32,
    pub(in crate::app) link_strength: f32,
    pub(in crate::app) link_distance: f32,
}

impl ForceConfig {
    pub(in crate::app) fn from_settings(settings: &GraphSettings) -> Self {
        Self {
            center_strength: settings.center_force.max(0.0),
            charge: BASE_CHARGE * settings.repel_force.max(0.0),
            link_strength: settings.link_force.max(0.0),
            link_distance: settings.link_distance.max(1.0),
        }
    }
}

/// Force-directed layout over an arena of bodies, one per graph node, in
/// node order. Only [`Simulation::tick`] and [`Simulation::load`] write
/// positions; everything else reads them through [`Simulation::positions`].
pub(in crate::app) struct Simulation {
    positions: Vec<Vec2>,
    velocities: Vec<Vec2>,
    radii: Vec<f32>,
    links: Vec<LinkConstraint>,
    config: ForceConfig,
    center: Vec2,
    alpha: f32,
    phase: SimulationPhase,
    ticks: u64,
}

impl Simulation {
    pub(in crate::app) fn new(config: ForceConfig, center: Vec2) -> Self {
        Self {
            positions: Vec::new(),
            velocities: Vec::new(),
            radii: Vec::new(),
            links: Vec::new(),
            config,
            center,
            alpha: 0.0,
            phase: SimulationPhase::Idle,
            ticks: 0,
        }
    }

    /// Places one body per node and resolves the links against them. Links
    /// whose ends are not among `nodes` are dropped. An empty node set
    /// leaves the simulation idle.
    pub(in crate::app) fn load(&mut self, nodes: &[GraphNode], links: Vec<GraphLink>) {
        if self.phase == SimulationPhase::Disposed {
            return;
        }

        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        self.positions = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| self.center + initial_offset(index, &node.id))
            .collect();
        self.velocities = vec![Vec2::ZERO; nodes.len()];
        self.radii = nodes.iter().map(|node| node.size).collect();

        let mut resolved = Vec::with_capacity(links.len());
        let mut dropped = 0usize;
        for mut link in links {
            match link.resolve(&index_by_id).then(|| link.endpoints()).flatten() {
                Some((source, target)) if source != target => resolved.push((source, target)),
                _ => dropped += 1,
            }
        }
        if dropped > 0 {
            tracing::debug!(dropped, "links without both endpoints left out of the layout");
        }

        let mut degrees = vec![0usize; nodes.len()];
        for &(source, target) in &resolved {
            degrees[source] += 1;
            degrees[target] += 1;
        }
        self.links = resolved
            .into_iter()
            .map(|(source, target)| {
                LinkConstraint::from_degrees(source, target, &degrees, self.config.link_strength)
            })
            .collect();

        self.ticks = 0;
        if nodes.is_empty() {
            self.alpha = 0.0;
            self.phase = SimulationPhase::Idle;
        } else {
            self.alpha = 1.0;
            self.phase = SimulationPhase::Running;
            tracing::debug!(
                nodes = nodes.len(),
                links = self.links.len(),
                "simulation started"
            );
        }
    }

    pub(in crate::app) fn phase(&self) -> SimulationPhase {
        self.phase
    }

    pub(in crate::app) fn alpha(&self) -> f32 {
        self.alpha
    }

    pub(in crate::app) fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub(in crate::app) fn link_endpoints(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.links.iter().map(|link| (link.source, link.target))
    }

    pub(in crate::app) fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Moves the centering target without touching current positions.
    pub(in crate::app) fn set_center(&mut self, center: Vec2) {
        if self.center != center {
            self.center = center;
            if self.phase == SimulationPhase::Settled {
                self.alpha = self.alpha.max(0.3);
                self.phase = SimulationPhase::Running;
            }
        }
    }

    /// Restarts ticking at full temperature.
    pub(in crate::app) fn reheat(&mut self) {
        if matches!(self.phase, SimulationPhase::Running | SimulationPhase::Settled) {
            self.alpha = 1.0;
            self.phase = SimulationPhase::Running;
        }
    }

    /// Stops the simulation for good; later ticks do nothing.
    pub(in crate::app) fn dispose(&mut self) {
        if self.phase != SimulationPhase::Disposed {
            tracing::debug!(ticks = self.ticks, "simulation disposed");
        }
        self.phase = SimulationPhase::Disposed;
        self.alpha = 0.0;
    }

    /// Advances one step. Returns whether the simulation is still running
    /// afterwards.
    pub(in crate::app) fn tick(&mut self) -> bool {
        if self.phase != SimulationPhase::Running {
            return false;
        }

        self.alpha += (0.0 - self.alpha) * ALPHA_DECAY;
        self.ticks += 1;

        let alpha = self.alpha;
        let config = self.config;

        apply_links(
            &self.links,
            config.link_distance,
            alpha,
            &self.positions,
            &mut self.velocities,
        );

        if let Some(tree) = QuadNode::build(&self.positions, &self.radii) {
            let charge = config.charge * alpha;
            if charge > 0.0 {
                for (index, velocity) in self.velocities.iter_mut().enumerate() {
                    apply_repulsion(&tree, index, &self.positions, charge, velocity);
                }
            }
            apply_collisions(
                &tree,
                &tree,
                true,
                &self.positions,
                &self.radii,
                &mut self.velocities,
            );
        }

        for (position, velocity) in self.positions.iter_mut().zip(self.velocities.iter_mut()) {
            *velocity *= 1.0 - VELOCITY_DECAY;
            let speed_sq = velocity.length_sq();
            if speed_sq > MAX_SPEED * MAX_SPEED {
                *velocity *= MAX_SPEED / speed_sq.sqrt();
            }
            *position += *velocity;
        }

        apply_centering(&mut self.positions, self.center, config.center_strength);

        if self.alpha < ALPHA_MIN {
            self.phase = SimulationPhase::Settled;
            tracing::debug!(ticks = self.ticks, "simulation settled");
        }

        self.phase == SimulationPhase::Running
    }
}

/// Phyllotaxis spiral with a per-id nudge so equal layouts don't start
/// perfectly symmetric.
fn initial_offset(index: usize, id: &str) -> Vec2 {
    const INITIAL_RADIUS: f32 = 10.0;
    let golden_angle = std::f32::consts::PI * (3.0 - 5.0_f32.sqrt());

    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * golden_angle;
    let (jx, jy) = stable_pair(id);
    vec2(angle.cos(), angle.sin()) * radius + vec2(jx, jy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{PortfolioSource, visible_graph};

    fn graph(scale: usize) -> crate::strategy::GraphData {
        let portfolio = PortfolioSource::Sample { scale }.load().unwrap();
        visible_graph(&portfolio, &GraphSettings::default())
    }

    fn simulation() -> Simulation {
        Simulation::new(
            ForceConfig::from_settings(&GraphSettings::default()),
            vec2(400.0, 300.0),
        )
    }

    #[test]
    fn empty_graph_stays_idle() {
        let mut sim = simulation();
        sim.load(&[], Vec::new());

        assert_eq!(sim.phase(), SimulationPhase::Idle);
        assert!(!sim.tick());
        assert!(sim.positions().is_empty());
        sim.reheat();
        assert_eq!(sim.phase(), SimulationPhase::Idle);
    }

    #[test]
    fn running_simulation_settles() {
        let data = graph(2);
        let mut sim = simulation();
        sim.load(&data.nodes, data.links.clone());
        assert_eq!(sim.phase(), SimulationPhase::Running);
        assert_eq!(sim.alpha(), 1.0);
        assert_eq!(sim.link_count(), data.links.len());

        let mut ticks = 0;
        while sim.tick() {
            ticks += 1;
            assert!(ticks < 400, "simulation never settled");
        }

        assert_eq!(sim.phase(), SimulationPhase::Settled);
        assert!(sim.alpha() < ALPHA_MIN);
        assert!(sim.positions().iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }

    #[test]
    fn settled_layout_separates_nodes_and_centers_them() {
        let data = graph(2);
        let mut sim = simulation();
        sim.load(&data.nodes, data.links.clone());
        while sim.tick() {}

        let positions = sim.positions();
        let centroid = positions.iter().fold(Vec2::ZERO, |sum, p| sum + *p) / positions.len() as f32;
        assert!((centroid - vec2(400.0, 300.0)).length() < 5.0);

        for i in 0..positions.len() {
            for j in (i + 1)..positions.len() {
                assert!(
                    (positions[i] - positions[j]).length() > 1.0,
                    "nodes {i} and {j} collapsed onto each other"
                );
            }
        }
    }

    #[test]
    fn dangling_links_are_dropped_on_resolution() {
        let data = graph(1);
        let mut links = data.links.clone();
        links.push(GraphLink::new("initiative:ini-0", "task:missing"));

        let mut sim = simulation();
        sim.load(&data.nodes, links);
        assert_eq!(sim.link_count(), data.links.len());
        assert!(
            sim.link_endpoints()
                .all(|(s, t)| s < data.nodes.len() && t < data.nodes.len())
        );
    }

    #[test]
    fn disposed_simulation_ignores_ticks_and_reheats() {
        let data = graph(1);
        let mut sim = simulation();
        sim.load(&data.nodes, data.links.clone());
        sim.tick();
        let before = sim.positions().to_vec();

        sim.dispose();
        assert!(!sim.tick());
        sim.reheat();
        assert_eq!(sim.phase(), SimulationPhase::Disposed);
        assert_eq!(sim.positions(), before.as_slice());

        sim.load(&data.nodes, data.links.clone());
        assert_eq!(sim.phase(), SimulationPhase::Disposed);
    }

    #[test]
    fn reheat_restarts_a_settled_layout() {
        let data = graph(1);
        let mut sim = simulation();
        sim.load(&data.nodes, data.links.clone());
        while sim.tick() {}

        sim.reheat();
        assert_eq!(sim.phase(), SimulationPhase::Running);
        assert_eq!(sim.alpha(), 1.0);
    }

    #[test]
    fn recentering_keeps_positions_until_next_tick() {
        let data = graph(1);
        let mut sim = simulation();
        sim.load(&data.nodes, data.links.clone());
        while sim.tick() {}
        let before = sim.positions().to_vec();

        sim.set_center(vec2(700.0, 500.0));
        assert_eq!(sim.positions(), before.as_slice());
        assert_eq!(sim.phase(), SimulationPhase::Running);

        for _ in 0..200 {
            sim.tick();
        }
        let positions = sim.positions();
        let centroid = positions.iter().fold(Vec2::ZERO, |sum, p| sum + *p) / positions.len() as f32;
        assert!((centroid - vec2(700.0, 500.0)).length() < 5.0);
    }
}
