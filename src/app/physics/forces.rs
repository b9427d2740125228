use eframe::egui::{Vec2, vec2};

use super::quadtree::QuadNode;

const BARNES_HUT_THETA: f32 = 0.9;
const REPULSION_SOFTENING: f32 = 1.0;
const COLLISION_STRENGTH: f32 = 0.7;
const COLLISION_PADDING: f32 = 2.0;

/// Small deterministic direction for bodies sitting on top of each other.
pub(super) fn jiggle(from: usize, to: usize) -> Vec2 {
    let angle = ((from as f32) * 0.618_034 + (to as f32) * 0.414_214) * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin()) * 1e-3
}

pub(super) struct LinkConstraint {
    pub(super) source: usize,
    pub(super) target: usize,
    pub(super) strength: f32,
    /// Share of the correction applied to the target.
    pub(super) bias: f32,
}

impl LinkConstraint {
    /// Weakens links on busy nodes and lets the lighter endpoint move more.
    pub(super) fn from_degrees(
        source: usize,
        target: usize,
        degrees: &[usize],
        link_force: f32,
    ) -> Self {
        let source_degree = degrees[source].max(1) as f32;
        let target_degree = degrees[target].max(1) as f32;
        Self {
            source,
            target,
            strength: link_force / source_degree.min(target_degree),
            bias: source_degree / (source_degree + target_degree),
        }
    }
}

pub(super) fn apply_links(
    links: &[LinkConstraint],
    distance: f32,
    alpha: f32,
    positions: &[Vec2],
    velocities: &mut [Vec2],
) {
    for link in links {
        let (source, target) = (link.source, link.target);
        if source == target {
            continue;
        }

        let mut delta =
            (positions[target] + velocities[target]) - (positions[source] + velocities[source]);
        if delta.length_sq() == 0.0 {
            delta = jiggle(source, target);
        }
        let length = delta.length();
        let correction = delta * ((length - distance) / length * alpha * link.strength);

        velocities[target] -= correction * link.bias;
        velocities[source] += correction * (1.0 - link.bias);
    }
}

/// Barnes-Hut many-body repulsion acting on body `index`.
pub(super) fn apply_repulsion(
    cell: &QuadNode,
    index: usize,
    positions: &[Vec2],
    charge: f32,
    velocity: &mut Vec2,
) {
    if cell.mass <= 0.0 {
        return;
    }

    let point = positions[index];

    if cell.is_leaf() {
        for &other in &cell.indices {
            if other == index {
                continue;
            }
            let mut delta = point - positions[other];
            if delta.length_sq() == 0.0 {
                delta = jiggle(index, other);
            }
            *velocity += delta * (charge / (delta.length_sq() + REPULSION_SOFTENING));
        }
        return;
    }

    let delta = point - cell.center_of_mass;
    let distance_sq = delta.length_sq().max(1e-6);
    let side = cell.bounds.side_length();
    let far_enough = !cell.bounds.contains(point)
        && side * side < BARNES_HUT_THETA * BARNES_HUT_THETA * distance_sq;

    if far_enough {
        *velocity += delta * (charge * cell.mass / (distance_sq + REPULSION_SOFTENING));
        return;
    }

    for child in cell.children() {
        apply_repulsion(child, index, positions, charge, velocity);
    }
}

fn separate_pair(
    from: usize,
    to: usize,
    positions: &[Vec2],
    radii: &[f32],
    velocities: &mut [Vec2],
) {
    let min_distance = radii[from] + radii[to] + COLLISION_PADDING;
    let mut delta = positions[to] - positions[from];
    let mut distance_sq = delta.length_sq();
    if distance_sq >= min_distance * min_distance {
        return;
    }
    if distance_sq == 0.0 {
        delta = jiggle(from, to);
        distance_sq = delta.length_sq();
    }

    let distance = distance_sq.sqrt();
    let push = delta * ((min_distance - distance) / distance * COLLISION_STRENGTH);
    let from_weight = radii[from] * radii[from];
    let to_weight = radii[to] * radii[to];
    let total = (from_weight + to_weight).max(f32::EPSILON);

    velocities[from] -= push * (to_weight / total);
    velocities[to] += push * (from_weight / total);
}

/// Pushes overlapping bodies apart, walking pairs of cells and skipping cell
/// pairs too far apart for their largest bodies to touch.
pub(super) fn apply_collisions(
    cell_a: &QuadNode,
    cell_b: &QuadNode,
    same_cell: bool,
    positions: &[Vec2],
    radii: &[f32],
    velocities: &mut [Vec2],
) {
    let reach = cell_a.max_radius + cell_b.max_radius + COLLISION_PADDING;
    if cell_a.bounds.gap_sq(cell_b.bounds) > reach * reach {
        return;
    }

    if cell_a.is_leaf() && cell_b.is_leaf() {
        for (offset, &from) in cell_a.indices.iter().enumerate() {
            let others = if same_cell {
                &cell_a.indices[offset + 1..]
            } else {
                &cell_b.indices[..]
            };
            for &to in others {
                separate_pair(from, to, positions, radii, velocities);
            }
        }
        return;
    }

    if same_cell {
        let children = cell_a.children().collect::<Vec<_>>();
        for (offset, child) in children.iter().enumerate() {
            apply_collisions(child, child, true, positions, radii, velocities);
            for other in &children[offset + 1..] {
                apply_collisions(child, other, false, positions, radii, velocities);
            }
        }
        return;
    }

    let split_a = !cell_a.is_leaf()
        && (cell_b.is_leaf() || cell_a.bounds.half_extent >= cell_b.bounds.half_extent);
    if split_a {
        for child in cell_a.children() {
            apply_collisions(child, cell_b, false, positions, radii, velocities);
        }
    } else {
        for child in cell_b.children() {
            apply_collisions(cell_a, child, false, positions, radii, velocities);
        }
    }
}

/// Shifts every body so the centroid moves toward `center` by `strength`.
pub(super) fn apply_centering(positions: &mut [Vec2], center: Vec2, strength: f32) {
    if positions.is_empty() || strength <= 0.0 {
        return;
    }

    let centroid = positions.iter().fold(Vec2::ZERO, |sum, position| sum + *position)
        / positions.len() as f32;
    let shift = (centroid - center) * strength.min(1.0);
    for position in positions {
        *position -= shift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stretched_link_pulls_endpoints_together() {
        let positions = [vec2(0.0, 0.0), vec2(200.0, 0.0)];
        let mut velocities = [Vec2::ZERO; 2];
        let link = LinkConstraint::from_degrees(0, 1, &[1, 1], 1.0);

        apply_links(&[link], 80.0, 1.0, &positions, &mut velocities);
        assert!(velocities[0].x > 0.0);
        assert!(velocities[1].x < 0.0);
        assert!((velocities[0].x + velocities[1].x).abs() < 1e-4);
    }

    #[test]
    fn busy_endpoint_moves_less() {
        let link = LinkConstraint::from_degrees(0, 1, &[4, 1], 1.0);
        assert_eq!(link.strength, 1.0);
        assert_eq!(link.bias, 0.8);
    }

    #[test]
    fn repulsion_pushes_bodies_apart() {
        let positions = vec![vec2(-1.0, 0.0), vec2(1.0, 0.0)];
        let root = QuadNode::build(&positions, &[1.0, 1.0]).unwrap();
        let mut left = Vec2::ZERO;
        let mut right = Vec2::ZERO;

        apply_repulsion(&root, 0, &positions, 30.0, &mut left);
        apply_repulsion(&root, 1, &positions, 30.0, &mut right);
        assert!(left.x < 0.0);
        assert!(right.x > 0.0);
    }

    #[test]
    fn overlapping_bodies_separate_and_distant_ones_do_not() {
        let positions = vec![vec2(0.0, 0.0), vec2(3.0, 0.0), vec2(500.0, 500.0)];
        let radii = vec![5.0, 5.0, 5.0];
        let mut velocities = vec![Vec2::ZERO; 3];
        let root = QuadNode::build(&positions, &radii).unwrap();

        apply_collisions(&root, &root, true, &positions, &radii, &mut velocities);
        assert!(velocities[0].x < 0.0);
        assert!(velocities[1].x > 0.0);
        assert_eq!(velocities[2], Vec2::ZERO);
    }

    #[test]
    fn centering_moves_centroid_to_target() {
        let mut positions = [vec2(0.0, 0.0), vec2(10.0, 0.0)];
        apply_centering(&mut positions, vec2(100.0, 50.0), 1.0);
        assert_eq!(positions[0], vec2(95.0, 50.0));
        assert_eq!(positions[1], vec2(105.0, 50.0));
    }
}
