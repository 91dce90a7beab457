//! The iterative growth loop tying the attractor field to the tree.
//!
//! One iteration of [`GrowthEngine::grow`] looks like:
//! 1. Assign every active attractor point to its closest frontier node
//!    within the influence distance
//!    ([`AttractorField::assign_to_nodes`]).
//! 2. For each node that claimed points, grow a child one step along the
//!    mean direction toward them, unless the direction constraints on
//!    the node reject it ([`Tree::is_new_direction_allowed`]).
//! 3. Consume attractor points that the new nodes reached
//!    ([`AttractorField::cull_near`]).
//! 4. The new nodes become the next frontier.
//!
//! The loop converges when an assignment pass comes back empty, and is
//! hard-stopped by the configured iteration cap otherwise. While the
//! stem is being seeded, an empty assignment pass is retried with an
//! unbounded influence distance so the first nodes can always find some
//! attractor, however tight the configured influence radius is.

use crate::{
    assignment::AssignmentSets,
    attractor::AttractorField,
    config::Config,
    error::GrowthError,
    tree::Tree,
    types::NodeId,
    volume::Volume,
};
use glam::Vec3;
use log::{debug, info};

/// Terminal state of a growth run.
///
/// Reaching the iteration cap is reported, not raised: the structure
/// grown so far is still valid and callers may inspect the iteration
/// count to decide whether to keep it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// An assignment pass found no attractor points; growth is complete.
    Converged,
    /// The loop was stopped by the iteration cap.
    IterationCapReached,
}

/// Summary of a finished growth run.
#[derive(Clone, Copy, Debug)]
pub struct GrowthReport {
    pub outcome: Outcome,
    pub iterations: u32,
}

/// Loop state: the stem phase ends the first time a regular assignment
/// pass (at the configured influence distance) is non-empty.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    SeedingStem,
    Growing,
}

/// Owns one growth run: the configuration, the bounding volume, the
/// attractor field and the node/branch arena.
///
/// The tree is rooted at the origin; the stem's end at
/// `(0, stem_length, 0)` anchors the volume. After [`GrowthEngine::grow`]
/// returns, the grown [`Tree`], the remaining and original attractor
/// points, and the [`Volume`] stay readable through the accessors.
#[derive(Debug)]
pub struct GrowthEngine {
    config: Config,
    volume: Volume,
    attractors: AttractorField,
    tree: Tree,
}

impl GrowthEngine {
    /// Validates `config` and sets up the volume, attractor field and
    /// root node.
    ///
    /// ### Errors
    /// [`GrowthError::InvalidConfiguration`] if any parameter violates
    /// its constraint; no partial engine is returned.
    pub fn new(config: Config) -> Result<Self, GrowthError> {
        config.validate()?;

        let stem_end = Vec3::new(0.0, config.stem_length, 0.0);
        let volume = Volume::create(config.volume_kind, stem_end, config.tree_size);
        let attractors = AttractorField::generate(
            &volume,
            config.tree_size,
            config.attractor_point_count,
            config.random_seed,
            config.max_noise_displacement,
        );

        Ok(Self {
            config,
            volume,
            attractors,
            tree: Tree::new(Vec3::ZERO),
        })
    }

    /// Runs the growth loop to its terminal state, then the thickness
    /// pass.
    pub fn grow(&mut self) -> Result<GrowthReport, GrowthError> {
        self.grow_with(|_, _| {})
    }

    /// Like [`GrowthEngine::grow`], invoking `observer` once per
    /// completed iteration with the current tree and attractor field.
    ///
    /// The observer is purely observational; it cannot alter engine
    /// state.
    pub fn grow_with<F>(&mut self, mut observer: F) -> Result<GrowthReport, GrowthError>
    where
        F: FnMut(&Tree, &AttractorField),
    {
        let influence_distance = self.config.influence_distance();
        let death_distance = self.config.death_distance();

        let mut phase = Phase::SeedingStem;
        let mut search: Vec<NodeId> = vec![self.tree.root()];
        let mut iterations = 0u32;

        let outcome = loop {
            let mut sets =
                self.attractors
                    .assign_to_nodes(&self.tree, &search, influence_distance)?;

            if phase == Phase::SeedingStem {
                if sets.is_empty() {
                    // The stem must always be able to reach some attractor.
                    sets = self
                        .attractors
                        .assign_to_nodes(&self.tree, &search, f32::INFINITY)?;
                } else {
                    phase = Phase::Growing;
                }
            }

            let new_nodes = self.grow_from(&sets);
            self.attractors
                .cull_near(&self.tree, &new_nodes, death_distance);
            iterations += 1;

            debug!(
                "iteration {iterations}: {} influenced nodes, {} new nodes, {} active points",
                sets.len(),
                new_nodes.len(),
                self.attractors.len()
            );

            search = new_nodes;
            observer(&self.tree, &self.attractors);

            if sets.is_empty() {
                break Outcome::Converged;
            }
            if iterations >= self.config.iteration_cap {
                info!("maximum iterations reached");
                break Outcome::IterationCapReached;
            }
        };

        self.tree
            .propagate_thickness(self.config.tip_thickness, self.config.thickness_power);

        Ok(GrowthReport { outcome, iterations })
    }

    /// Grows one child per influenced node along the mean direction
    /// toward its claimed points, skipping nodes whose direction
    /// constraints reject the candidate. Skipped points stay assigned
    /// and keep pulling in later iterations.
    fn grow_from(&mut self, sets: &AssignmentSets) -> Vec<NodeId> {
        let mut new_nodes = Vec::with_capacity(sets.len());

        for (node, points) in sets.iter() {
            let origin = self.tree.nodes[node].pos;

            let mut direction = Vec3::ZERO;
            for &point in points {
                direction += point - origin;
            }
            let direction = direction.normalize_or_zero();

            if !self.tree.is_new_direction_allowed(node, direction) {
                continue;
            }

            let end = origin + self.config.node_distance * direction;
            new_nodes.push(self.tree.add_child(node, end));
        }
        new_nodes
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn volume(&self) -> &Volume {
        &self.volume
    }

    pub fn attractors(&self) -> &AttractorField {
        &self.attractors
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::VolumeKind;

    /// A quick-to-grow configuration used by most loop tests.
    fn small_config() -> Config {
        Config {
            volume_kind: VolumeKind::Sphere,
            tree_size: 4.0,
            stem_length: 1.0,
            attractor_point_count: 150,
            random_seed: 42,
            max_noise_displacement: 0.5,
            node_distance: 0.5,
            influence_distance_multiplier: 20.0,
            death_distance_multiplier: 5.0,
            thickness_power: 2.0,
            tip_thickness: 0.1,
            iteration_cap: 250,
        }
    }

    #[test]
    fn invalid_configuration_is_rejected_at_construction() {
        let config = Config {
            tree_size: -1.0,
            ..small_config()
        };

        assert!(matches!(
            GrowthEngine::new(config),
            Err(GrowthError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn typical_growth_converges_and_consumes_attractors() {
        let mut engine = GrowthEngine::new(small_config()).unwrap();
        let report = engine.grow().unwrap();

        assert_eq!(report.outcome, Outcome::Converged);
        assert!(report.iterations > 0);
        assert!(engine.tree().nodes.len() > 1, "no growth happened");

        // Growth ate into the cloud; the snapshot kept every point.
        let field = engine.attractors();
        assert!(field.len() < field.original_points().len());
        assert_eq!(
            field.original_points().len(),
            small_config().attractor_point_count
        );
    }

    #[test]
    fn growth_is_deterministic_across_runs() {
        let mut first = GrowthEngine::new(small_config()).unwrap();
        let mut second = GrowthEngine::new(small_config()).unwrap();

        let report_a = first.grow().unwrap();
        let report_b = second.grow().unwrap();

        assert_eq!(report_a.iterations, report_b.iterations);
        assert_eq!(first.tree().nodes.len(), second.tree().nodes.len());
        assert_eq!(first.tree().branches.len(), second.tree().branches.len());

        // Bit-for-bit identical geometry.
        for (a, b) in first.tree().nodes.iter().zip(&second.tree().nodes) {
            assert_eq!(a.pos, b.pos);
        }
        for (a, b) in first.tree().branches.iter().zip(&second.tree().branches) {
            assert_eq!(a.start, b.start);
            assert_eq!(a.end, b.end);
        }
    }

    #[test]
    fn grown_structure_is_a_single_rooted_tree() {
        let mut engine = GrowthEngine::new(small_config()).unwrap();
        engine.grow().unwrap();
        let tree = engine.tree();

        assert!(tree.nodes[0].parent_branch.is_none());

        for (id, node) in tree.nodes.iter().enumerate().skip(1) {
            // Every non-root node hangs off exactly one parent branch,
            // whose parent node was created before it (no cycles).
            let parent_branch = node.parent_branch.expect("non-root node without parent");
            let branch = &tree.branches[parent_branch];
            assert!(branch.parent_node < id);
            assert_eq!(branch.end, node.pos);
            assert_eq!(branch.start, tree.nodes[branch.parent_node].pos);

            // The parent's child list points back at the same branch.
            let listed = tree.nodes[branch.parent_node]
                .child_branches
                .iter()
                .filter(|&&cb| cb == parent_branch)
                .count();
            assert_eq!(listed, 1);

            // Walking up always reaches the root.
            let mut current = id;
            let mut steps = 0;
            while let Some(pb) = tree.nodes[current].parent_branch {
                current = tree.branches[pb].parent_node;
                steps += 1;
                assert!(steps <= tree.nodes.len(), "cycle in parent links");
            }
            assert_eq!(current, tree.root());
        }
    }

    #[test]
    fn sibling_and_turn_constraints_hold_after_growth() {
        let mut engine = GrowthEngine::new(small_config()).unwrap();
        engine.grow().unwrap();
        let tree = engine.tree();

        for node in &tree.nodes {
            // Sibling branches keep at least 10 degrees between them.
            for (i, &a) in node.child_branches.iter().enumerate() {
                for &b in &node.child_branches[i + 1..] {
                    let angle = tree.branches[a]
                        .direction
                        .angle_between(tree.branches[b].direction)
                        .to_degrees();
                    assert!(angle >= 10.0 - 1e-3, "sibling angle {angle} too small");
                }
            }

            // No child branch folds back onto the incoming branch.
            if let Some(parent_branch) = node.parent_branch {
                let incoming = tree.branches[parent_branch].direction;
                for &child in &node.child_branches {
                    let dot = tree.branches[child].direction.dot(incoming);
                    assert!(dot >= -0.8 - 1e-4, "turn constraint violated: {dot}");
                }
            }
        }
    }

    #[test]
    fn thickness_is_propagated_bottom_up_after_growth() {
        let config = small_config();
        let mut engine = GrowthEngine::new(config).unwrap();
        engine.grow().unwrap();
        let tree = engine.tree();
        let power = config.thickness_power;

        for (id, node) in tree.nodes.iter().enumerate() {
            let thickness = tree.thickness(id, power);
            // Every node lies on some tip's walk to the root.
            assert!(thickness > 0.0);
            assert!(thickness <= 3.0);

            // A parent is at least as thick as each of its children.
            if let Some(parent_branch) = node.parent_branch {
                let parent = tree.branches[parent_branch].parent_node;
                assert!(tree.thickness(parent, power) >= thickness - 1e-4);
            }
        }
    }

    #[test]
    fn stem_bootstrap_grows_despite_a_tiny_influence_radius() {
        // One attractor point and a practically zero influence distance:
        // the unbounded retry must still let the stem grow.
        let config = Config {
            attractor_point_count: 1,
            influence_distance_multiplier: 1e-6,
            ..small_config()
        };

        let mut engine = GrowthEngine::new(config).unwrap();
        let report = engine.grow().unwrap();

        assert!(engine.tree().nodes.len() >= 2, "stem never grew");
        assert_eq!(report.outcome, Outcome::Converged);
    }

    #[test]
    fn iteration_cap_stops_a_run_that_cannot_converge() {
        // A step far beyond the cloud: the frontier node is never near an
        // attractor, the root keeps re-claiming every point through the
        // sticky assignments, and its only growth direction is taken.
        let config = Config {
            node_distance: 100.0,
            death_distance_multiplier: 0.001,
            iteration_cap: 15,
            attractor_point_count: 50,
            ..small_config()
        };

        let mut engine = GrowthEngine::new(config).unwrap();
        let report = engine.grow().unwrap();

        assert_eq!(report.outcome, Outcome::IterationCapReached);
        assert_eq!(report.iterations, 15);
        // The partial structure is still returned.
        assert!(engine.tree().nodes.len() >= 2);
        assert_eq!(engine.attractors().len(), 50);
    }

    #[test]
    fn observer_runs_once_per_iteration_and_sees_a_shrinking_field() {
        let mut engine = GrowthEngine::new(small_config()).unwrap();

        let mut active_counts = Vec::new();
        let report = engine
            .grow_with(|_, attractors| active_counts.push(attractors.len()))
            .unwrap();

        assert_eq!(active_counts.len(), report.iterations as usize);
        // Points are only ever consumed, never re-added.
        assert!(active_counts.windows(2).all(|w| w[1] <= w[0]));
    }
}
