use crate::types::NodeId;
use glam::Vec3;

/// One growth iteration's mapping from nodes to their attractor points.
///
/// For each node that claimed at least one attractor point this
/// iteration, the set stores the claimed points in the order they were
/// added. Buckets themselves are kept in first-insertion order, so
/// iterating a set is fully deterministic and downstream direction sums
/// are reproducible.
///
/// The set is rebuilt from scratch every iteration by
/// [`crate::attractor::AttractorField::assign_to_nodes`]; it carries no
/// state across iterations (the sticky per-point assignment lives in the
/// attractor field).
#[derive(Debug, Default)]
pub struct AssignmentSets {
    sets: Vec<(NodeId, Vec<Vec3>)>,
}

impl AssignmentSets {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `point` to the bucket for `node`, creating the bucket on
    /// first use.
    ///
    /// ### Parameters
    /// - `node` - The node that claimed the point.
    /// - `point` - The claimed attractor point.
    pub fn add(&mut self, node: NodeId, point: Vec3) {
        if let Some((_, points)) = self.sets.iter_mut().find(|(id, _)| *id == node) {
            points.push(point);
        } else {
            self.sets.push((node, vec![point]));
        }
    }

    /// Number of nodes that claimed at least one point.
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// `true` if no node claimed any point this iteration.
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Iterates the `(node, points)` buckets in first-insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &[Vec3])> {
        self.sets.iter().map(|(id, points)| (*id, points.as_slice()))
    }
}
