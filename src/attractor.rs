use crate::{
    assignment::AssignmentSets, error::GrowthError, tree::Tree, types::NodeId, volume::Volume,
};
use glam::Vec3;
use log::debug;
use noise::{NoiseFn, OpenSimplex};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// The field of attractor points pulling growth outward.
///
/// Owns the shrinking set of active points plus, per point, the node the
/// point was last assigned to. Keeping that previous owner as an extra
/// candidate makes a point sticky to the node that already claims it even
/// after the node leaves the search frontier, so near-equidistant points
/// do not oscillate between nodes across iterations.
#[derive(Debug)]
pub struct AttractorField {
    /// Snapshot of the generated points, never mutated after creation.
    original_points: Vec<Vec3>,
    /// Active points; only ever shrinks.
    points: Vec<Vec3>,
    /// Last assigned node per active point, parallel to `points`.
    assigned: Vec<Option<NodeId>>,
}

impl AttractorField {
    /// Wraps an existing point cloud as an attractor field.
    pub fn from_points(points: Vec<Vec3>) -> Self {
        Self {
            original_points: points.clone(),
            assigned: vec![None; points.len()],
            points,
        }
    }

    /// Generates exactly `count` points inside `volume`.
    ///
    /// Candidates are drawn uniformly from a cube of half-extent
    /// `2 * tree_size` around the volume center and rejected until they
    /// land inside the volume. Accepted candidates are displaced by
    /// coherent noise sampled at their unperturbed position; the
    /// displacement is applied to x twice and to z once, leaving y
    /// untouched.
    ///
    /// Fully deterministic for a fixed `seed`.
    pub fn generate(
        volume: &Volume,
        tree_size: f32,
        count: usize,
        seed: u64,
        max_noise_displacement: f32,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let noise = OpenSimplex::new(seed as u32);
        let center = volume.center();
        let half_extent = tree_size * 2.0;

        let mut points = Vec::with_capacity(count);
        while points.len() < count {
            let x = rng.random_range(-half_extent..=half_extent);
            let y = rng.random_range(-half_extent..=half_extent);
            let z = rng.random_range(-half_extent..=half_extent);

            let mut point = center + Vec3::new(x, y, z);
            if !volume.contains(point) {
                continue;
            }

            let displacement = max_noise_displacement
                * noise.get([point.x as f64, point.y as f64, point.z as f64]) as f32;
            point.x += displacement;
            point.x += displacement;
            point.z += displacement;

            points.push(point);
        }

        debug!("generated {} attractor points", points.len());
        Self::from_points(points)
    }

    pub fn original_points(&self) -> &[Vec3] {
        &self.original_points
    }

    pub fn active_points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Assigns every active point to its closest candidate node within
    /// `influence_radius`.
    ///
    /// The candidate set for a point is `candidates` plus (last) the
    /// point's sticky previous owner. The closest node wins, ties going
    /// to the first-encountered candidate; points whose closest node lies
    /// beyond the influence radius stay unassigned this iteration but
    /// keep their sticky owner.
    ///
    /// ### Errors
    /// [`GrowthError::AssignmentDesync`] if the assignment tracking no
    /// longer matches the active point set.
    pub fn assign_to_nodes(
        &mut self,
        tree: &Tree,
        candidates: &[NodeId],
        influence_radius: f32,
    ) -> Result<AssignmentSets, GrowthError> {
        if self.assigned.len() != self.points.len() {
            return Err(GrowthError::AssignmentDesync {
                assigned: self.assigned.len(),
                active: self.points.len(),
            });
        }

        let mut sets = AssignmentSets::new();
        for (i, &point) in self.points.iter().enumerate() {
            let previous = self.assigned[i];
            let Some((node, distance)) =
                tree.find_nearest_among(candidates.iter().copied().chain(previous), point)
            else {
                continue;
            };
            if distance > influence_radius {
                continue;
            }

            self.assigned[i] = Some(node);
            sets.add(node, point);
        }
        Ok(sets)
    }

    /// Permanently removes every active point whose closest node among
    /// `recent` is nearer than `death_radius`, along with its assignment
    /// entry. Relative order of the surviving points is preserved.
    ///
    /// ### Returns
    /// The number of points removed.
    pub fn cull_near(&mut self, tree: &Tree, recent: &[NodeId], death_radius: f32) -> usize {
        let mut write = 0;
        for read in 0..self.points.len() {
            let point = self.points[read];
            let consumed = tree
                .find_nearest_among(recent.iter().copied(), point)
                .is_some_and(|(_, dist)| dist < death_radius);
            if consumed {
                continue;
            }
            self.points[write] = point;
            self.assigned[write] = self.assigned[read];
            write += 1;
        }

        let removed = self.points.len() - write;
        self.points.truncate(write);
        self.assigned.truncate(write);
        removed
    }
}
