use glam::Vec3;

/// Selects which [`Volume`] variant to build for a growth run.
///
/// Adding a new volume shape means adding a variant here and a matching
/// arm in [`Volume::create`]; the match is exhaustive, so a missing arm
/// is a compile error rather than a runtime failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VolumeKind {
    Sphere,
}

/// A geometric region that bounds the attractor point cloud.
///
/// Membership is a pure predicate; a `Volume` is never mutated after
/// construction.
#[derive(Clone, Copy, Debug)]
pub enum Volume {
    Sphere { center: Vec3, radius: f32 },
}

impl Volume {
    /// Builds the volume variant selected by `kind`, anchored at the end
    /// of the stem.
    pub fn create(kind: VolumeKind, stem_end: Vec3, size: f32) -> Self {
        match kind {
            VolumeKind::Sphere => Self::sphere(stem_end, size),
        }
    }

    /// Sphere whose center sits `radius - radius/5` above the stem's end,
    /// so the stem ends 20% of the radius below the center.
    pub fn sphere(stem_end: Vec3, radius: f32) -> Self {
        Self::Sphere {
            center: stem_end + Vec3::new(0.0, radius - radius / 5.0, 0.0),
            radius,
        }
    }

    pub fn center(&self) -> Vec3 {
        match self {
            Self::Sphere { center, .. } => *center,
        }
    }

    /// `true` iff `point` lies strictly inside the volume.
    pub fn contains(&self, point: Vec3) -> bool {
        match self {
            Self::Sphere { center, radius } => center.distance(point) < *radius,
        }
    }

    /// Keeps only the points inside the volume, preserving their relative
    /// order.
    pub fn filter_within(&self, points: &[Vec3]) -> Vec<Vec3> {
        points.iter().copied().filter(|&p| self.contains(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_center_is_offset_above_stem_end() {
        let volume = Volume::sphere(Vec3::new(0.0, 1.0, 0.0), 10.0);

        // 10 - 10/5 = 8 above the stem end at y = 1.
        assert_eq!(volume.center(), Vec3::new(0.0, 9.0, 0.0));
    }

    #[test]
    fn contains_is_strict_on_the_boundary() {
        let volume = Volume::sphere(Vec3::new(0.0, 1.0, 0.0), 10.0);

        assert!(volume.contains(Vec3::new(0.0, 9.0, 9.9)));
        assert!(!volume.contains(Vec3::new(0.0, 9.0, 10.1)));
        // Exactly on the surface counts as outside.
        assert!(!volume.contains(Vec3::new(0.0, 9.0, 10.0)));
    }

    #[test]
    fn filter_within_keeps_members_in_order() {
        let volume = Volume::sphere(Vec3::ZERO, 5.0);
        let center = volume.center();

        let inside_a = center + Vec3::new(1.0, 0.0, 0.0);
        let inside_b = center + Vec3::new(0.0, -2.0, 0.0);
        let outside = center + Vec3::new(10.0, 0.0, 0.0);

        let kept = volume.filter_within(&[inside_a, outside, inside_b]);

        assert_eq!(kept, vec![inside_a, inside_b]);
    }

    #[test]
    fn create_builds_the_selected_variant() {
        let volume = Volume::create(VolumeKind::Sphere, Vec3::ZERO, 4.0);

        assert_eq!(volume.center(), Vec3::new(0.0, 3.2, 0.0));
        assert!(volume.contains(volume.center()));
    }
}
