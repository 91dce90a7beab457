use crate::{error::GrowthError, volume::VolumeKind};

/// Caller-supplied parameters for one growth run.
///
/// Validated once by [`crate::engine::GrowthEngine::new`]; the defaults
/// reproduce the reference tree.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    pub volume_kind: VolumeKind,
    /// Radius basis of the volume holding the attractor cloud.
    pub tree_size: f32,
    /// Height of the stem's end above the root; anchors the volume.
    pub stem_length: f32,
    pub attractor_point_count: usize,
    pub random_seed: u64,
    pub max_noise_displacement: f32,
    /// Step length of each growth iteration.
    pub node_distance: f32,
    pub influence_distance_multiplier: f32,
    pub death_distance_multiplier: f32,
    /// Exponent of the pipe-model thickness sum, preferably between 2 and 3.
    pub thickness_power: f32,
    pub tip_thickness: f32,
    /// Hard stop for the growth loop.
    pub iteration_cap: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            volume_kind: VolumeKind::Sphere,
            tree_size: 10.0,
            stem_length: 1.0,
            attractor_point_count: 1500,
            random_seed: 5000,
            max_noise_displacement: 5.0,
            node_distance: 0.5,
            influence_distance_multiplier: 20.0,
            death_distance_multiplier: 5.0,
            thickness_power: 2.0,
            tip_thickness: 0.1,
            iteration_cap: 250,
        }
    }
}

impl Config {
    /// Maximum distance at which an attractor point may be assigned to a
    /// node.
    pub fn influence_distance(&self) -> f32 {
        self.influence_distance_multiplier * self.node_distance
    }

    /// Distance below which an attractor point is consumed by new growth.
    pub fn death_distance(&self) -> f32 {
        self.death_distance_multiplier * self.node_distance
    }

    /// Checks every numeric constraint, reporting the first violation.
    pub fn validate(&self) -> Result<(), GrowthError> {
        fn positive(name: &str, value: f32) -> Result<(), GrowthError> {
            if value > 0.0 {
                Ok(())
            } else {
                Err(GrowthError::InvalidConfiguration(format!(
                    "{name} must be positive, got {value}"
                )))
            }
        }

        positive("tree_size", self.tree_size)?;
        positive("stem_length", self.stem_length)?;
        positive("node_distance", self.node_distance)?;
        positive("influence_distance_multiplier", self.influence_distance_multiplier)?;
        positive("death_distance_multiplier", self.death_distance_multiplier)?;
        positive("thickness_power", self.thickness_power)?;
        positive("tip_thickness", self.tip_thickness)?;

        if self.attractor_point_count == 0 {
            return Err(GrowthError::InvalidConfiguration(
                "attractor_point_count must be positive".into(),
            ));
        }
        if self.max_noise_displacement < 0.0 {
            return Err(GrowthError::InvalidConfiguration(format!(
                "max_noise_displacement must not be negative, got {}",
                self.max_noise_displacement
            )));
        }
        if self.iteration_cap == 0 {
            return Err(GrowthError::InvalidConfiguration(
                "iteration_cap must be at least 1".into(),
            ));
        }

        Ok(())
    }
}
