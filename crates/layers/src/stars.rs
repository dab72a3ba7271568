use foundation::math::Vec3;
use serde::{Deserialize, Serialize};

use crate::layer::{Layer, LayerId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarfieldSettings {
    pub count: usize,
    /// Inner radius of the shell the stars are scattered over.
    pub radius: f64,
    /// Shell thickness; each star lies at `radius + U(0, spread)`.
    pub spread: f64,
    pub seed: u64,
}

impl Default for StarfieldSettings {
    fn default() -> Self {
        Self {
            count: 2000,
            radius: 80.0,
            spread: 10.0,
            seed: 0x5eed,
        }
    }
}

/// Background points, uniformly distributed in direction.
#[derive(Debug, Clone, PartialEq)]
pub struct StarLayer {
    id: LayerId,
    positions: Vec<Vec3>,
}

impl StarLayer {
    pub fn generate(id: u64, settings: &StarfieldSettings) -> Self {
        let mut rng = fastrand::Rng::with_seed(settings.seed);
        let positions = (0..settings.count)
            .map(|_| {
                let theta = rng.f64() * std::f64::consts::TAU;
                let phi = (2.0 * rng.f64() - 1.0).acos();
                let r = settings.radius + rng.f64() * settings.spread;
                Vec3::new(
                    r * phi.sin() * theta.cos(),
                    r * phi.sin() * theta.sin(),
                    r * phi.cos(),
                )
            })
            .collect();
        Self {
            id: LayerId(id),
            positions,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_f32()).collect()
    }
}

impl Layer for StarLayer {
    fn id(&self) -> LayerId {
        self.id
    }

    fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{StarLayer, StarfieldSettings};

    #[test]
    fn stars_fill_the_shell() {
        let settings = StarfieldSettings::default();
        let stars = StarLayer::generate(3, &settings);
        assert_eq!(stars.positions().len(), 2000);
        for p in stars.positions() {
            let r = p.length();
            assert!((80.0 - 1e-9..=90.0 + 1e-9).contains(&r), "radius {r}");
        }
        assert_eq!(stars.flat_positions().len(), 6000);
    }

    #[test]
    fn same_seed_same_sky() {
        let settings = StarfieldSettings {
            count: 16,
            ..StarfieldSettings::default()
        };
        let a = StarLayer::generate(3, &settings);
        let b = StarLayer::generate(3, &settings);
        assert_eq!(a, b);

        let reseeded = StarfieldSettings {
            seed: 7,
            ..settings
        };
        let c = StarLayer::generate(3, &reseeded);
        assert_ne!(a.positions(), c.positions());
    }
}
