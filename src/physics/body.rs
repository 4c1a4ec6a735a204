use super::gravity::{gravity_magnitude, GRAVITATIONAL_CONSTANT};

/// A gravitating body: the one the vessel orbits, or a transfer target.
#[derive(Debug, Clone, PartialEq)]
pub struct Body {
    pub name: String,
    pub mass: f64,       // kg
    pub radius: f64,     // m, mean surface radius
    pub soi_radius: f64, // m, sphere-of-influence radius
}

impl Body {
    pub fn new(name: impl Into<String>, mass: f64, radius: f64, soi_radius: f64) -> Self {
        Self { name: name.into(), mass, radius, soi_radius }
    }

    /// Gravitational parameter, m^3/s^2.
    pub fn mu(&self) -> f64 {
        GRAVITATIONAL_CONSTANT * self.mass
    }

    /// Gravity at `altitude` above the mean radius, m/s^2.
    pub fn gravity_at(&self, altitude: f64) -> f64 {
        gravity_magnitude(self.mass, self.radius + altitude)
    }
}

pub mod presets {
    use super::Body;

    pub fn kerbin() -> Body {
        Body::new("Kerbin", 5.291_515_8e22, 600_000.0, 84_159_286.0)
    }

    pub fn mun() -> Body {
        Body::new("Mun", 9.759_906_6e20, 200_000.0, 2_429_559.1)
    }
}
