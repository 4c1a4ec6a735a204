use nalgebra::Vector3;

/// Surface relief of a simulated body, as height above its mean radius.
#[derive(Debug, Clone, PartialEq)]
pub enum Terrain {
    /// Constant height everywhere.
    Flat { height: f64 },
    /// A plane rising along `axis` with slope `grade` (rise over run),
    /// `base` metres high where `axis` is horizontal.
    Slope {
        base: f64,
        axis: Vector3<f64>,
        grade: f64,
    },
}

impl Terrain {
    pub fn height(&self, body_radius: f64, position: &Vector3<f64>) -> f64 {
        match self {
            Terrain::Flat { height } => *height,
            Terrain::Slope { base, axis, grade } => {
                let along = position.normalize().dot(&axis.normalize()) * body_radius;
                base + grade * along
            }
        }
    }
}

impl Default for Terrain {
    fn default() -> Self {
        Terrain::Flat { height: 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_terrain_ignores_position() {
        let t = Terrain::Flat { height: 42.0 };
        assert_eq!(t.height(1000.0, &Vector3::new(1.0, 2.0, 3.0)), 42.0);
    }

    #[test]
    fn slope_rises_along_axis() {
        let t = Terrain::Slope { base: 100.0, axis: Vector3::y(), grade: 0.1 };
        let r = 200_000.0;
        let here = Vector3::new(r, 0.0, 0.0);
        let east = Vector3::new(r, 50.0, 0.0);
        assert!((t.height(r, &here) - 100.0).abs() < 1e-9);
        assert!((t.height(r, &east) - 105.0).abs() < 1e-3);
    }
}
