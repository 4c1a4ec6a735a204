use nalgebra::Vector3;

pub const G0: f64 = 9.80665; // standard gravity, m/s^2
pub const GRAVITATIONAL_CONSTANT: f64 = 6.674_30e-11; // m^3 kg^-1 s^-2

/// Magnitude of gravitational acceleration at distance `r` from the centre
/// of a body of mass `mass`.
pub fn gravity_magnitude(mass: f64, r: f64) -> f64 {
    GRAVITATIONAL_CONSTANT * mass / (r * r)
}

/// Point-mass gravity acceleration for a body-centred position.
pub fn gravity_pointmass(pos: &Vector3<f64>, mu: f64) -> Vector3<f64> {
    let r = pos.norm();
    if r < 1.0 {
        return Vector3::zeros();
    }
    -mu / (r * r * r) * pos
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earth_surface_gravity() {
        let g = gravity_magnitude(5.972e24, 6_371_000.0);
        assert!((g - 9.82).abs() < 0.01, "got {}", g);
    }

    #[test]
    fn inverse_square_falloff() {
        let near = gravity_magnitude(1.0e22, 1.0e6);
        let far = gravity_magnitude(1.0e22, 2.0e6);
        assert!((near / far - 4.0).abs() < 1e-12);
    }

    #[test]
    fn pointmass_points_at_centre() {
        let mu = 3.5316e12;
        let pos = Vector3::new(0.0, 700_000.0, 0.0);
        let a = gravity_pointmass(&pos, mu);
        assert!(a.x.abs() < 1e-12 && a.z.abs() < 1e-12);
        assert!((a.y + mu / 700_000.0_f64.powi(2)).abs() < 1e-9);
    }
}
