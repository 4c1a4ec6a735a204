use nalgebra::Vector3;

/// Result of a Hohmann transfer calculation.
#[derive(Debug, Clone, Copy)]
pub struct HohmannTransfer {
    pub dv1: f64,           // m/s, first burn (raise apoapsis)
    pub dv2: f64,           // m/s, second burn (circularize)
    pub total_dv: f64,      // m/s, total delta-v
    pub transfer_time: f64, // s, half the transfer orbit period
    pub r1: f64,            // m, initial orbit radius
    pub r2: f64,            // m, final orbit radius
}

/// Compute a Hohmann transfer between two circular orbits of radius `r1` and
/// `r2` (not altitudes) around a body with gravitational parameter `mu`.
///
/// Used as the starting guess for transfer refinement, so a lowering transfer
/// (`r2 < r1`) reports the same positive magnitudes as a raising one.
pub fn hohmann(r1: f64, r2: f64, mu: f64) -> HohmannTransfer {
    let a_transfer = (r1 + r2) / 2.0;

    let v_circ1 = circular_velocity(r1, mu);
    let v_circ2 = circular_velocity(r2, mu);

    let v_transfer_1 = (mu * (2.0 / r1 - 1.0 / a_transfer)).sqrt();
    let v_transfer_2 = (mu * (2.0 / r2 - 1.0 / a_transfer)).sqrt();

    let dv1 = (v_transfer_1 - v_circ1).abs();
    let dv2 = (v_circ2 - v_transfer_2).abs();

    let transfer_time = std::f64::consts::PI * (a_transfer.powi(3) / mu).sqrt();

    HohmannTransfer {
        dv1,
        dv2,
        total_dv: dv1 + dv2,
        transfer_time,
        r1,
        r2,
    }
}

/// Circular orbit velocity at radius `r`.
pub fn circular_velocity(r: f64, mu: f64) -> f64 {
    (mu / r).sqrt()
}

/// Convert maneuver components to an inertial delta-v vector.
///
/// Prograde is along velocity, normal along the orbit's angular momentum and
/// radial completes the right-handed set pointing away from the body.
pub fn maneuver_to_inertial(
    pos: &Vector3<f64>,
    vel: &Vector3<f64>,
    radial: f64,
    normal: f64,
    prograde: f64,
) -> Vector3<f64> {
    let prograde_dir = vel.normalize();
    let normal_dir = pos.cross(vel).normalize();
    let radial_dir = prograde_dir.cross(&normal_dir);
    radial_dir * radial + normal_dir * normal + prograde_dir * prograde
}

#[cfg(test)]
mod tests {
    use super::*;

    const MU_EARTH: f64 = 3.986_004_418e14;
    const R_EARTH: f64 = 6_378_137.0;

    #[test]
    fn hohmann_leo_to_geo() {
        let r_leo = R_EARTH + 200_000.0;
        let r_geo = 42_164_000.0;
        let h = hohmann(r_leo, r_geo, MU_EARTH);

        // Known values: ~2.46 km/s + ~1.48 km/s ≈ 3.94 km/s total
        assert!(h.total_dv > 3800.0 && h.total_dv < 4100.0,
            "LEO→GEO dv should be ~3.94 km/s, got {:.0} m/s", h.total_dv);
        assert!(h.transfer_time > 18_000.0 && h.transfer_time < 20_000.0,
            "Transfer time should be ~5.3 hr, got {:.0} s", h.transfer_time);
    }

    #[test]
    fn zero_dv_for_same_orbit() {
        let r = R_EARTH + 400_000.0;
        let h = hohmann(r, r, MU_EARTH);
        assert!(h.total_dv < 1e-6);
    }

    #[test]
    fn maneuver_frame_axes() {
        let pos = Vector3::new(7.0e6, 0.0, 0.0);
        let vel = Vector3::new(0.0, 7500.0, 0.0);
        let radial = maneuver_to_inertial(&pos, &vel, 1.0, 0.0, 0.0);
        let normal = maneuver_to_inertial(&pos, &vel, 0.0, 1.0, 0.0);
        let prograde = maneuver_to_inertial(&pos, &vel, 0.0, 0.0, 1.0);
        assert!((radial - Vector3::x()).norm() < 1e-12);
        assert!((normal - Vector3::z()).norm() < 1e-12);
        assert!((prograde - Vector3::y()).norm() < 1e-12);
    }
}
