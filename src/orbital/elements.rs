use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;

use crate::error::{GuidanceError, Result};

/// Below this eccentricity / node-vector length an orbit is treated as
/// circular / equatorial and the undefined angles are folded into the next
/// defined one.
const SINGULAR_EPS: f64 = 1e-10;

/// Classical Keplerian orbital elements.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeplerianElements {
    pub sma: f64,       // semi-major axis, m (negative for hyperbolic)
    pub ecc: f64,       // eccentricity (0 = circular)
    pub inc: f64,       // inclination, rad
    pub raan: f64,      // right ascension of ascending node, rad
    pub argp: f64,      // argument of periapsis, rad
    pub true_anom: f64, // true anomaly, rad
}

/// Shape and timing of a bound orbit, as a flight computer reports it.
///
/// Apoapsis and periapsis are altitudes above the body's mean radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSummary {
    pub eccentricity: f64,
    pub apoapsis: f64,          // m
    pub periapsis: f64,         // m
    pub period: f64,            // s
    pub time_to_apoapsis: f64,  // s, in [0, period)
    pub time_to_periapsis: f64, // s, in [0, period)
}

impl KeplerianElements {
    /// Circular orbit of the given radius (not altitude).
    ///
    /// `phase` is the argument of latitude at epoch.
    pub fn circular(radius: f64, inc: f64, phase: f64) -> Self {
        KeplerianElements {
            sma: radius,
            ecc: 0.0,
            inc,
            raan: 0.0,
            argp: 0.0,
            true_anom: phase.rem_euclid(TAU),
        }
    }

    /// Convert to a body-centred state vector (position, velocity).
    pub fn to_state_vector(&self, mu: f64) -> (Vector3<f64>, Vector3<f64>) {
        let p = self.sma * (1.0 - self.ecc * self.ecc); // semi-latus rectum
        let r_pqw = p / (1.0 + self.ecc * self.true_anom.cos());

        // Position in perifocal frame (PQW)
        let r_pqw_vec = Vector3::new(
            r_pqw * self.true_anom.cos(),
            r_pqw * self.true_anom.sin(),
            0.0,
        );

        // Velocity in perifocal frame
        let sqrt_mu_p = (mu / p).sqrt();
        let v_pqw_vec = Vector3::new(
            -sqrt_mu_p * self.true_anom.sin(),
            sqrt_mu_p * (self.ecc + self.true_anom.cos()),
            0.0,
        );

        let (sin_raan, cos_raan) = self.raan.sin_cos();
        let (sin_argp, cos_argp) = self.argp.sin_cos();
        let (sin_inc, cos_inc) = self.inc.sin_cos();

        let rot = |v: &Vector3<f64>| -> Vector3<f64> {
            Vector3::new(
                (cos_raan * cos_argp - sin_raan * sin_argp * cos_inc) * v.x
                    + (-cos_raan * sin_argp - sin_raan * cos_argp * cos_inc) * v.y,
                (sin_raan * cos_argp + cos_raan * sin_argp * cos_inc) * v.x
                    + (-sin_raan * sin_argp + cos_raan * cos_argp * cos_inc) * v.y,
                (sin_argp * sin_inc) * v.x + (cos_argp * sin_inc) * v.y,
            )
        };

        (rot(&r_pqw_vec), rot(&v_pqw_vec))
    }

    /// Convert a body-centred state vector to elements.
    ///
    /// Circular orbits put the argument of latitude in `true_anom` (argp = 0);
    /// equatorial orbits measure from the x axis (raan = 0), so the position is
    /// always recoverable with [`to_state_vector`](Self::to_state_vector).
    pub fn from_state_vector(pos: &Vector3<f64>, vel: &Vector3<f64>, mu: f64) -> Self {
        let r = pos.norm();
        let v = vel.norm();

        let h = pos.cross(vel);
        let h_mag = h.norm();
        let retrograde = h.z < 0.0;

        // Node vector
        let n = Vector3::new(-h.y, h.x, 0.0);
        let n_mag = n.norm();
        let equatorial = n_mag <= SINGULAR_EPS * h_mag;

        let e_vec = ((v * v - mu / r) * pos - pos.dot(vel) * vel) / mu;
        let ecc = e_vec.norm();
        let circular = ecc <= SINGULAR_EPS;

        let energy = 0.5 * v * v - mu / r;
        let sma = -mu / (2.0 * energy);

        let inc = (h.z / h_mag).clamp(-1.0, 1.0).acos();

        let raan = if equatorial {
            0.0
        } else {
            let w = (n.x / n_mag).clamp(-1.0, 1.0).acos();
            if n.y < 0.0 { TAU - w } else { w }
        };

        let argp = if circular {
            0.0
        } else if equatorial {
            let w = e_vec.y.atan2(e_vec.x);
            (if retrograde { -w } else { w }).rem_euclid(TAU)
        } else {
            let w = (n.dot(&e_vec) / (n_mag * ecc)).clamp(-1.0, 1.0).acos();
            if e_vec.z < 0.0 { TAU - w } else { w }
        };

        let true_anom = if !circular {
            let nu = (e_vec.dot(pos) / (ecc * r)).clamp(-1.0, 1.0).acos();
            if pos.dot(vel) < 0.0 { TAU - nu } else { nu }
        } else if equatorial {
            let l = pos.y.atan2(pos.x);
            (if retrograde { -l } else { l }).rem_euclid(TAU)
        } else {
            let u = (n.dot(pos) / (n_mag * r)).clamp(-1.0, 1.0).acos();
            if pos.z < 0.0 { TAU - u } else { u }
        };

        KeplerianElements {
            sma,
            ecc,
            inc,
            raan,
            argp,
            true_anom,
        }
    }

    pub fn is_bound(&self) -> bool {
        self.ecc < 1.0 && self.sma > 0.0
    }

    /// Orbital period, s. Only meaningful for bound orbits.
    pub fn period(&self, mu: f64) -> f64 {
        TAU * (self.sma.powi(3) / mu).sqrt()
    }

    pub fn mean_motion(&self, mu: f64) -> f64 {
        (mu / self.sma.powi(3)).sqrt()
    }

    /// Mean anomaly in [0, 2π) for a bound orbit.
    pub fn mean_anomaly(&self) -> f64 {
        let e = self.ecc;
        let (sin_nu, cos_nu) = self.true_anom.sin_cos();
        let ecc_anom = ((1.0 - e * e).sqrt() * sin_nu).atan2(e + cos_nu);
        (ecc_anom - e * ecc_anom.sin()).rem_euclid(TAU)
    }

    /// Advance a bound orbit by `dt` seconds of unperturbed two-body motion.
    pub fn propagate(&self, dt: f64, mu: f64) -> Self {
        let e = self.ecc;
        let m = (self.mean_anomaly() + self.mean_motion(mu) * dt).rem_euclid(TAU);
        let ecc_anom = solve_kepler(m, e);
        let true_anom = 2.0
            * ((1.0 + e).sqrt() * (0.5 * ecc_anom).sin())
                .atan2((1.0 - e).sqrt() * (0.5 * ecc_anom).cos());
        KeplerianElements {
            true_anom: true_anom.rem_euclid(TAU),
            ..*self
        }
    }

    /// Apsides, period and time-to-apsis relative to a body of `radius`.
    pub fn summary(&self, mu: f64, radius: f64) -> Result<OrbitSummary> {
        if !self.is_bound() {
            return Err(GuidanceError::EscapeTrajectory { eccentricity: self.ecc });
        }
        let n = self.mean_motion(mu);
        let m = self.mean_anomaly();
        Ok(OrbitSummary {
            eccentricity: self.ecc,
            apoapsis: self.sma * (1.0 + self.ecc) - radius,
            periapsis: self.sma * (1.0 - self.ecc) - radius,
            period: self.period(mu),
            time_to_apoapsis: (PI - m).rem_euclid(TAU) / n,
            time_to_periapsis: (TAU - m).rem_euclid(TAU) / n,
        })
    }
}

/// Solve Kepler's equation `M = E - e sin E` for the eccentric anomaly.
pub fn solve_kepler(mean_anom: f64, ecc: f64) -> f64 {
    let mut ecc_anom = if ecc < 0.8 { mean_anom } else { PI };
    for _ in 0..50 {
        let f = ecc_anom - ecc * ecc_anom.sin() - mean_anom;
        let step = f / (1.0 - ecc * ecc_anom.cos());
        ecc_anom -= step;
        if step.abs() < 1e-13 {
            break;
        }
    }
    ecc_anom
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::body::presets;

    const MU: f64 = 3.986_004_418e14;
    const R: f64 = 6_378_137.0;

    #[test]
    fn circular_leo_roundtrip() {
        let orbit = KeplerianElements::circular(R + 400_000.0, 51.6_f64.to_radians(), 1.0);
        let (pos, vel) = orbit.to_state_vector(MU);

        let recovered = KeplerianElements::from_state_vector(&pos, &vel, MU);
        assert!((recovered.sma - orbit.sma).abs() < 1.0, "SMA mismatch");
        assert!(recovered.ecc < 1e-6, "Should be nearly circular");
        assert!((recovered.inc - orbit.inc).abs() < 1e-6, "Inclination mismatch");
        let (pos2, _) = recovered.to_state_vector(MU);
        assert!((pos2 - pos).norm() < 1.0, "position lost in roundtrip");
    }

    #[test]
    fn equatorial_circular_keeps_phase() {
        let orbit = KeplerianElements::circular(700_000.0, 0.0, 2.0);
        let mu = presets::kerbin().mu();
        let (pos, vel) = orbit.to_state_vector(mu);
        let recovered = KeplerianElements::from_state_vector(&pos, &vel, mu);
        let (pos2, vel2) = recovered.to_state_vector(mu);
        assert!((pos2 - pos).norm() < 1e-3);
        assert!((vel2 - vel).norm() < 1e-6);
    }

    #[test]
    fn equatorial_eccentric_roundtrip() {
        let mu = presets::kerbin().mu();
        let orbit = KeplerianElements {
            sma: 800_000.0,
            ecc: 0.1,
            inc: 0.0,
            raan: 0.0,
            argp: 1.2,
            true_anom: 4.0,
        };
        let (pos, vel) = orbit.to_state_vector(mu);
        let recovered = KeplerianElements::from_state_vector(&pos, &vel, mu);
        assert!((recovered.argp - 1.2).abs() < 1e-9);
        assert!((recovered.true_anom - 4.0).abs() < 1e-9);
        let (pos2, _) = recovered.to_state_vector(mu);
        assert!((pos2 - pos).norm() < 1e-3);
    }

    #[test]
    fn circular_orbit_speed() {
        let r = R + 400_000.0;
        let (_, vel) = KeplerianElements::circular(r, 0.0, 0.0).to_state_vector(MU);
        assert!((vel.norm() - (MU / r).sqrt()).abs() < 1.0, "Circular orbit speed mismatch");
    }

    #[test]
    fn leo_period() {
        let period = KeplerianElements::circular(R + 400_000.0, 0.0, 0.0).period(MU);
        // ISS period ~92 min = ~5540 s
        assert!(period > 5400.0 && period < 5700.0, "LEO period should be ~92 min, got {:.0} s", period);
    }

    #[test]
    fn propagate_full_period_returns_home() {
        let orbit = KeplerianElements {
            sma: 9_000_000.0,
            ecc: 0.3,
            inc: 0.4,
            raan: 1.0,
            argp: 2.0,
            true_anom: 0.5,
        };
        let later = orbit.propagate(orbit.period(MU), MU);
        let (p0, _) = orbit.to_state_vector(MU);
        let (p1, _) = later.to_state_vector(MU);
        assert!((p1 - p0).norm() < 1e-2, "drift {:.3e} m", (p1 - p0).norm());
    }

    #[test]
    fn propagate_half_period_circular_is_opposite() {
        let orbit = KeplerianElements::circular(R + 500_000.0, 0.0, 0.0);
        let later = orbit.propagate(0.5 * orbit.period(MU), MU);
        let (p0, _) = orbit.to_state_vector(MU);
        let (p1, _) = later.to_state_vector(MU);
        assert!((p0 + p1).norm() < 1e-3);
    }

    #[test]
    fn summary_of_elliptic_orbit() {
        let orbit = KeplerianElements {
            sma: R + 1_000_000.0,
            ecc: 0.05,
            inc: 0.0,
            raan: 0.0,
            argp: 0.0,
            true_anom: 0.0,
        };
        let s = orbit.summary(MU, R).unwrap();
        assert!((s.apoapsis - (orbit.sma * 1.05 - R)).abs() < 1e-6);
        assert!((s.periapsis - (orbit.sma * 0.95 - R)).abs() < 1e-6);
        assert!((s.time_to_apoapsis - 0.5 * s.period).abs() < 1e-6);
        assert!(s.time_to_periapsis.abs() < 1e-6);
    }

    #[test]
    fn summary_rejects_hyperbola() {
        let orbit = KeplerianElements {
            sma: -1.0e7,
            ecc: 1.5,
            inc: 0.0,
            raan: 0.0,
            argp: 0.0,
            true_anom: 0.0,
        };
        assert!(matches!(
            orbit.summary(MU, R),
            Err(GuidanceError::EscapeTrajectory { .. })
        ));
    }

    #[test]
    fn kepler_solver_high_eccentricity() {
        let e = 0.95;
        for m in [0.01, 0.5, 2.0, 3.1, 5.0] {
            let ecc_anom = solve_kepler(m, e);
            assert!((ecc_anom - e * ecc_anom.sin() - m).abs() < 1e-10);
        }
    }
}
