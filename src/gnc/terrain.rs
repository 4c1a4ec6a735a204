use std::f64::consts::TAU;

use nalgebra::Vector3;

use crate::vessel::Ephemeris;

/// Local terrain normal beneath `position`, pointing away from the body.
///
/// Three terrain points are sampled `sample_radius` metres from the vessel's
/// ground track, 120 degrees apart, and the normal of the plane through them
/// is returned. Falls back to the local vertical when the samples coincide.
pub fn terrain_normal<E>(ephemeris: &E, position: &Vector3<f64>, sample_radius: f64) -> Vector3<f64>
where
    E: Ephemeris + ?Sized,
{
    let up = position.normalize();
    let reference = if up.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    let east = up.cross(&reference).normalize();
    let north = up.cross(&east);

    let radius = ephemeris.body().radius;
    let sample = |k: f64| {
        let bearing = k * TAU / 3.0;
        let offset = east * bearing.cos() + north * bearing.sin();
        let ground = (up * radius + offset * sample_radius).normalize() * radius;
        ground.normalize() * (radius + ephemeris.terrain_height(&ground))
    };
    let (a, b, c) = (sample(0.0), sample(1.0), sample(2.0));

    let normal = (b - a).cross(&(c - a));
    if normal.norm() == 0.0 || !normal.norm().is_finite() {
        return up;
    }
    let normal = normal.normalize();
    if normal.dot(&up) < 0.0 {
        -normal
    } else {
        normal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{body::presets, Body};
    use crate::vessel::Tracked;

    struct Slope {
        body: Body,
        slope: f64,
    }

    impl Ephemeris for Slope {
        fn body(&self) -> &Body {
            &self.body
        }

        fn target(&self) -> Option<&Body> {
            None
        }

        fn position_at(&self, _tracked: Tracked, _t: f64) -> Option<Vector3<f64>> {
            None
        }

        fn terrain_height(&self, position: &Vector3<f64>) -> f64 {
            self.slope * position.z
        }
    }

    fn above_surface(body: &Body) -> Vector3<f64> {
        Vector3::new(body.radius + 100.0, 0.0, 0.0)
    }

    #[test]
    fn flat_ground_normal_is_vertical() {
        let terrain = Slope { body: presets::mun(), slope: 0.0 };
        let n = terrain_normal(&terrain, &above_surface(&terrain.body), 5.0);
        assert!((n - Vector3::x()).norm() < 1e-6, "got {:?}", n);
    }

    #[test]
    fn sloped_ground_tilts_normal() {
        let terrain = Slope { body: presets::mun(), slope: 0.2 };
        let n = terrain_normal(&terrain, &above_surface(&terrain.body), 5.0);

        let expected = Vector3::new(1.0, 0.0, -0.2).normalize();
        assert!((n - expected).norm() < 1e-3, "got {:?}", n);
        assert!((n.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normal_points_up_on_the_far_side() {
        let terrain = Slope { body: presets::mun(), slope: 0.0 };
        let below = -above_surface(&terrain.body);
        let n = terrain_normal(&terrain, &below, 5.0);
        assert!(n.dot(&below) > 0.0);
    }
}
