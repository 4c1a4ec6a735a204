use crate::physics::gravity::G0;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// One engine as reported by vessel telemetry.
#[derive(Debug, Clone, PartialEq)]
pub struct Engine {
    pub name: String,
    pub thrust: f64, // N, available at full throttle
    pub isp: f64,    // s
    pub ignited: bool,
    pub flameout: bool,
}

impl Engine {
    pub fn new(name: impl Into<String>, thrust: f64, isp: f64) -> Self {
        Self { name: name.into(), thrust, isp, ignited: false, flameout: false }
    }

    /// Ignited and still fed.
    pub fn is_producing(&self) -> bool {
        self.ignited && !self.flameout
    }

    /// Propellant mass flow at full throttle: mdot = F / (Isp * g0)
    pub fn mass_flow(&self) -> f64 {
        if self.isp > 0.0 {
            self.thrust / (self.isp * G0)
        } else {
            0.0
        }
    }
}

// ---------------------------------------------------------------------------
// Stage definition (one stage of a multi-stage vessel)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Stage {
    pub name: String,
    pub dry_mass: f64,        // kg
    pub propellant_mass: f64, // kg
    pub engines: Vec<Engine>,
}

impl Stage {
    pub fn total_mass(&self) -> f64 {
        self.dry_mass + self.propellant_mass
    }

    /// Combined full-throttle thrust of every engine on the stage.
    pub fn thrust(&self) -> f64 {
        self.engines.iter().map(|e| e.thrust).sum()
    }

    pub fn mass_flow(&self) -> f64 {
        self.engines.iter().map(Engine::mass_flow).sum()
    }

    /// Thrust-weighted specific impulse of the whole stage.
    pub fn isp(&self) -> f64 {
        let flow = self.mass_flow();
        if flow > 0.0 {
            self.thrust() / (flow * G0)
        } else {
            0.0
        }
    }

    /// Full-throttle burn time from propellant and mass flow.
    pub fn burn_time(&self) -> f64 {
        let flow = self.mass_flow();
        if flow > 0.0 {
            self.propellant_mass / flow
        } else {
            0.0
        }
    }

    pub fn delta_v(&self, payload_mass: f64) -> f64 {
        let m0 = self.total_mass() + payload_mass;
        let mf = self.dry_mass + payload_mass;
        self.isp() * G0 * (m0 / mf).ln()
    }
}

// ---------------------------------------------------------------------------
// Stage builder
// ---------------------------------------------------------------------------

pub struct StageBuilder {
    name: String,
    dry_mass: f64,
    propellant_mass: f64,
    engines: Vec<Engine>,
}

impl StageBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dry_mass: 1000.0,
            propellant_mass: 2000.0,
            engines: vec![],
        }
    }

    pub fn dry_mass(mut self, v: f64) -> Self { self.dry_mass = v; self }
    pub fn propellant_mass(mut self, v: f64) -> Self { self.propellant_mass = v; self }

    /// Add an engine of the given vacuum thrust (N) and specific impulse (s).
    pub fn engine(mut self, name: impl Into<String>, thrust: f64, isp: f64) -> Self {
        self.engines.push(Engine::new(name, thrust, isp));
        self
    }

    pub fn build(self) -> Stage {
        Stage {
            name: self.name,
            dry_mass: self.dry_mass,
            propellant_mass: self.propellant_mass,
            engines: self.engines,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_engines_weight_isp_by_flow() {
        let stage = StageBuilder::new("Mixed")
            .engine("A", 100_000.0, 300.0)
            .engine("B", 100_000.0, 200.0)
            .build();
        // 200 kN / ((100/300 + 100/200) kN/s/g0) = 240 s
        assert!((stage.isp() - 240.0).abs() < 1e-9);
    }

    #[test]
    fn burn_time_matches_flow() {
        let stage = StageBuilder::new("S")
            .propellant_mass(1000.0)
            .engine("E", 60_000.0, 345.0)
            .build();
        let expected = 1000.0 / (60_000.0 / (345.0 * G0));
        assert!((stage.burn_time() - expected).abs() < 1e-9);
    }

    #[test]
    fn engineless_stage_has_no_isp() {
        let stage = StageBuilder::new("Decoupler").build();
        assert_eq!(stage.isp(), 0.0);
        assert_eq!(stage.burn_time(), 0.0);
    }
}
