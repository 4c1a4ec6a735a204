use super::stage::{Stage, StageBuilder};

// ---------------------------------------------------------------------------
// Craft: ordered sequence of stages, first to fire first
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Craft {
    pub name: String,
    pub stages: Vec<Stage>,
}

impl Craft {
    /// Total wet mass of all stages combined.
    pub fn total_mass(&self) -> f64 {
        self.stages.iter().map(|s| s.total_mass()).sum()
    }

    /// Total ideal delta-v (each stage computed with upper stages as payload).
    pub fn total_delta_v(&self) -> f64 {
        let mut dv = 0.0;
        for i in 0..self.stages.len() {
            let payload: f64 = self.stages[i + 1..].iter().map(|s| s.total_mass()).sum();
            dv += self.stages[i].delta_v(payload);
        }
        dv
    }
}

// ---------------------------------------------------------------------------
// Craft builder
// ---------------------------------------------------------------------------

pub struct CraftBuilder {
    name: String,
    stages: Vec<Stage>,
}

impl CraftBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), stages: vec![] }
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn build(self) -> Craft {
        Craft { name: self.name, stages: self.stages }
    }
}

// ---------------------------------------------------------------------------
// Preset craft
// ---------------------------------------------------------------------------

pub mod presets {
    use super::*;

    /// Single-stage orbiter with one vacuum engine.
    pub fn orbiter() -> Craft {
        CraftBuilder::new("Orbiter")
            .stage(
                StageBuilder::new("Orbiter")
                    .dry_mass(2_500.0)
                    .propellant_mass(4_000.0)
                    .engine("Terrier", 60_000.0, 345.0)
                    .build(),
            )
            .build()
    }

    /// Transfer stage topped by a lander; the transfer stage fires first.
    pub fn transfer_stack() -> Craft {
        CraftBuilder::new("Transfer Stack")
            .stage(
                StageBuilder::new("Transfer")
                    .dry_mass(1_200.0)
                    .propellant_mass(300.0)
                    .engine("Swivel", 215_000.0, 320.0)
                    .build(),
            )
            .stage(
                StageBuilder::new("Lander")
                    .dry_mass(2_000.0)
                    .propellant_mass(2_000.0)
                    .engine("Terrier", 60_000.0, 345.0)
                    .build(),
            )
            .build()
    }

    /// Lander with a thrust-to-weight ratio of ~4 on the Mun.
    pub fn lander() -> Craft {
        CraftBuilder::new("Lander")
            .stage(
                StageBuilder::new("Descent")
                    .dry_mass(1_500.0)
                    .propellant_mass(1_500.0)
                    .engine("Spark", 20_000.0, 320.0)
                    .build(),
            )
            .build()
    }
}
