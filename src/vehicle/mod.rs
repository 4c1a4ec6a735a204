pub mod craft;
pub mod stage;

pub use craft::{presets, Craft, CraftBuilder};
pub use stage::{Engine, Stage, StageBuilder};
