pub mod game;
pub mod grid;
pub mod growth;
pub mod plant;
pub mod policy;
pub mod population;
pub mod rng;
pub mod scenario;
pub mod snapshot;
pub mod terrain;

pub use game::{Game, Placement, PlacementOutcome, StepSummary};
pub use scenario::{Scenario, ScenarioLoader};
