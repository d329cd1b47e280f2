// Simulation models - dynamics, sampling, and pricing

pub mod distribution;
pub mod driver;
pub mod kernel;
pub mod params;
pub mod pricer;
pub mod rng;
pub mod target;

pub use driver::{run_simulation, Diagnostics, ProgressSnapshot, SimResult};
pub use params::{
    HestonParams, JumpKind, JumpParams, Regime, RegimeParams, RegimeSet, RegimeSwitch, SimInputs,
};
pub use target::Target;
