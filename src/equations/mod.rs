//! Derived variables: formulas, planning and per-frame evaluation.
//!
//! - [`graph`]: the fixed formulas relating catalog variables
//! - [`resolver`]: ordered plan of formulas producing wanted variables
//! - [`calculator`]: execution of a plan on one frame
//!
//! ```text
//! known IDs ─┐
//!            ├─> EquationResolver ─> EquationPlan ─> FrameCalculator ─> arrays
//! wanted IDs ┘                                            ▲
//!                                           SerafinReader ┘
//! ```

pub mod calculator;
pub mod constants;
pub mod graph;
pub mod operator;
pub mod resolver;

pub use calculator::{FrameCalculator, OutputPrecision};
pub use constants::PhysicalConstants;
pub use graph::{Equation, EquationGraph, ParametrizedKind, StaticEquation};
pub use operator::{FrictionLaw, Operator};
pub use resolver::{Derivation, EquationPlan, EquationResolver, ResolutionRule};
