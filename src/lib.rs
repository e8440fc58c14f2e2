//! # serafin-rs
//!
//! Reader, writer and post-processor for Serafin result files, the binary
//! mesh time-series format of finite-element hydraulic solvers.
//!
//! This crate provides:
//! - A byte-exact Serafin codec (record markers, big/little endian, single
//!   and double precision, 2D triangle and 3D prism meshes)
//! - A bilingual (French/English) catalog of physical variables
//! - An equation resolver planning the formulas that derive wanted
//!   variables (friction velocity, shear stress, Froude number, solid
//!   discharge, Rouse numbers, ...) from the variables already in a file
//! - A frame calculator executing such a plan frame by frame
//!
//! # Example
//!
//! ```no_run
//! use serafin_rs::{
//!     EquationResolver, FrameCalculator, FrictionLaw, Language, SerafinReader, VariableCatalog,
//! };
//! use std::path::Path;
//!
//! let catalog = VariableCatalog::new();
//! let mut reader = SerafinReader::open(Path::new("r2d.slf"), Language::En)?;
//! let known = reader.read_header(&catalog)?.var_ids.clone();
//!
//! let plan = EquationResolver::new(true)
//!     .with_friction_law(FrictionLaw::Manning)
//!     .resolve(&known, &["TAU"])?;
//! let tau = FrameCalculator::new(&plan).compute(&mut reader, 0, &["TAU"])?;
//! # Ok::<(), serafin_rs::SerafinError>(())
//! ```

pub mod equations;
pub mod export;
pub mod serafin;
pub mod variables;

// Re-export main types for convenience
pub use equations::{
    Equation, EquationGraph, EquationPlan, EquationResolver, FrameCalculator, FrictionLaw,
    OutputPrecision, PhysicalConstants,
};
pub use export::{ExportConfig, ExportJob, ExportSummary};
pub use serafin::{
    Endianness, FloatType, MeshTransform, RequestError, Result, SerafinError, SerafinHeader,
    SerafinReader, SerafinWriter, ValidationError,
};
pub use variables::{Language, Variable, VariableCatalog};
