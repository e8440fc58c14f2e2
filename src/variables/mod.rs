//! Physical variable catalog.
//!
//! - [`catalog`]: bilingual ID/name/unit tables for 2D and 3D files

pub mod catalog;
mod specs_2d;
mod specs_3d;

pub use catalog::{
    canonical_id, decode_field, is_valid_settling_velocity, pad_field, parse_rouse_id, rouse_id,
    Language, Variable, VariableCatalog, NAME_LENGTH, ROUSE_PREFIX,
};
