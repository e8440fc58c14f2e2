//! Serafin binary format: a mesh followed by a sequence of time frames.
//!
//! - [`record`]: Fortran-style record markers, byte order and precision
//! - [`header`]: header parsing, writing and size arithmetic
//! - [`mesh`]: mesh construction and transformations on a header
//! - [`reader`] / [`writer`]: frame-level access to a stream

pub mod error;
pub mod header;
pub mod mesh;
pub mod reader;
pub mod record;
pub mod writer;

pub use error::{RequestError, Result, SerafinError, ValidationError};
pub use header::SerafinHeader;
pub use mesh::{apply_transforms, MeshTransform};
pub use reader::SerafinReader;
pub use record::{Endianness, FloatType};
pub use writer::SerafinWriter;
