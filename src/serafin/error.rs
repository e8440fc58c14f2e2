//! Error types for the Serafin codec and the derived-variable machinery.
//!
//! Two kinds matter to callers:
//! - [`ValidationError`]: the bytes on disk are inconsistent with the format.
//!   Raised while parsing a header; no partial header is returned.
//! - [`RequestError`]: a call that cannot be honoured (unknown variable, index
//!   out of range, wrong dimensionality, ...). The stream stays usable.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SerafinError>;

/// The file does not follow the Serafin layout.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Neither byte order decodes the title record marker as 80.
    #[error("Cannot determine byte order: first record marker is {marker:02x?}")]
    UnknownEndianness { marker: [u8; 4] },

    /// Leading or trailing record marker differs from the expected payload length.
    #[error("Record marker mismatch in {field}: expected {expected} bytes, found {found}")]
    RecordMarkerMismatch {
        field: &'static str,
        expected: i64,
        found: i64,
    },

    /// Quadratic variables are not supported.
    #[error("Number of quadratic variables must be 0, found {0}")]
    QuadraticVariables(i32),

    /// The fourth integer of the mesh size record must be 1.
    #[error("Mesh size record magic number must be 1, found {0}")]
    BadMagicNumber(i32),

    /// Element type does not match the declared dimensionality.
    #[error("{dimension} mesh requires {expected} nodes per element, found {found}")]
    NodesPerElement {
        dimension: &'static str,
        expected: usize,
        found: usize,
    },

    /// A 3D mesh needs at least two planes.
    #[error("3D mesh requires at least 2 planes, found {0}")]
    NotEnoughPlanes(usize),

    /// A count field is negative.
    #[error("Negative value for {field}: {value}")]
    NegativeCount { field: &'static str, value: i32 },

    /// File length is not header + whole frames (one trailing byte tolerated).
    #[error(
        "File size {file_size} does not match header size {header_size} plus a whole number of {frame_size}-byte frames"
    )]
    FileSizeMismatch {
        file_size: u64,
        header_size: u64,
        frame_size: u64,
    },
}

/// A well-formed call that cannot be carried out.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Frame access before `read_header`.
    #[error("Header has not been read yet")]
    HeaderNotRead,

    /// `read_header` called twice on the same stream.
    #[error("Header has already been read; reopen the file to read it again")]
    HeaderAlreadyRead,

    /// Variable ID not present in the header or the catalog.
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),

    /// Time index outside `[0, nb_frames)`.
    #[error("Time index {index} out of range (file has {nb_frames} frames)")]
    TimeIndexOutOfRange { index: usize, nb_frames: usize },

    /// Layer index outside `[1, nb_planes]`.
    #[error("Layer {layer} out of range [1, {nb_planes}]")]
    LayerOutOfRange { layer: usize, nb_planes: usize },

    /// 3D-only operation on a 2D header.
    #[error("Operation requires a 3D mesh")]
    NotThreeDimensional,

    /// `copy_as_2d` on a header that is already 2D.
    #[error("Mesh is already 2D")]
    AlreadyTwoDimensional,

    /// `copy_as_3d` on a header that is already 3D.
    #[error("Mesh is already 3D")]
    AlreadyThreeDimensional,

    /// `copy_as_3d` with fewer than two planes.
    #[error("A 3D mesh needs at least 2 planes, requested {0}")]
    InvalidPlaneCount(usize),

    /// Output path exists and overwriting was not allowed.
    #[error("Output file already exists: {0}")]
    FileExists(PathBuf),

    /// Frame values do not match the header's variable and node counts.
    #[error("Frame shape mismatch: expected {expected_vars} x {expected_nodes}, got {found}")]
    FrameShape {
        expected_vars: usize,
        expected_nodes: usize,
        found: String,
    },

    /// Frames must be written in non-decreasing time order.
    #[error("Frame time {time} is earlier than previous frame time {previous}")]
    NonMonotonicTime { previous: f64, time: f64 },

    /// Wanted variable is neither present nor derivable.
    #[error("Variable {0} cannot be computed from the available variables")]
    UnderivableVariable(String),

    /// Friction velocity is needed but no friction law was chosen.
    #[error("A friction law is required to compute {0}")]
    MissingFrictionLaw(String),

    /// Rouse identifier without a usable settling velocity.
    #[error("Invalid Rouse variable identifier: {0}")]
    InvalidRouseId(String),
}

/// Error type for all Serafin operations.
#[derive(Debug, Error)]
pub enum SerafinError {
    /// Underlying I/O failure (including truncated files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed file.
    #[error("Invalid Serafin file: {0}")]
    Validation(#[from] ValidationError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    Request(#[from] RequestError),
}

impl SerafinError {
    /// True for malformed-file errors.
    pub fn is_validation(&self) -> bool {
        matches!(self, SerafinError::Validation(_))
    }

    /// True for invalid-request errors.
    pub fn is_request(&self) -> bool {
        matches!(self, SerafinError::Request(_))
    }

    /// Process exit code a command-line front end should use for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            SerafinError::Io(_) => 1,
            SerafinError::Validation(_) => 2,
            SerafinError::Request(_) => 3,
        }
    }
}
