//! Serafin file header: metadata, variable table and mesh.
//!
//! # Layout
//!
//! ```text
//! record(80)           title (72 bytes) + format tag (8 bytes)
//! record(8)            nb_var, nb_var_quadratic (must be 0)
//! record(32) x nb_var  name (16 bytes) + unit (16 bytes)
//! record(40)           10 integer parameters
//! record(24)           start date, only if params[9] == 1
//! record(16)           nb_elements, nb_nodes, nb_nodes_per_elem, 1
//! record(4*ne*npe)     IKLE, 1-indexed connectivity
//! record(4*nn)         IPOBO, boundary ranks (0 = interior)
//! record(fs*nn)        x coordinates
//! record(fs*nn)        y coordinates
//! ```
//!
//! followed by frames:
//!
//! ```text
//! record(fs)           time
//! record(fs*nn) x nb_var  one record per variable, in header order
//! ```
//!
//! where `fs` is 4 (single precision) or 8 (double precision).
//!
//! Parameters with meaning: `params[2], params[3]` mesh origin offset,
//! `params[6]` number of planes (0 for 2D), `params[9]` date flag.

use std::fmt;
use std::io::{Read, Write};

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use super::error::{RequestError, Result, ValidationError};
use super::record::{
    encode_floats, encode_i32s, write_record, Endianness, FloatType, RecordReader, MARKER_SIZE,
};
use crate::variables::{
    canonical_id, decode_field, pad_field, parse_rouse_id, Language, Variable, VariableCatalog,
    NAME_LENGTH,
};

/// Length of the title field.
pub const TITLE_LENGTH: usize = 72;

/// Number of integer parameters.
pub const NB_PARAMS: usize = 10;

/// Record overhead: leading and trailing markers.
const RECORD_OVERHEAD: u64 = 2 * MARKER_SIZE;

/// Metadata and mesh of a Serafin file.
///
/// Coordinates are stored absolute: the origin offset read from the
/// parameters is already added to `x` and `y`, and is subtracted again when
/// the header is written.
#[derive(Clone, Debug, PartialEq)]
pub struct SerafinHeader {
    /// Title, space padded
    pub title: [u8; TITLE_LENGTH],
    /// Format tag as read (or canonical tag for programmatic headers)
    pub file_format: [u8; 8],
    /// Precision of coordinates and values
    pub float_type: FloatType,
    /// Byte order
    pub endianness: Endianness,
    /// Language used for name/ID mapping
    pub language: Language,

    /// Variable IDs, in on-disk order
    pub var_ids: Vec<String>,
    /// Stored variable names, parallel to `var_ids`
    pub var_names: Vec<[u8; NAME_LENGTH]>,
    /// Stored variable units, parallel to `var_ids`
    pub var_units: Vec<[u8; NAME_LENGTH]>,

    /// The ten integer parameters as read
    pub params: [i32; NB_PARAMS],
    /// Start date (year, month, day, hour, minute, second)
    pub date: Option<[i32; 6]>,

    /// Number of elements (triangles or prisms)
    pub nb_elements: usize,
    /// Number of nodes
    pub nb_nodes: usize,
    /// 3 for triangles, 6 for prisms
    pub nb_nodes_per_elem: usize,
    /// Nodes per plane (equal to `nb_nodes` in 2D)
    pub nb_nodes_2d: usize,
    /// 0 for 2D, at least 2 for 3D
    pub nb_planes: usize,
    /// Origin offset added to stored coordinates
    pub mesh_origin: (i32, i32),

    /// Node x coordinates
    pub x: Vec<f64>,
    /// Node y coordinates
    pub y: Vec<f64>,
    /// Flattened 1-indexed connectivity, `nb_elements * nb_nodes_per_elem`
    pub ikle: Vec<i32>,
    /// Boundary rank per node (0 = interior)
    pub ipobo: Vec<i32>,
    /// Flattened 1-indexed triangle connectivity of the 2D view
    pub ikle_2d: Vec<i32>,
}

impl SerafinHeader {
    /// Create an empty 2D header with no mesh and no variables.
    pub fn empty(language: Language, float_type: FloatType) -> Self {
        Self {
            title: [b' '; TITLE_LENGTH],
            file_format: float_type.tag(),
            float_type,
            endianness: Endianness::Big,
            language,
            var_ids: Vec::new(),
            var_names: Vec::new(),
            var_units: Vec::new(),
            params: [1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
            date: None,
            nb_elements: 0,
            nb_nodes: 0,
            nb_nodes_per_elem: 3,
            nb_nodes_2d: 0,
            nb_planes: 0,
            mesh_origin: (0, 0),
            x: Vec::new(),
            y: Vec::new(),
            ikle: Vec::new(),
            ipobo: Vec::new(),
            ikle_2d: Vec::new(),
        }
    }

    // =========================================================================
    // Parsing
    // =========================================================================

    /// Parse a header from the start of a stream.
    ///
    /// Leaves the stream positioned at the first frame. Frame count and size
    /// consistency are checked separately with [`SerafinHeader::frame_count`].
    pub fn parse<R: Read>(
        reader: &mut R,
        language: Language,
        catalog: &VariableCatalog,
    ) -> Result<Self> {
        // Byte order is unknown until the first marker has been inspected
        let mut marker = [0u8; 4];
        reader.read_exact(&mut marker)?;
        let endianness =
            Endianness::detect(marker).ok_or(ValidationError::UnknownEndianness { marker })?;

        let mut title_record = [0u8; 80];
        reader.read_exact(&mut title_record)?;
        let mut trailing = [0u8; 4];
        reader.read_exact(&mut trailing)?;
        if endianness.i32_from(trailing) != 80 {
            return Err(ValidationError::RecordMarkerMismatch {
                field: "title",
                expected: 80,
                found: endianness.i32_from(trailing) as i64,
            }
            .into());
        }

        let mut title = [0u8; TITLE_LENGTH];
        title.copy_from_slice(&title_record[..TITLE_LENGTH]);
        let mut file_format = [0u8; 8];
        file_format.copy_from_slice(&title_record[TITLE_LENGTH..]);

        let (float_type, recognized) = FloatType::from_tag(&file_format);
        if !recognized {
            log::warn!(
                "Unknown format tag '{}', assuming single precision",
                String::from_utf8_lossy(&file_format)
            );
        }

        let mut rr = RecordReader::new(reader, endianness, float_type);

        let counts = rr.read_i32s("variable counts", 2)?;
        let nb_var = non_negative("nb_var", counts[0])?;
        if counts[1] != 0 {
            return Err(ValidationError::QuadraticVariables(counts[1]).into());
        }

        let mut var_names = Vec::with_capacity(nb_var);
        let mut var_units = Vec::with_capacity(nb_var);
        for _ in 0..nb_var {
            let record = rr.read_record("variable name", 2 * NAME_LENGTH)?;
            let mut name = [0u8; NAME_LENGTH];
            let mut unit = [0u8; NAME_LENGTH];
            name.copy_from_slice(&record[..NAME_LENGTH]);
            unit.copy_from_slice(&record[NAME_LENGTH..]);
            var_names.push(name);
            var_units.push(unit);
        }

        let params_vec = rr.read_i32s("parameters", NB_PARAMS)?;
        let mut params = [0i32; NB_PARAMS];
        params.copy_from_slice(&params_vec);

        let date = if params[9] == 1 {
            let d = rr.read_i32s("date", 6)?;
            Some([d[0], d[1], d[2], d[3], d[4], d[5]])
        } else {
            None
        };

        let sizes = rr.read_i32s("mesh sizes", 4)?;
        let nb_elements = non_negative("nb_elements", sizes[0])?;
        let nb_nodes = non_negative("nb_nodes", sizes[1])?;
        let nb_nodes_per_elem = non_negative("nb_nodes_per_elem", sizes[2])?;
        if sizes[3] != 1 {
            return Err(ValidationError::BadMagicNumber(sizes[3]).into());
        }

        let nb_planes = non_negative("nb_planes", params[6])?;
        check_dimensions(nb_planes, nb_nodes_per_elem)?;
        let nb_nodes_2d = if nb_planes == 0 {
            nb_nodes
        } else {
            nb_nodes / nb_planes
        };

        let ikle = rr.read_i32s("IKLE", nb_elements * nb_nodes_per_elem)?;
        let ipobo = rr.read_i32s("IPOBO", nb_nodes)?;

        let mesh_origin = (params[2], params[3]);
        let mut x = rr.read_floats("x coordinates", nb_nodes)?;
        let mut y = rr.read_floats("y coordinates", nb_nodes)?;
        if mesh_origin != (0, 0) {
            let (x0, y0) = (mesh_origin.0 as f64, mesh_origin.1 as f64);
            x.iter_mut().for_each(|v| *v += x0);
            y.iter_mut().for_each(|v| *v += y0);
        }

        let is_2d = nb_planes == 0;
        let var_ids = var_names
            .iter()
            .map(|stored| {
                let name = decode_field(stored);
                match catalog.id_from_name(&name, language, is_2d) {
                    Some(id) => id.to_string(),
                    None => match parse_rouse_id(&name) {
                        Ok(Some(_)) => canonical_id(&name).into_owned(),
                        _ => {
                            log::warn!("Unknown variable name '{}', using it as its ID", name);
                            name
                        }
                    },
                }
            })
            .collect();

        let ikle_2d = build_ikle_2d(&ikle, nb_nodes_per_elem, nb_planes);

        let header = Self {
            title,
            file_format,
            float_type,
            endianness,
            language,
            var_ids,
            var_names,
            var_units,
            params,
            date,
            nb_elements,
            nb_nodes,
            nb_nodes_per_elem,
            nb_nodes_2d,
            nb_planes,
            mesh_origin,
            x,
            y,
            ikle,
            ipobo,
            ikle_2d,
        };
        log::debug!(
            "Parsed Serafin header: {} nodes, {} elements, {} variables",
            header.nb_nodes,
            header.nb_elements,
            header.nb_var()
        );
        Ok(header)
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    /// Write the header in the layout described in the module docs.
    ///
    /// All counts and parameters are re-derived from the current fields, so a
    /// header modified since it was read stays self-consistent.
    pub fn write<W: Write>(&self, writer: &mut W) -> Result<()> {
        let endian = self.endianness;

        let mut title_record = Vec::with_capacity(80);
        title_record.extend_from_slice(&self.title);
        title_record.extend_from_slice(&self.format_tag());
        write_record(writer, endian, &title_record)?;

        write_record(
            writer,
            endian,
            &encode_i32s(&[self.nb_var() as i32, 0], endian),
        )?;

        for (name, unit) in self.var_names.iter().zip(&self.var_units) {
            let mut record = Vec::with_capacity(2 * NAME_LENGTH);
            record.extend_from_slice(name);
            record.extend_from_slice(unit);
            write_record(writer, endian, &record)?;
        }

        write_record(writer, endian, &encode_i32s(&self.params_to_write(), endian))?;

        if let Some(date) = &self.date {
            write_record(writer, endian, &encode_i32s(date, endian))?;
        }

        let sizes = [
            self.nb_elements as i32,
            self.nb_nodes as i32,
            self.nb_nodes_per_elem as i32,
            1,
        ];
        write_record(writer, endian, &encode_i32s(&sizes, endian))?;
        write_record(writer, endian, &encode_i32s(&self.ikle, endian))?;
        write_record(writer, endian, &encode_i32s(&self.ipobo, endian))?;

        let (x0, y0) = (self.mesh_origin.0 as f64, self.mesh_origin.1 as f64);
        let x_stored: Vec<f64> = self.x.iter().map(|v| v - x0).collect();
        let y_stored: Vec<f64> = self.y.iter().map(|v| v - y0).collect();
        write_record(
            writer,
            endian,
            &encode_floats(&x_stored, endian, self.float_type),
        )?;
        write_record(
            writer,
            endian,
            &encode_floats(&y_stored, endian, self.float_type),
        )?;
        Ok(())
    }

    /// Format tag consistent with the current precision.
    pub fn format_tag(&self) -> [u8; 8] {
        let (tag_type, recognized) = FloatType::from_tag(&self.file_format);
        if recognized && tag_type == self.float_type {
            self.file_format
        } else {
            self.float_type.tag()
        }
    }

    /// Parameters with origin, plane count and date flag synchronised.
    pub fn params_to_write(&self) -> [i32; NB_PARAMS] {
        let mut params = self.params;
        params[2] = self.mesh_origin.0;
        params[3] = self.mesh_origin.1;
        params[6] = self.nb_planes as i32;
        params[9] = i32::from(self.date.is_some());
        params
    }

    // =========================================================================
    // Sizes
    // =========================================================================

    /// Number of variables.
    #[inline]
    pub fn nb_var(&self) -> usize {
        self.var_ids.len()
    }

    /// True for a 2D (triangle) mesh.
    #[inline]
    pub fn is_2d(&self) -> bool {
        self.nb_planes == 0
    }

    /// True for 8-byte floats.
    #[inline]
    pub fn is_double_precision(&self) -> bool {
        self.float_type == FloatType::Double
    }

    /// Number of elements of the 2D view.
    pub fn nb_elements_2d(&self) -> usize {
        if self.is_2d() {
            self.nb_elements
        } else {
            self.nb_elements / (self.nb_planes - 1)
        }
    }

    /// Size in bytes of one variable record within a frame.
    #[inline]
    pub fn var_record_size(&self) -> u64 {
        RECORD_OVERHEAD + self.nb_nodes as u64 * self.float_type.size()
    }

    /// Size in bytes of the time record opening each frame.
    #[inline]
    pub fn time_record_size(&self) -> u64 {
        RECORD_OVERHEAD + self.float_type.size()
    }

    /// Size in bytes of the header.
    pub fn header_size(&self) -> u64 {
        let fs = self.float_type.size();
        let nn = self.nb_nodes as u64;
        let mut size = 80 + RECORD_OVERHEAD; // title
        size += 8 + RECORD_OVERHEAD; // variable counts
        size += self.nb_var() as u64 * (2 * NAME_LENGTH as u64 + RECORD_OVERHEAD);
        size += 4 * NB_PARAMS as u64 + RECORD_OVERHEAD;
        if self.date.is_some() {
            size += 24 + RECORD_OVERHEAD;
        }
        size += 16 + RECORD_OVERHEAD; // mesh sizes
        size += 4 * (self.nb_elements * self.nb_nodes_per_elem) as u64 + RECORD_OVERHEAD;
        size += 4 * nn + RECORD_OVERHEAD; // IPOBO
        size += 2 * (fs * nn + RECORD_OVERHEAD); // x, y
        size
    }

    /// Size in bytes of one frame (time record plus all variable records).
    pub fn frame_size(&self) -> u64 {
        self.time_record_size() + self.nb_var() as u64 * self.var_record_size()
    }

    /// Number of whole frames in a file of `file_size` bytes.
    ///
    /// A single extra trailing byte is tolerated (older files end with a line
    /// feed); anything else is a validation error.
    pub fn frame_count(&self, file_size: u64) -> std::result::Result<usize, ValidationError> {
        let header_size = self.header_size();
        let frame_size = self.frame_size();
        let mismatch = ValidationError::FileSizeMismatch {
            file_size,
            header_size,
            frame_size,
        };
        if file_size < header_size {
            return Err(mismatch);
        }
        let body = file_size - header_size;
        if body % frame_size > 1 {
            return Err(mismatch);
        }
        Ok((body / frame_size) as usize)
    }

    /// Byte offset of the time record of frame `time_index`.
    pub fn frame_offset(&self, time_index: usize) -> u64 {
        self.header_size() + time_index as u64 * self.frame_size()
    }

    /// Byte offset of the payload of variable `position` in frame `time_index`.
    pub fn var_offset(&self, time_index: usize, position: usize) -> u64 {
        self.frame_offset(time_index)
            + self.time_record_size()
            + position as u64 * self.var_record_size()
            + MARKER_SIZE
    }

    // =========================================================================
    // Variable table
    // =========================================================================

    /// Position of a variable in the frame layout. Rouse IDs match whatever
    /// the spelling of their settling velocity.
    pub fn var_position(&self, var_id: &str) -> Option<usize> {
        let var_id = canonical_id(var_id);
        self.var_ids.iter().position(|id| *id == var_id)
    }

    /// Whether the header contains a variable.
    pub fn has_var(&self, var_id: &str) -> bool {
        self.var_position(var_id).is_some()
    }

    /// Position of a variable, or a request error if absent.
    pub fn require_var(&self, var_id: &str) -> std::result::Result<usize, RequestError> {
        self.var_position(var_id)
            .ok_or_else(|| RequestError::UnknownVariable(var_id.to_string()))
    }

    /// Append a variable, stored under the header's language.
    pub fn add_variable(&mut self, variable: &Variable) {
        self.var_ids.push(variable.id.clone());
        self.var_names.push(variable.stored_name(self.language));
        self.var_units.push(variable.stored_unit());
    }

    /// Append a catalog variable (or Rouse variable) by ID.
    pub fn add_variable_from_id(
        &mut self,
        catalog: &VariableCatalog,
        var_id: &str,
    ) -> std::result::Result<(), RequestError> {
        let variable = catalog.lookup(var_id, self.is_2d())?;
        self.add_variable(&variable);
        Ok(())
    }

    /// Append a variable with an explicit name and unit.
    pub fn add_variable_raw(&mut self, var_id: &str, name: &str, unit: &str) {
        self.var_ids.push(var_id.to_string());
        self.var_names.push(pad_field(name));
        self.var_units.push(pad_field(unit));
    }

    /// Remove all variables.
    pub fn clear_variables(&mut self) {
        self.var_ids.clear();
        self.var_names.clear();
        self.var_units.clear();
    }

    /// Stored names without padding.
    pub fn var_names_str(&self) -> Vec<String> {
        self.var_names.iter().map(|n| decode_field(n)).collect()
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Title without padding.
    pub fn title_str(&self) -> String {
        decode_field(&self.title)
    }

    /// Set the title, padded or truncated to 72 bytes.
    pub fn set_title(&mut self, title: &str) {
        self.title = [b' '; TITLE_LENGTH];
        for (dst, src) in self.title.iter_mut().zip(title.bytes()) {
            *dst = src;
        }
    }

    /// Simulation start date, if present and valid.
    pub fn start_datetime(&self) -> Option<NaiveDateTime> {
        let d = self.date?;
        NaiveDate::from_ymd_opt(d[0], d[1] as u32, d[2] as u32)?.and_hms_opt(
            d[3] as u32,
            d[4] as u32,
            d[5] as u32,
        )
    }

    /// Set (or clear) the simulation start date.
    pub fn set_date(&mut self, datetime: Option<NaiveDateTime>) {
        self.date = datetime.map(|dt| {
            [
                dt.year(),
                dt.month() as i32,
                dt.day() as i32,
                dt.hour() as i32,
                dt.minute() as i32,
                dt.second() as i32,
            ]
        });
    }

    // =========================================================================
    // Byte order and precision
    // =========================================================================

    /// Flip the byte order used when writing. Arrays already read are unchanged.
    pub fn toggle_endianness(&mut self) {
        self.endianness = self.endianness.toggled();
    }

    /// Narrow a double precision header to single precision.
    ///
    /// Values are not rescaled; they are rounded when written. A second call
    /// on an already single precision header is ignored with a warning.
    pub fn to_single_precision(&mut self) {
        if self.float_type == FloatType::Single {
            log::warn!("Header is already single precision, conversion ignored");
            return;
        }
        self.float_type = FloatType::Single;
        self.file_format = FloatType::Single.tag();
    }

    /// Triangles of the 2D view as 0-indexed node triples.
    ///
    /// Triangles referencing a node outside `1..=nb_nodes_2d` (possible in a
    /// malformed file) are skipped.
    pub fn triangles(&self) -> Vec<[usize; 3]> {
        let node = |k: i32| {
            usize::try_from(k)
                .ok()
                .and_then(|k| k.checked_sub(1))
                .filter(|&k| k < self.nb_nodes_2d)
        };
        self.ikle_2d
            .chunks_exact(3)
            .filter_map(|t| Some([node(t[0])?, node(t[1])?, node(t[2])?]))
            .collect()
    }
}

impl fmt::Display for SerafinHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Title:      {}", self.title_str())?;
        writeln!(
            f,
            "Format:     {} ({:?} precision, {:?} endian)",
            String::from_utf8_lossy(&self.format_tag()),
            self.float_type,
            self.endianness
        )?;
        if self.is_2d() {
            writeln!(
                f,
                "Mesh:       2D, {} nodes, {} triangles",
                self.nb_nodes, self.nb_elements
            )?;
        } else {
            writeln!(
                f,
                "Mesh:       3D, {} planes, {} nodes, {} prisms",
                self.nb_planes, self.nb_nodes, self.nb_elements
            )?;
        }
        if let Some(dt) = self.start_datetime() {
            writeln!(f, "Start date: {}", dt)?;
        }
        write!(f, "Variables:  ")?;
        let names = self.var_names_str();
        for (i, (id, name)) in self.var_ids.iter().zip(&names).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} ({})", id, name)?;
        }
        Ok(())
    }
}

fn non_negative(field: &'static str, value: i32) -> std::result::Result<usize, ValidationError> {
    usize::try_from(value).map_err(|_| ValidationError::NegativeCount { field, value })
}

/// Check element type against dimensionality.
pub(crate) fn check_dimensions(
    nb_planes: usize,
    nb_nodes_per_elem: usize,
) -> std::result::Result<(), ValidationError> {
    if nb_planes == 0 {
        if nb_nodes_per_elem != 3 {
            return Err(ValidationError::NodesPerElement {
                dimension: "2D",
                expected: 3,
                found: nb_nodes_per_elem,
            });
        }
    } else {
        if nb_nodes_per_elem != 6 {
            return Err(ValidationError::NodesPerElement {
                dimension: "3D",
                expected: 6,
                found: nb_nodes_per_elem,
            });
        }
        if nb_planes < 2 {
            return Err(ValidationError::NotEnoughPlanes(nb_planes));
        }
    }
    Ok(())
}

/// 2D connectivity view.
///
/// Identity in 2D. In 3D the bottom triangle (first three nodes) of every
/// `nb_planes - 1`-th prism.
pub(crate) fn build_ikle_2d(ikle: &[i32], nb_nodes_per_elem: usize, nb_planes: usize) -> Vec<i32> {
    if nb_planes == 0 {
        return ikle.to_vec();
    }
    ikle.chunks_exact(nb_nodes_per_elem)
        .step_by(nb_planes - 1)
        .flat_map(|prism| prism[..3].iter().copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serafin::SerafinError;
    use std::io::Cursor;

    fn two_triangles() -> SerafinHeader {
        let mut header = SerafinHeader::empty(Language::En, FloatType::Single);
        header.set_title("unit test");
        header.nb_elements = 2;
        header.nb_nodes = 4;
        header.nb_nodes_2d = 4;
        header.x = vec![0.0, 1.0, 1.0, 0.0];
        header.y = vec![0.0, 0.0, 1.0, 1.0];
        header.ikle = vec![1, 2, 3, 1, 3, 4];
        header.ikle_2d = header.ikle.clone();
        header.ipobo = vec![1, 2, 3, 4];
        header.add_variable_raw("H", "WATER DEPTH", "M");
        header
    }

    fn serialize(header: &SerafinHeader) -> Vec<u8> {
        let mut buf = Vec::new();
        header.write(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_header_size_matches_bytes() {
        let mut header = two_triangles();
        assert_eq!(serialize(&header).len() as u64, header.header_size());

        header.set_date(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap().and_hms_opt(3, 4, 5));
        header.float_type = FloatType::Double;
        assert_eq!(serialize(&header).len() as u64, header.header_size());
    }

    #[test]
    fn test_parse_roundtrip() {
        let catalog = VariableCatalog::new();
        let header = two_triangles();
        let mut cursor = Cursor::new(serialize(&header));
        let parsed = SerafinHeader::parse(&mut cursor, Language::En, &catalog).unwrap();

        assert_eq!(parsed.var_ids, vec!["H".to_string()]);
        assert_eq!(parsed.x, header.x);
        assert_eq!(parsed.ikle, header.ikle);
        assert_eq!(parsed.ipobo, header.ipobo);
        assert_eq!(parsed.title_str(), "unit test");
        assert_eq!(cursor.position(), header.header_size());
    }

    #[test]
    fn test_unknown_name_becomes_id() {
        let catalog = VariableCatalog::new();
        let mut header = two_triangles();
        header.add_variable_raw("?", "MYSTERY", "KG");
        let mut cursor = Cursor::new(serialize(&header));
        let parsed = SerafinHeader::parse(&mut cursor, Language::En, &catalog).unwrap();
        assert_eq!(parsed.var_ids[1], "MYSTERY");
    }

    #[test]
    fn test_language_changes_ids_only() {
        let catalog = VariableCatalog::new();
        let header = two_triangles();
        let mut cursor = Cursor::new(serialize(&header));
        let parsed = SerafinHeader::parse(&mut cursor, Language::Fr, &catalog).unwrap();
        // English name read with the French table is not found
        assert_eq!(parsed.var_ids[0], "WATER DEPTH");
        assert_eq!(parsed.x, header.x);
    }

    #[test]
    fn test_bad_endianness_marker() {
        let catalog = VariableCatalog::new();
        let mut bytes = serialize(&two_triangles());
        bytes[3] = 81;
        let err = SerafinHeader::parse(&mut Cursor::new(bytes), Language::En, &catalog)
            .unwrap_err();
        assert!(matches!(
            err,
            SerafinError::Validation(ValidationError::UnknownEndianness { .. })
        ));
    }

    #[test]
    fn test_little_endian_detected() {
        let catalog = VariableCatalog::new();
        let mut header = two_triangles();
        header.toggle_endianness();
        let bytes = serialize(&header);
        assert_eq!(&bytes[..4], &[80, 0, 0, 0]);
        let parsed =
            SerafinHeader::parse(&mut Cursor::new(bytes), Language::En, &catalog).unwrap();
        assert_eq!(parsed.endianness, Endianness::Little);
        assert_eq!(parsed.y, header.y);
    }

    #[test]
    fn test_quadratic_variables_rejected() {
        let catalog = VariableCatalog::new();
        let mut bytes = serialize(&two_triangles());
        // Second integer of the variable count record: 88 + 4 (marker) + 4
        bytes[88 + 4 + 7] = 2;
        let err = SerafinHeader::parse(&mut Cursor::new(bytes), Language::En, &catalog)
            .unwrap_err();
        assert!(matches!(
            err,
            SerafinError::Validation(ValidationError::QuadraticVariables(2))
        ));
    }

    #[test]
    fn test_origin_applied_and_removed() {
        let catalog = VariableCatalog::new();
        let mut header = two_triangles();
        header.mesh_origin = (1000, 2000);
        header.x = header.x.iter().map(|v| v + 1000.0).collect();
        header.y = header.y.iter().map(|v| v + 2000.0).collect();

        let bytes = serialize(&header);
        let parsed =
            SerafinHeader::parse(&mut Cursor::new(bytes), Language::En, &catalog).unwrap();
        assert_eq!(parsed.mesh_origin, (1000, 2000));
        assert_eq!(parsed.params[2], 1000);
        assert_eq!(parsed.x, header.x);
        assert_eq!(parsed.y, header.y);
    }

    #[test]
    fn test_frame_count_tolerance() {
        let header = two_triangles();
        let hs = header.header_size();
        let fs = header.frame_size();
        assert_eq!(fs, 12 + (8 + 16));
        assert_eq!(header.frame_count(hs).unwrap(), 0);
        assert_eq!(header.frame_count(hs + 3 * fs).unwrap(), 3);
        assert_eq!(header.frame_count(hs + 3 * fs + 1).unwrap(), 3);
        assert!(header.frame_count(hs + 3 * fs + 2).is_err());
        assert!(header.frame_count(hs - 1).is_err());
    }

    #[test]
    fn test_check_dimensions() {
        assert!(check_dimensions(0, 3).is_ok());
        assert!(check_dimensions(3, 6).is_ok());
        assert!(matches!(
            check_dimensions(0, 6),
            Err(ValidationError::NodesPerElement { .. })
        ));
        assert!(matches!(
            check_dimensions(1, 6),
            Err(ValidationError::NotEnoughPlanes(1))
        ));
    }

    #[test]
    fn test_triangles_skip_bad_connectivity() {
        let mut header = two_triangles();
        assert_eq!(header.triangles(), vec![[0, 1, 2], [0, 2, 3]]);

        header.ikle_2d = vec![0, 2, 3, 1, 3, 4, -2, 1, 2, 1, 2, 5];
        assert_eq!(header.triangles(), vec![[0, 2, 3]]);
    }

    #[test]
    fn test_ikle_2d_from_prisms() {
        // Two triangles, three planes: prisms ordered element by element
        let ikle = vec![
            1, 2, 3, 5, 6, 7, // element 0, layer 0
            5, 6, 7, 9, 10, 11, // element 0, layer 1
            1, 3, 4, 5, 7, 8, // element 1, layer 0
            5, 7, 8, 9, 11, 12, // element 1, layer 1
        ];
        assert_eq!(build_ikle_2d(&ikle, 6, 3), vec![1, 2, 3, 1, 3, 4]);
    }

    #[test]
    fn test_single_precision_conversion() {
        let mut header = two_triangles();
        header.float_type = FloatType::Double;
        header.file_format = FloatType::Double.tag();
        let double_size = header.header_size();

        header.to_single_precision();
        assert_eq!(header.float_type, FloatType::Single);
        assert_eq!(&header.format_tag(), b"SERAFIN ");
        assert!(header.header_size() < double_size);

        let before = header.clone();
        header.to_single_precision();
        assert_eq!(header, before);
    }

    #[test]
    fn test_format_tag_follows_precision() {
        let mut header = two_triangles();
        header.float_type = FloatType::Double;
        assert_eq!(&header.format_tag(), b"SERAFIND");
    }

    #[test]
    fn test_display_summary() {
        let header = two_triangles();
        let text = header.to_string();
        assert!(text.contains("2D, 4 nodes, 2 triangles"));
        assert!(text.contains("H (WATER DEPTH)"));
    }
}
