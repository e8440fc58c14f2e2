//! Sequential and random-access reader for Serafin files.
//!
//! # Example
//!
//! ```no_run
//! use serafin_rs::serafin::SerafinReader;
//! use serafin_rs::variables::{Language, VariableCatalog};
//! use std::path::Path;
//!
//! let catalog = VariableCatalog::new();
//! let mut reader = SerafinReader::open(Path::new("r2d.slf"), Language::Fr)?;
//! reader.read_header(&catalog)?;
//! let times = reader.get_time()?;
//! let depth = reader.read_var_in_frame(times.len() - 1, "H")?;
//! # Ok::<(), serafin_rs::serafin::SerafinError>(())
//! ```

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use super::error::{RequestError, Result};
use super::header::SerafinHeader;
use super::record::decode_floats;
use crate::variables::{Language, VariableCatalog};

/// Reader over a seekable byte stream.
///
/// Every read seeks the single underlying cursor, so a reader must not be
/// shared between threads without external locking.
pub struct SerafinReader<R: Read + Seek> {
    stream: R,
    language: Language,
    file_size: u64,
    header: Option<SerafinHeader>,
    nb_frames: usize,
}

impl SerafinReader<BufReader<File>> {
    /// Open a file for reading.
    pub fn open(path: &Path, language: Language) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file), language)
    }
}

impl<R: Read + Seek> SerafinReader<R> {
    /// Wrap a stream. The stream length is measured immediately.
    pub fn new(mut stream: R, language: Language) -> Result<Self> {
        let file_size = stream.seek(SeekFrom::End(0))?;
        stream.seek(SeekFrom::Start(0))?;
        Ok(Self {
            stream,
            language,
            file_size,
            header: None,
            nb_frames: 0,
        })
    }

    /// Parse the header and count frames. May only be called once.
    pub fn read_header(&mut self, catalog: &VariableCatalog) -> Result<&SerafinHeader> {
        if self.header.is_some() {
            return Err(RequestError::HeaderAlreadyRead.into());
        }
        self.stream.seek(SeekFrom::Start(0))?;
        let header = SerafinHeader::parse(&mut self.stream, self.language, catalog)?;
        self.nb_frames = header.frame_count(self.file_size)?;
        log::debug!(
            "Serafin stream: {} bytes, {} frames of {} bytes",
            self.file_size,
            self.nb_frames,
            header.frame_size()
        );
        Ok(self.header.insert(header))
    }

    /// The parsed header.
    pub fn header(&self) -> Result<&SerafinHeader> {
        self.header
            .as_ref()
            .ok_or_else(|| RequestError::HeaderNotRead.into())
    }

    /// Consume the reader, keeping the parsed header.
    pub fn into_header(self) -> Result<SerafinHeader> {
        self.header.ok_or_else(|| RequestError::HeaderNotRead.into())
    }

    /// Number of frames (0 before the header is read).
    pub fn nb_frames(&self) -> usize {
        self.nb_frames
    }

    /// Total stream length in bytes.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Language used for name/ID mapping.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Times of all frames, reading only each frame's time record.
    pub fn get_time(&mut self) -> Result<Vec<f64>> {
        let header = self.header.as_ref().ok_or(RequestError::HeaderNotRead)?;
        let float_type = header.float_type;
        let endian = header.endianness;
        let size = float_type.size() as usize;

        let mut times = Vec::with_capacity(self.nb_frames);
        let mut buf = vec![0u8; size];
        for index in 0..self.nb_frames {
            self.stream
                .seek(SeekFrom::Start(header.frame_offset(index) + 4))?;
            self.stream.read_exact(&mut buf)?;
            times.push(decode_floats(&buf, endian, float_type)[0]);
        }
        Ok(times)
    }

    fn check_time_index(&self, time_index: usize) -> Result<()> {
        if time_index >= self.nb_frames {
            return Err(RequestError::TimeIndexOutOfRange {
                index: time_index,
                nb_frames: self.nb_frames,
            }
            .into());
        }
        Ok(())
    }

    /// Values of one variable at one frame, `nb_nodes` long.
    pub fn read_var_in_frame(&mut self, time_index: usize, var_id: &str) -> Result<Vec<f64>> {
        let header = self.header.as_ref().ok_or(RequestError::HeaderNotRead)?;
        let position = header.require_var(var_id)?;
        self.check_time_index(time_index)?;

        let float_type = header.float_type;
        let endian = header.endianness;
        let mut payload = vec![0u8; header.nb_nodes * float_type.size() as usize];
        self.stream
            .seek(SeekFrom::Start(header.var_offset(time_index, position)))?;
        self.stream.read_exact(&mut payload)?;
        Ok(decode_floats(&payload, endian, float_type))
    }

    /// Values of several variables at one frame, in the requested order.
    pub fn read_vars_in_frame(
        &mut self,
        time_index: usize,
        var_ids: &[&str],
    ) -> Result<Vec<Vec<f64>>> {
        var_ids
            .iter()
            .map(|id| self.read_var_in_frame(time_index, id))
            .collect()
    }

    /// 3D values reshaped as `nb_planes` rows of `nb_nodes_2d` values.
    pub fn read_var_in_frame_as_3d(
        &mut self,
        time_index: usize,
        var_id: &str,
    ) -> Result<Vec<Vec<f64>>> {
        let header = self.header()?;
        if header.is_2d() {
            return Err(RequestError::NotThreeDimensional.into());
        }
        let n2 = header.nb_nodes_2d;
        let values = self.read_var_in_frame(time_index, var_id)?;
        Ok(values.chunks_exact(n2).map(|plane| plane.to_vec()).collect())
    }

    /// 3D values on one plane, `layer` counted from 1 (bottom).
    pub fn read_var_in_frame_at_layer(
        &mut self,
        time_index: usize,
        var_id: &str,
        layer: usize,
    ) -> Result<Vec<f64>> {
        let header = self.header()?;
        if header.is_2d() {
            return Err(RequestError::NotThreeDimensional.into());
        }
        let nb_planes = header.nb_planes;
        let n2 = header.nb_nodes_2d;
        if layer < 1 || layer > nb_planes {
            return Err(RequestError::LayerOutOfRange { layer, nb_planes }.into());
        }
        let values = self.read_var_in_frame(time_index, var_id)?;
        Ok(values[(layer - 1) * n2..layer * n2].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::serafin::{FloatType, SerafinError, SerafinWriter};
    use std::io::Cursor;

    fn grid_header(language: Language) -> SerafinHeader {
        let points = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        let triangles = [[0, 1, 2], [0, 2, 3]];
        SerafinHeader::from_triangulation(&points, &triangles, language, FloatType::Single)
    }

    fn write_file(header: &SerafinHeader, frames: &[(f64, Vec<Vec<f64>>)]) -> Vec<u8> {
        let mut writer = SerafinWriter::new(Cursor::new(Vec::new()));
        writer.write_header(header).unwrap();
        for (time, values) in frames {
            writer.write_entire_frame(header, *time, values).unwrap();
        }
        writer.into_inner().unwrap().into_inner()
    }

    fn reader_for(bytes: Vec<u8>) -> SerafinReader<Cursor<Vec<u8>>> {
        let mut reader = SerafinReader::new(Cursor::new(bytes), Language::En).unwrap();
        reader.read_header(&VariableCatalog::new()).unwrap();
        reader
    }

    #[test]
    fn test_frames_and_times() {
        let catalog = VariableCatalog::new();
        let mut header = grid_header(Language::En);
        header.add_variable_from_id(&catalog, "H").unwrap();
        header.add_variable_from_id(&catalog, "U").unwrap();
        let frames = vec![
            (0.0, vec![vec![1.0, 2.0, 3.0, 4.0], vec![0.0; 4]]),
            (10.0, vec![vec![1.5, 2.5, 3.5, 4.5], vec![0.25; 4]]),
        ];
        let mut reader = reader_for(write_file(&header, &frames));

        assert_eq!(reader.nb_frames(), 2);
        assert_eq!(reader.get_time().unwrap(), vec![0.0, 10.0]);
        assert_eq!(
            reader.read_var_in_frame(1, "H").unwrap(),
            vec![1.5, 2.5, 3.5, 4.5]
        );
        assert_eq!(reader.read_var_in_frame(1, "U").unwrap(), vec![0.25; 4]);
        // Random access back to an earlier frame
        assert_eq!(reader.read_var_in_frame(0, "H").unwrap()[3], 4.0);

        let both = reader.read_vars_in_frame(0, &["U", "H"]).unwrap();
        assert_eq!(both[1], vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_request_errors_leave_reader_usable() {
        let catalog = VariableCatalog::new();
        let mut header = grid_header(Language::En);
        header.add_variable_from_id(&catalog, "H").unwrap();
        let frames = vec![(0.0, vec![vec![1.0; 4]])];
        let mut reader = reader_for(write_file(&header, &frames));

        assert!(matches!(
            reader.read_var_in_frame(0, "TAU"),
            Err(SerafinError::Request(RequestError::UnknownVariable(_)))
        ));
        assert!(matches!(
            reader.read_var_in_frame(3, "H"),
            Err(SerafinError::Request(RequestError::TimeIndexOutOfRange { .. }))
        ));
        assert!(matches!(
            reader.read_var_in_frame_as_3d(0, "H"),
            Err(SerafinError::Request(RequestError::NotThreeDimensional))
        ));
        assert!(matches!(
            reader.read_header(&catalog),
            Err(SerafinError::Request(RequestError::HeaderAlreadyRead))
        ));
        assert_eq!(reader.read_var_in_frame(0, "H").unwrap(), vec![1.0; 4]);
    }

    #[test]
    fn test_frame_access_before_header() {
        let header = grid_header(Language::En);
        let bytes = write_file(&header, &[]);
        let mut reader = SerafinReader::new(Cursor::new(bytes), Language::En).unwrap();
        assert!(matches!(
            reader.get_time(),
            Err(SerafinError::Request(RequestError::HeaderNotRead))
        ));
        assert!(reader.header().is_err());
    }

    #[test]
    fn test_3d_layers() {
        let catalog = VariableCatalog::new();
        let mut header = grid_header(Language::En).copy_as_3d(3).unwrap();
        header.add_variable_from_id(&catalog, "Z").unwrap();
        let z: Vec<f64> = (0..12).map(|i| (i / 4) as f64).collect();
        let mut reader = reader_for(write_file(&header, &[(0.0, vec![z])]));

        let planes = reader.read_var_in_frame_as_3d(0, "Z").unwrap();
        assert_eq!(planes.len(), 3);
        assert_eq!(planes[2], vec![2.0; 4]);

        assert_eq!(
            reader.read_var_in_frame_at_layer(0, "Z", 2).unwrap(),
            vec![1.0; 4]
        );
        assert!(matches!(
            reader.read_var_in_frame_at_layer(0, "Z", 0),
            Err(SerafinError::Request(RequestError::LayerOutOfRange { .. }))
        ));
        assert!(matches!(
            reader.read_var_in_frame_at_layer(0, "Z", 4),
            Err(SerafinError::Request(RequestError::LayerOutOfRange { .. }))
        ));
    }

    #[test]
    fn test_trailing_byte_tolerated() {
        let catalog = VariableCatalog::new();
        let mut header = grid_header(Language::En);
        header.add_variable_from_id(&catalog, "H").unwrap();
        let mut bytes = write_file(&header, &[(0.0, vec![vec![1.0; 4]])]);
        bytes.push(b'\n');
        let reader = reader_for(bytes.clone());
        assert_eq!(reader.nb_frames(), 1);

        bytes.push(b'\n');
        let mut reader = SerafinReader::new(Cursor::new(bytes), Language::En).unwrap();
        assert!(matches!(
            reader.read_header(&catalog),
            Err(SerafinError::Validation(_))
        ));
    }
}
