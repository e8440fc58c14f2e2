//! Serafin file writer.

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use super::error::{RequestError, Result, SerafinError};
use super::header::SerafinHeader;
use super::record::{encode_floats, write_record};

/// Writes a header followed by frames, in order.
pub struct SerafinWriter<W: Write> {
    stream: W,
    last_time: Option<f64>,
    frames_written: usize,
}

impl SerafinWriter<BufWriter<File>> {
    /// Create an output file.
    ///
    /// Without `overwrite`, an existing file is left untouched and
    /// [`RequestError::FileExists`] is returned.
    pub fn create(path: &Path, overwrite: bool) -> Result<Self> {
        let file = if overwrite {
            File::create(path)?
        } else {
            OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(path)
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => RequestError::FileExists(path.to_path_buf()).into(),
                    _ => SerafinError::from(e),
                })?
        };
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> SerafinWriter<W> {
    pub fn new(stream: W) -> Self {
        Self {
            stream,
            last_time: None,
            frames_written: 0,
        }
    }

    /// Write the header records.
    pub fn write_header(&mut self, header: &SerafinHeader) -> Result<()> {
        header.write(&mut self.stream)?;
        log::debug!(
            "Wrote Serafin header: {} variables, {} nodes, {} bytes",
            header.nb_var(),
            header.nb_nodes,
            header.header_size()
        );
        Ok(())
    }

    /// Write one frame: the time record then one record per variable.
    ///
    /// `values` must hold `header.nb_var()` slices of `header.nb_nodes`
    /// values each, in header order. Times must not decrease.
    pub fn write_entire_frame<V: AsRef<[f64]>>(
        &mut self,
        header: &SerafinHeader,
        time: f64,
        values: &[V],
    ) -> Result<()> {
        let shape_ok = values.len() == header.nb_var()
            && values.iter().all(|v| v.as_ref().len() == header.nb_nodes);
        if !shape_ok {
            let lengths: Vec<usize> = values.iter().map(|v| v.as_ref().len()).collect();
            return Err(RequestError::FrameShape {
                expected_vars: header.nb_var(),
                expected_nodes: header.nb_nodes,
                found: format!("{} x {:?}", values.len(), lengths),
            }
            .into());
        }
        if let Some(previous) = self.last_time {
            if time < previous {
                return Err(RequestError::NonMonotonicTime { previous, time }.into());
            }
        }

        let endian = header.endianness;
        let float_type = header.float_type;
        write_record(
            &mut self.stream,
            endian,
            &encode_floats(&[time], endian, float_type),
        )?;
        for var_values in values {
            write_record(
                &mut self.stream,
                endian,
                &encode_floats(var_values.as_ref(), endian, float_type),
            )?;
        }

        self.last_time = Some(time);
        self.frames_written += 1;
        Ok(())
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stream.flush()?;
        Ok(())
    }

    /// Flush and return the underlying stream.
    pub fn into_inner(mut self) -> Result<W> {
        self.stream.flush()?;
        Ok(self.stream)
    }
}
