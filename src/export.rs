//! End-to-end "compute variables" job: read a result file, derive the wanted
//! variables frame by frame and write them to a new file.

use std::path::{Path, PathBuf};

use crate::equations::resolver::valid_settling_velocities;
use crate::equations::{
    EquationResolver, FrameCalculator, FrictionLaw, OutputPrecision, PhysicalConstants,
};
use crate::serafin::{Result, SerafinHeader, SerafinReader, SerafinWriter};
use crate::variables::{decode_field, Language, VariableCatalog};

/// Settings of an export job.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportConfig {
    /// Language used to map stored names to IDs and to name new variables.
    pub language: Language,
    /// Friction law for friction velocity and everything derived from it.
    pub friction_law: Option<FrictionLaw>,
    /// Settling velocities (m/s) of the Rouse numbers on offer.
    pub settling_velocities: Vec<f64>,
    /// Narrow the output to single precision.
    pub precision: OutputPrecision,
    pub constants: PhysicalConstants,
    /// Replace an existing output file.
    pub overwrite: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            language: Language::Fr,
            friction_law: None,
            settling_velocities: Vec::new(),
            precision: OutputPrecision::Native,
            constants: PhysicalConstants::default(),
            overwrite: false,
        }
    }
}

impl ExportConfig {
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_friction_law(mut self, law: FrictionLaw) -> Self {
        self.friction_law = Some(law);
        self
    }

    /// Settling velocities for Rouse numbers; invalid values are dropped.
    pub fn with_settling_velocities(mut self, velocities: impl IntoIterator<Item = f64>) -> Self {
        self.settling_velocities = valid_settling_velocities(velocities);
        self
    }

    pub fn with_precision(mut self, precision: OutputPrecision) -> Self {
        self.precision = precision;
        self
    }

    pub fn with_constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Resolver configured for a 2D or 3D file.
    pub fn resolver(&self, is_2d: bool) -> EquationResolver {
        let resolver = EquationResolver::new(is_2d)
            .with_settling_velocities(self.settling_velocities.iter().copied());
        match self.friction_law {
            Some(law) => resolver.with_friction_law(law),
            None => resolver,
        }
    }
}

/// Outcome of a completed export.
#[derive(Clone, Debug, PartialEq)]
pub struct ExportSummary {
    pub output: PathBuf,
    pub nb_frames: usize,
    /// Variables written, in file order
    pub var_ids: Vec<String>,
    /// Number of equations evaluated per frame
    pub nb_equations: usize,
}

/// Computes derived variables from one file into another.
///
/// # Example
///
/// ```no_run
/// use serafin_rs::equations::FrictionLaw;
/// use serafin_rs::export::{ExportConfig, ExportJob};
/// use serafin_rs::variables::VariableCatalog;
/// use std::path::Path;
///
/// let catalog = VariableCatalog::new();
/// let config = ExportConfig::default().with_friction_law(FrictionLaw::Strickler);
/// let summary = ExportJob::new(config, &catalog).run(
///     Path::new("r2d.slf"),
///     Path::new("r2d_tau.slf"),
///     &["H", "TAU"],
/// )?;
/// println!("{} frames written", summary.nb_frames);
/// # Ok::<(), serafin_rs::serafin::SerafinError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ExportJob<'c> {
    config: ExportConfig,
    catalog: &'c VariableCatalog,
}

impl<'c> ExportJob<'c> {
    pub fn new(config: ExportConfig, catalog: &'c VariableCatalog) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Run the job. The output variable table is `wanted_ids` in caller order.
    ///
    /// The plan is resolved before the output file is created, so an
    /// underivable request leaves no file behind.
    pub fn run<S: AsRef<str>>(
        &self,
        input: &Path,
        output: &Path,
        wanted_ids: &[S],
    ) -> Result<ExportSummary> {
        let mut reader = SerafinReader::open(input, self.config.language)?;
        let input_header = reader.read_header(self.catalog)?.clone();
        let nb_frames = reader.nb_frames();

        let resolver = self.config.resolver(input_header.is_2d());
        let plan = resolver.resolve(&input_header.var_ids, wanted_ids)?;
        log::info!(
            "Exporting {} frames from {} to {}: {} equations per frame",
            nb_frames,
            input.display(),
            output.display(),
            plan.len()
        );

        let output_header = self.output_header(&input_header, wanted_ids)?;
        let calculator = FrameCalculator::new(&plan)
            .with_constants(self.config.constants)
            .with_precision(self.config.precision);

        let mut writer = SerafinWriter::create(output, self.config.overwrite)?;
        writer.write_header(&output_header)?;
        let times = reader.get_time()?;
        for (time_index, &time) in times.iter().enumerate() {
            let values = calculator.compute(&mut reader, time_index, wanted_ids)?;
            writer.write_entire_frame(&output_header, time, &values)?;
            log::debug!("Frame {}/{} at t = {}", time_index + 1, nb_frames, time);
        }
        writer.flush()?;

        Ok(ExportSummary {
            output: output.to_path_buf(),
            nb_frames: writer.frames_written(),
            var_ids: output_header.var_ids.clone(),
            nb_equations: plan.len(),
        })
    }

    /// Input header with its variable table replaced by `wanted_ids`.
    ///
    /// Variables present in the input keep their stored name and unit; new
    /// ones come from the catalog.
    fn output_header<S: AsRef<str>>(
        &self,
        input: &SerafinHeader,
        wanted_ids: &[S],
    ) -> Result<SerafinHeader> {
        let mut header = input.clone();
        header.clear_variables();
        for id in wanted_ids {
            let id = id.as_ref();
            match input.var_position(id) {
                Some(pos) => header.add_variable_raw(
                    &input.var_ids[pos],
                    &decode_field(&input.var_names[pos]),
                    &decode_field(&input.var_units[pos]),
                ),
                None => {
                    let variable = self.catalog.lookup(id, input.is_2d())?;
                    header.add_variable(&variable);
                }
            }
        }
        if self.config.precision == OutputPrecision::Single && header.is_double_precision() {
            header.to_single_precision();
        }
        Ok(header)
    }
}
