//! Execution of an equation plan on one frame.

use std::collections::HashMap;
use std::io::{Read, Seek};

use super::constants::PhysicalConstants;
use super::resolver::EquationPlan;
use crate::serafin::{RequestError, Result, SerafinReader};
use crate::variables::canonical_id;

/// Precision of the computed arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputPrecision {
    /// Keep full f64 values
    #[default]
    Native,
    /// Round every value through f32, as a single precision file stores it
    Single,
}

/// Runs a resolved plan against frames of a file.
///
/// Each plan input is read from the stream at most once per frame and kept
/// in a scratch map until the outputs are gathered.
///
/// # Example
///
/// ```no_run
/// use serafin_rs::equations::{EquationResolver, FrameCalculator};
/// use serafin_rs::serafin::SerafinReader;
/// use serafin_rs::variables::{Language, VariableCatalog};
/// use std::path::Path;
///
/// let mut reader = SerafinReader::open(Path::new("r2d.slf"), Language::Fr)?;
/// let known = reader.read_header(&VariableCatalog::new())?.var_ids.clone();
/// let plan = EquationResolver::new(true).resolve(&known, &["M"])?;
/// let speed = FrameCalculator::new(&plan).compute(&mut reader, 0, &["M"])?;
/// # Ok::<(), serafin_rs::serafin::SerafinError>(())
/// ```
#[derive(Clone, Debug)]
pub struct FrameCalculator<'p> {
    plan: &'p EquationPlan,
    constants: PhysicalConstants,
    precision: OutputPrecision,
}

impl<'p> FrameCalculator<'p> {
    pub fn new(plan: &'p EquationPlan) -> Self {
        Self {
            plan,
            constants: PhysicalConstants::default(),
            precision: OutputPrecision::Native,
        }
    }

    pub fn with_constants(mut self, constants: PhysicalConstants) -> Self {
        self.constants = constants;
        self
    }

    pub fn with_precision(mut self, precision: OutputPrecision) -> Self {
        self.precision = precision;
        self
    }

    pub fn plan(&self) -> &EquationPlan {
        self.plan
    }

    /// Compute `output_ids` at frame `time_index`, in caller order.
    ///
    /// Outputs already stored in the file are read rather than recomputed.
    pub fn compute<R: Read + Seek, S: AsRef<str>>(
        &self,
        reader: &mut SerafinReader<R>,
        time_index: usize,
        output_ids: &[S],
    ) -> Result<Vec<Vec<f64>>> {
        self.run(|id| reader.read_var_in_frame(time_index, id), output_ids)
    }

    /// Compute `output_ids` from arrays already in memory, keyed by ID.
    pub fn compute_from_arrays<S: AsRef<str>>(
        &self,
        arrays: &HashMap<String, Vec<f64>>,
        output_ids: &[S],
    ) -> Result<Vec<Vec<f64>>> {
        self.run(
            |id| {
                arrays
                    .get(id)
                    .cloned()
                    .ok_or_else(|| RequestError::UnknownVariable(id.to_string()).into())
            },
            output_ids,
        )
    }

    fn run<F, S>(&self, mut load: F, output_ids: &[S]) -> Result<Vec<Vec<f64>>>
    where
        F: FnMut(&str) -> Result<Vec<f64>>,
        S: AsRef<str>,
    {
        let mut scratch: HashMap<String, Vec<f64>> = HashMap::new();

        for eq in self.plan {
            for &input in eq.inputs() {
                if !scratch.contains_key(input) {
                    let values = load(input)?;
                    scratch.insert(input.to_string(), values);
                }
            }
            let values = {
                let inputs: Vec<&[f64]> = eq
                    .inputs()
                    .iter()
                    .filter_map(|input| scratch.get(*input).map(Vec::as_slice))
                    .collect();
                eq.apply(&inputs, &self.constants)
            };
            scratch.insert(eq.output_id().into_owned(), values);
        }

        let mut outputs = Vec::with_capacity(output_ids.len());
        for id in output_ids {
            let id = canonical_id(id.as_ref());
            let values = match scratch.get(id.as_ref()) {
                Some(values) => values.clone(),
                None => load(&id)?,
            };
            outputs.push(self.round(values));
        }
        Ok(outputs)
    }

    fn round(&self, values: Vec<f64>) -> Vec<f64> {
        match self.precision {
            OutputPrecision::Native => values,
            OutputPrecision::Single => values.into_iter().map(|v| v as f32 as f64).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equations::{EquationResolver, FrictionLaw};
    use crate::serafin::SerafinError;

    const TOL: f64 = 1e-12;

    fn arrays(pairs: &[(&str, Vec<f64>)]) -> HashMap<String, Vec<f64>> {
        pairs
            .iter()
            .map(|(id, values)| (id.to_string(), values.clone()))
            .collect()
    }

    #[test]
    fn test_depth_and_speed() {
        let known = ["S", "B", "U", "V"];
        let plan = EquationResolver::new(true)
            .resolve(&known, &["H", "M"])
            .unwrap();
        let data = arrays(&[
            ("S", vec![2.0, 3.0]),
            ("B", vec![0.5, 1.0]),
            ("U", vec![3.0, 0.0]),
            ("V", vec![4.0, 1.0]),
        ]);
        let out = FrameCalculator::new(&plan)
            .compute_from_arrays(&data, &["M", "U", "H"])
            .unwrap();
        assert_eq!(out[1], vec![3.0, 0.0]);
        assert!((out[0][0] - 5.0).abs() < TOL);
        assert!((out[0][1] - 1.0).abs() < TOL);
        assert_eq!(out[2], vec![1.5, 2.0]);
    }

    #[test]
    fn test_inputs_loaded_once() {
        let plan = EquationResolver::new(true)
            .resolve(&["H", "U", "V"], &["I", "J", "Q"])
            .unwrap();
        let data = arrays(&[("H", vec![2.0]), ("U", vec![1.0]), ("V", vec![-1.0])]);
        let calculator = FrameCalculator::new(&plan);
        let mut loads: Vec<String> = Vec::new();
        let out = calculator
            .run(
                |id| {
                    loads.push(id.to_string());
                    Ok(data[id].clone())
                },
                &["Q"],
            )
            .unwrap();
        loads.sort();
        assert_eq!(loads, vec!["H", "U", "V"]);
        assert!((out[0][0] - 8.0f64.sqrt()).abs() < TOL);
    }

    #[test]
    fn test_shear_stress_chain() {
        let plan = EquationResolver::new(true)
            .with_friction_law(FrictionLaw::Chezy)
            .resolve(&["W", "H", "M"], &["TAU"])
            .unwrap();
        let data = arrays(&[
            ("W", vec![50.0, 0.0]),
            ("H", vec![1.0, 1.0]),
            ("M", vec![1.0, 1.0]),
        ]);
        let out = FrameCalculator::new(&plan)
            .compute_from_arrays(&data, &["TAU"])
            .unwrap();
        let us = 9.81f64.sqrt() / 50.0;
        assert!((out[0][0] - 1000.0 * us * us).abs() < 1e-9);
        // Zero roughness coefficient
        assert_eq!(out[0][1], 0.0);
    }

    #[test]
    fn test_rouse_and_components() {
        let plan = EquationResolver::new(true)
            .resolve(&["US", "QS", "U", "V"], &["ROUSE 0.01", "QSX", "QSY"])
            .unwrap();
        let data = arrays(&[
            ("US", vec![0.05, 0.0]),
            ("QS", vec![10.0, 10.0]),
            ("U", vec![3.0, 0.0]),
            ("V", vec![4.0, 0.0]),
        ]);
        let out = FrameCalculator::new(&plan)
            .compute_from_arrays(&data, &["ROUSE 0.010", "QSX", "QSY"])
            .unwrap();
        assert!((out[0][0] - 0.5).abs() < TOL);
        assert_eq!(out[0][1], 0.0);
        assert!((out[1][0] - 6.0).abs() < TOL);
        assert!((out[2][0] - 8.0).abs() < TOL);
        assert_eq!(out[1][1], 0.0);
        assert_eq!(out[2][1], 0.0);
    }

    #[test]
    fn test_single_precision_output() {
        let plan = EquationPlan::default();
        let data = arrays(&[("H", vec![0.1])]);
        let out = FrameCalculator::new(&plan)
            .with_precision(OutputPrecision::Single)
            .compute_from_arrays(&data, &["H"])
            .unwrap();
        assert_eq!(out[0][0], 0.1f32 as f64);
    }

    #[test]
    fn test_missing_output() {
        let plan = EquationPlan::default();
        let data = arrays(&[("H", vec![0.1])]);
        let err = FrameCalculator::new(&plan)
            .compute_from_arrays(&data, &["M"])
            .unwrap_err();
        assert!(matches!(
            err,
            SerafinError::Request(RequestError::UnknownVariable(_))
        ));
    }

    #[test]
    fn test_custom_constants() {
        let plan = EquationResolver::new(true).resolve(&["H"], &["C"]).unwrap();
        let data = arrays(&[("H", vec![2.5])]);
        let out = FrameCalculator::new(&plan)
            .with_constants(PhysicalConstants::default().with_gravity(10.0))
            .compute_from_arrays(&data, &["C"])
            .unwrap();
        assert!((out[0][0] - 5.0).abs() < TOL);
    }
}
