//! Static formulas relating catalog variables.
//!
//! Each output variable maps to one or more candidate equations. Two
//! derivations of the same output are listed in order of preference; the
//! resolver takes the first one whose inputs are available.

use std::borrow::Cow;
use std::fmt;

use super::constants::PhysicalConstants;
use super::operator::{rouse_number, FrictionLaw, Operator};
use crate::variables::rouse_id;

/// A formula between catalog variables.
#[derive(Debug, PartialEq)]
pub struct StaticEquation {
    /// Input variable IDs, in kernel argument order
    pub inputs: &'static [&'static str],
    /// Output variable ID
    pub output: &'static str,
    pub operator: Operator,
}

macro_rules! equation {
    ($name:ident: $output:literal = $op:expr; [$($input:literal),+]) => {
        pub const $name: StaticEquation = StaticEquation {
            inputs: &[$($input),+],
            output: $output,
            operator: $op,
        };
    };
}

// 2D hydrodynamics
equation!(FREE_SURFACE: "S" = Operator::Plus; ["H", "B"]);
equation!(BOTTOM_FROM_SURFACE: "B" = Operator::Minus; ["S", "H"]);
equation!(BOTTOM_FROM_LAYERS: "B" = Operator::Plus; ["RB", "HD"]);
equation!(DEPTH: "H" = Operator::Minus; ["S", "B"]);
equation!(SCALAR_VELOCITY: "M" = Operator::Norm2; ["U", "V"]);
equation!(CELERITY: "C" = Operator::Celerity; ["H"]);
equation!(FROUDE: "F" = Operator::Froude; ["M", "H"]);
equation!(FLOWRATE_X: "I" = Operator::Times; ["H", "U"]);
equation!(FLOWRATE_Y: "J" = Operator::Times; ["H", "V"]);
equation!(SCALAR_FLOWRATE: "Q" = Operator::Norm2; ["I", "J"]);

// Friction velocity, one per law
equation!(FRICTION_CHEZY: "US" = Operator::Friction(FrictionLaw::Chezy); ["W", "H", "M"]);
equation!(FRICTION_STRICKLER: "US" = Operator::Friction(FrictionLaw::Strickler); ["W", "H", "M"]);
equation!(FRICTION_MANNING: "US" = Operator::Friction(FrictionLaw::Manning); ["W", "H", "M"]);
equation!(FRICTION_NIKURADSE: "US" = Operator::Friction(FrictionLaw::Nikuradse); ["W", "H", "M"]);

// Sediment
equation!(SHEAR_STRESS: "TAU" = Operator::ShearStress; ["US"]);
equation!(GRAIN_DIAMETER: "DMAX" = Operator::GrainDiameter; ["TAU"]);
equation!(SKIN_FRICTION: "FROTP" = Operator::SkinFriction; ["M", "H", "DMAX"]);
equation!(SOLID_DISCHARGE: "QS" = Operator::Plus; ["QSBL", "QSSUSP"]);
equation!(BEDLOAD_X: "QSBLX" = Operator::ComponentX; ["QSBL", "U", "V"]);
equation!(BEDLOAD_Y: "QSBLY" = Operator::ComponentY; ["QSBL", "U", "V"]);
equation!(SUSPENSION_X: "QSSUSPX" = Operator::ComponentX; ["QSSUSP", "U", "V"]);
equation!(SUSPENSION_Y: "QSSUSPY" = Operator::ComponentY; ["QSSUSP", "U", "V"]);
equation!(SOLID_DISCHARGE_X_SUM: "QSX" = Operator::Plus; ["QSBLX", "QSSUSPX"]);
equation!(SOLID_DISCHARGE_X: "QSX" = Operator::ComponentX; ["QS", "U", "V"]);
equation!(SOLID_DISCHARGE_Y_SUM: "QSY" = Operator::Plus; ["QSBLY", "QSSUSPY"]);
equation!(SOLID_DISCHARGE_Y: "QSY" = Operator::ComponentY; ["QS", "U", "V"]);

// 3D
equation!(SCALAR_VELOCITY_3D: "M" = Operator::Norm3; ["U", "V", "W"]);

/// Kinds of runtime-parametrized equations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParametrizedKind {
    /// Rouse number w_s / (κ u*) for a settling velocity w_s
    Rouse,
}

/// An equation of a plan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Equation {
    /// One of the fixed catalog formulas
    Static(&'static StaticEquation),
    /// A formula whose output ID embeds a numeric parameter
    Parametrized { kind: ParametrizedKind, value: f64 },
}

const ROUSE_INPUTS: &[&str] = &["US"];

impl Equation {
    /// Rouse number for a settling velocity (m/s).
    pub fn rouse(settling_velocity: f64) -> Self {
        Equation::Parametrized {
            kind: ParametrizedKind::Rouse,
            value: settling_velocity,
        }
    }

    pub fn inputs(&self) -> &'static [&'static str] {
        match self {
            Equation::Static(eq) => eq.inputs,
            Equation::Parametrized {
                kind: ParametrizedKind::Rouse,
                ..
            } => ROUSE_INPUTS,
        }
    }

    pub fn output_id(&self) -> Cow<'static, str> {
        match self {
            Equation::Static(eq) => Cow::Borrowed(eq.output),
            Equation::Parametrized {
                kind: ParametrizedKind::Rouse,
                value,
            } => Cow::Owned(rouse_id(*value)),
        }
    }

    /// Evaluate node by node. `inputs` are parallel to [`Equation::inputs`]
    /// and all share the same length.
    pub fn apply(&self, inputs: &[&[f64]], constants: &PhysicalConstants) -> Vec<f64> {
        let nb_nodes = inputs.first().map_or(0, |values| values.len());
        let arg = |i: usize, k: usize| inputs.get(k).map_or(0.0, |values| values[i]);
        let node = |i: usize| -> f64 {
            let args = [arg(i, 0), arg(i, 1), arg(i, 2)];
            match self {
                Equation::Static(eq) => eq.operator.eval(args, constants),
                Equation::Parametrized {
                    kind: ParametrizedKind::Rouse,
                    value,
                } => rouse_number(*value, args[0], constants),
            }
        };

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            (0..nb_nodes).into_par_iter().map(node).collect()
        }

        #[cfg(not(feature = "parallel"))]
        {
            (0..nb_nodes).map(node).collect()
        }
    }
}

impl fmt::Display for Equation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Equation::Static(eq) => match (eq.operator, eq.inputs) {
                (Operator::Plus | Operator::Minus | Operator::Times, [a, b]) => {
                    return write!(f, "{} = {} {} {}", eq.output, a, eq.operator.symbol(), b);
                }
                (op, _) => op.symbol(),
            },
            Equation::Parametrized {
                kind: ParametrizedKind::Rouse,
                ..
            } => "rouse",
        };
        write!(
            f,
            "{} = {}({})",
            self.output_id(),
            symbol,
            self.inputs().join(", ")
        )
    }
}

/// Mapping from output variable ID to candidate equations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EquationGraph {
    is_2d: bool,
}

impl EquationGraph {
    pub fn new(is_2d: bool) -> Self {
        Self { is_2d }
    }

    pub fn is_2d(&self) -> bool {
        self.is_2d
    }

    /// Candidate equations producing `output`, in order of preference.
    ///
    /// Friction velocity is absent: it depends on the chosen law, see
    /// [`EquationGraph::friction_equation`].
    pub fn candidates(&self, output: &str) -> &'static [&'static StaticEquation] {
        if !self.is_2d {
            return match output {
                "M" => &[&SCALAR_VELOCITY_3D],
                _ => &[],
            };
        }
        match output {
            "S" => &[&FREE_SURFACE],
            "B" => &[&BOTTOM_FROM_SURFACE, &BOTTOM_FROM_LAYERS],
            "H" => &[&DEPTH],
            "M" => &[&SCALAR_VELOCITY],
            "C" => &[&CELERITY],
            "F" => &[&FROUDE],
            "I" => &[&FLOWRATE_X],
            "J" => &[&FLOWRATE_Y],
            "Q" => &[&SCALAR_FLOWRATE],
            "TAU" => &[&SHEAR_STRESS],
            "DMAX" => &[&GRAIN_DIAMETER],
            "FROTP" => &[&SKIN_FRICTION],
            "QS" => &[&SOLID_DISCHARGE],
            "QSBLX" => &[&BEDLOAD_X],
            "QSBLY" => &[&BEDLOAD_Y],
            "QSSUSPX" => &[&SUSPENSION_X],
            "QSSUSPY" => &[&SUSPENSION_Y],
            "QSX" => &[&SOLID_DISCHARGE_X_SUM, &SOLID_DISCHARGE_X],
            "QSY" => &[&SOLID_DISCHARGE_Y_SUM, &SOLID_DISCHARGE_Y],
            _ => &[],
        }
    }

    /// Friction velocity equation for a law (2D only).
    pub fn friction_equation(&self, law: FrictionLaw) -> &'static StaticEquation {
        match law {
            FrictionLaw::Chezy => &FRICTION_CHEZY,
            FrictionLaw::Strickler => &FRICTION_STRICKLER,
            FrictionLaw::Manning => &FRICTION_MANNING,
            FrictionLaw::Nikuradse => &FRICTION_NIKURADSE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variables::VariableCatalog;

    const TOL: f64 = 1e-12;

    const ALL_2D: &[&StaticEquation] = &[
        &FREE_SURFACE,
        &BOTTOM_FROM_SURFACE,
        &BOTTOM_FROM_LAYERS,
        &DEPTH,
        &SCALAR_VELOCITY,
        &CELERITY,
        &FROUDE,
        &FLOWRATE_X,
        &FLOWRATE_Y,
        &SCALAR_FLOWRATE,
        &FRICTION_CHEZY,
        &FRICTION_STRICKLER,
        &FRICTION_MANNING,
        &FRICTION_NIKURADSE,
        &SHEAR_STRESS,
        &GRAIN_DIAMETER,
        &SKIN_FRICTION,
        &SOLID_DISCHARGE,
        &BEDLOAD_X,
        &BEDLOAD_Y,
        &SUSPENSION_X,
        &SUSPENSION_Y,
        &SOLID_DISCHARGE_X_SUM,
        &SOLID_DISCHARGE_X,
        &SOLID_DISCHARGE_Y_SUM,
        &SOLID_DISCHARGE_Y,
    ];

    #[test]
    fn test_equations_use_catalog_variables() {
        let catalog = VariableCatalog::new();
        for eq in ALL_2D {
            assert!(catalog.contains(eq.output, true), "{}", eq.output);
            for input in eq.inputs {
                assert!(catalog.contains(input, true), "{input}");
            }
            assert_eq!(eq.inputs.len(), eq.operator.arity(), "{}", eq.output);
        }
        for input in SCALAR_VELOCITY_3D.inputs {
            assert!(catalog.contains(input, false));
        }
    }

    #[test]
    fn test_candidates_match_outputs() {
        let graph = EquationGraph::new(true);
        for eq in ALL_2D {
            if eq.output == "US" {
                continue;
            }
            let candidates = graph.candidates(eq.output);
            assert!(candidates.iter().any(|c| c == eq));
            assert!(candidates.iter().all(|c| c.output == eq.output));
        }
        assert_eq!(graph.candidates("B").len(), 2);
        assert_eq!(graph.friction_equation(FrictionLaw::Manning).output, "US");

        let graph_3d = EquationGraph::new(false);
        assert_eq!(graph_3d.candidates("M")[0].inputs, &["U", "V", "W"]);
        assert!(graph_3d.candidates("H").is_empty());
    }

    #[test]
    fn test_apply_static() {
        let c = PhysicalConstants::default();
        let h = [1.0, 2.0];
        let b = [-3.0, 0.5];
        let s = Equation::Static(&FREE_SURFACE).apply(&[&h, &b], &c);
        assert_eq!(s, vec![-2.0, 2.5]);
    }

    #[test]
    fn test_rouse_equation() {
        let c = PhysicalConstants::default();
        let eq = Equation::rouse(0.02);
        assert_eq!(eq.output_id(), "ROUSE 0.02");
        assert_eq!(eq.inputs(), &["US"]);
        let values = eq.apply(&[&[0.1, 0.0]], &c);
        assert!((values[0] - 0.5).abs() < TOL);
        assert_eq!(values[1], 0.0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Equation::Static(&DEPTH).to_string(), "H = S - B");
        assert_eq!(Equation::Static(&SCALAR_VELOCITY).to_string(), "M = norm(U, V)");
        assert_eq!(Equation::rouse(0.5).to_string(), "ROUSE 0.5 = rouse(US)");
    }
}
