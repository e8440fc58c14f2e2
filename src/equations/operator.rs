//! Per-node kernels of the derived-variable formulas.
//!
//! Every operator maps up to three input values at one node to one output
//! value. Array evaluation lives in [`super::graph::Equation::apply`].

use std::fmt;
use std::str::FromStr;

use super::constants::{PhysicalConstants, NIKURADSE_FACTOR};

/// Law relating roughness, depth and velocity magnitude to friction velocity.
///
/// All laws evaluate to 0 where the depth or the roughness coefficient is not
/// strictly positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrictionLaw {
    /// u* = √g M / C
    Chezy,
    /// u* = √g M / (K H^{1/6})
    Strickler,
    /// u* = √g n M / H^{1/6}
    Manning,
    /// u* = κ M / ln(11.036 H / k_s)
    Nikuradse,
}

impl FrictionLaw {
    pub const ALL: [FrictionLaw; 4] = [
        FrictionLaw::Chezy,
        FrictionLaw::Strickler,
        FrictionLaw::Manning,
        FrictionLaw::Nikuradse,
    ];

    /// Friction velocity at one node.
    ///
    /// # Arguments
    /// * `coefficient` - Roughness coefficient (W) in the law's own units
    /// * `depth` - Water depth H (m)
    /// * `speed` - Scalar velocity M (m/s)
    #[inline]
    pub fn friction_velocity(
        self,
        coefficient: f64,
        depth: f64,
        speed: f64,
        constants: &PhysicalConstants,
    ) -> f64 {
        if depth <= 0.0 || coefficient <= 0.0 {
            return 0.0;
        }
        match self {
            FrictionLaw::Chezy => constants.sqrt_gravity() * speed / coefficient,
            FrictionLaw::Strickler => {
                constants.sqrt_gravity() * speed / (coefficient * depth.powf(1.0 / 6.0))
            }
            FrictionLaw::Manning => {
                constants.sqrt_gravity() * coefficient * speed / depth.powf(1.0 / 6.0)
            }
            FrictionLaw::Nikuradse => {
                let log = (NIKURADSE_FACTOR * depth / coefficient).ln();
                if log <= 0.0 {
                    0.0
                } else {
                    constants.karman * speed / log
                }
            }
        }
    }
}

impl FromStr for FrictionLaw {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chezy" | "chézy" => Ok(FrictionLaw::Chezy),
            "strickler" => Ok(FrictionLaw::Strickler),
            "manning" => Ok(FrictionLaw::Manning),
            "nikuradse" => Ok(FrictionLaw::Nikuradse),
            other => Err(format!("Unknown friction law: {other}")),
        }
    }
}

impl fmt::Display for FrictionLaw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrictionLaw::Chezy => "Chezy",
            FrictionLaw::Strickler => "Strickler",
            FrictionLaw::Manning => "Manning",
            FrictionLaw::Nikuradse => "Nikuradse",
        };
        f.write_str(name)
    }
}

/// Operator tag of a static equation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    /// a + b
    Plus,
    /// a - b
    Minus,
    /// a · b
    Times,
    /// √(a² + b²)
    Norm2,
    /// √(a² + b² + c²)
    Norm3,
    /// √(g H)
    Celerity,
    /// M / √(g H), from (M, H)
    Froude,
    /// Friction velocity from (W, H, M)
    Friction(FrictionLaw),
    /// ρ u*², from (US)
    ShearStress,
    /// Maximum grain diameter (mm) from bed shear stress
    GrainDiameter,
    /// Skin friction stress from (M, H, DMAX)
    SkinFriction,
    /// Signed X component of a magnitude along a direction, from (s, U, V)
    ComponentX,
    /// Signed Y component of a magnitude along a direction, from (s, U, V)
    ComponentY,
}

impl Operator {
    /// Number of inputs the kernel reads.
    pub fn arity(self) -> usize {
        match self {
            Operator::Celerity | Operator::ShearStress | Operator::GrainDiameter => 1,
            Operator::Plus
            | Operator::Minus
            | Operator::Times
            | Operator::Norm2
            | Operator::Froude => 2,
            Operator::Norm3
            | Operator::Friction(_)
            | Operator::SkinFriction
            | Operator::ComponentX
            | Operator::ComponentY => 3,
        }
    }

    /// Evaluate at one node. Unused trailing arguments are ignored.
    #[inline]
    pub fn eval(self, a: [f64; 3], constants: &PhysicalConstants) -> f64 {
        match self {
            Operator::Plus => a[0] + a[1],
            Operator::Minus => a[0] - a[1],
            Operator::Times => a[0] * a[1],
            Operator::Norm2 => a[0].hypot(a[1]),
            Operator::Norm3 => (a[0] * a[0] + a[1] * a[1] + a[2] * a[2]).sqrt(),
            Operator::Celerity => (constants.gravity * a[0]).max(0.0).sqrt(),
            Operator::Froude => {
                let celerity = (constants.gravity * a[1]).max(0.0).sqrt();
                if celerity > 0.0 {
                    a[0] / celerity
                } else {
                    0.0
                }
            }
            Operator::Friction(law) => law.friction_velocity(a[0], a[1], a[2], constants),
            Operator::ShearStress => constants.rho_water * a[0] * a[0],
            Operator::GrainDiameter => grain_diameter(a[0]),
            Operator::SkinFriction => skin_friction(a[0], a[1], a[2], constants),
            Operator::ComponentX => component(a[0], a[1], a[2]),
            Operator::ComponentY => component(a[0], a[2], a[1]),
        }
    }

    /// Short symbol used when printing equations.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Times => "*",
            Operator::Norm2 | Operator::Norm3 => "norm",
            Operator::Celerity => "celerity",
            Operator::Froude => "froude",
            Operator::Friction(_) => "friction",
            Operator::ShearStress => "shear_stress",
            Operator::GrainDiameter => "grain_diameter",
            Operator::SkinFriction => "skin_friction",
            Operator::ComponentX => "component_x",
            Operator::ComponentY => "component_y",
        }
    }
}

/// Maximum mobile grain diameter (mm) for a bed shear stress (Pa).
#[inline]
pub fn grain_diameter(tau: f64) -> f64 {
    if tau > 0.34 {
        1.4593 * tau.powf(0.979)
    } else if tau > 0.1 {
        1.2912 * tau * tau + 1.3572 * tau - 0.1154
    } else {
        0.9055 * tau.max(0.0).powf(1.3178)
    }
}

/// Skin friction stress ρ g (M / (K_s H^{1/6}))² with K_s = 21.1 / d^{1/6},
/// d being DMAX converted to metres.
#[inline]
pub fn skin_friction(speed: f64, depth: f64, dmax_mm: f64, constants: &PhysicalConstants) -> f64 {
    let diameter = dmax_mm / 1000.0;
    if depth <= 0.0 || diameter <= 0.0 {
        return 0.0;
    }
    let grain_strickler = constants.strickler_grain_factor / diameter.powf(1.0 / 6.0);
    let ratio = speed / (grain_strickler * depth.powf(1.0 / 6.0));
    constants.rho_water * constants.gravity * ratio * ratio
}

/// Rouse number w_s / (κ u*), zero where u* vanishes.
#[inline]
pub fn rouse_number(settling_velocity: f64, friction_velocity: f64, constants: &PhysicalConstants) -> f64 {
    if friction_velocity == 0.0 {
        0.0
    } else {
        settling_velocity / (constants.karman * friction_velocity)
    }
}

/// Signed component of `magnitude` along the unit vector of (along, across),
/// zero where the direction vector vanishes.
#[inline]
fn component(magnitude: f64, along: f64, across: f64) -> f64 {
    let norm = along.hypot(across);
    if norm == 0.0 {
        0.0
    } else {
        magnitude * along / norm
    }
}
