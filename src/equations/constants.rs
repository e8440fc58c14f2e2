//! Physical constants used by the derived-variable formulas.

/// Gravitational acceleration (m/s²).
pub const GRAVITY: f64 = 9.81;

/// Water density (kg/m³).
pub const RHO_WATER: f64 = 1000.0;

/// Von Kármán constant.
pub const KARMAN: f64 = 0.4;

/// Strickler coefficient of a grain of diameter d: K_s = 21.1 / d^{1/6}.
pub const STRICKLER_GRAIN_FACTOR: f64 = 21.1;

/// Nikuradse log-law factor: u* = κ M / ln(11.036 H / k_s).
pub const NIKURADSE_FACTOR: f64 = 11.036;

/// Constants threaded through every equation kernel.
///
/// # Example
///
/// ```
/// use serafin_rs::equations::PhysicalConstants;
///
/// let seawater = PhysicalConstants::default().with_rho_water(1025.0);
/// assert_eq!(seawater.gravity, 9.81);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalConstants {
    /// Gravitational acceleration (m/s²)
    pub gravity: f64,
    /// Water density (kg/m³)
    pub rho_water: f64,
    /// Von Kármán constant
    pub karman: f64,
    /// Numerator of the grain Strickler coefficient
    pub strickler_grain_factor: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            rho_water: RHO_WATER,
            karman: KARMAN,
            strickler_grain_factor: STRICKLER_GRAIN_FACTOR,
        }
    }
}

impl PhysicalConstants {
    pub fn with_gravity(mut self, gravity: f64) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_rho_water(mut self, rho_water: f64) -> Self {
        self.rho_water = rho_water;
        self
    }

    pub fn with_karman(mut self, karman: f64) -> Self {
        self.karman = karman;
        self
    }

    pub fn with_strickler_grain_factor(mut self, factor: f64) -> Self {
        self.strickler_grain_factor = factor;
        self
    }

    /// √g, used by every friction law but Nikuradse.
    #[inline]
    pub fn sqrt_gravity(&self) -> f64 {
        self.gravity.sqrt()
    }
}
