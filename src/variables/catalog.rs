//! Bilingual catalog of physical variables.
//!
//! Result files store each variable as a 16-byte name and a 16-byte unit, in
//! French or English depending on how the solver was configured. The catalog
//! maps those stored names to short identifiers (`"H"`, `"US"`, ...) and back.
//!
//! 2D and 3D files use disjoint tables: `"W"` is the bottom friction
//! coefficient in 2D but the vertical velocity in 3D.
//!
//! # Example
//!
//! ```
//! use serafin_rs::variables::{Language, VariableCatalog};
//!
//! let catalog = VariableCatalog::new();
//! assert_eq!(catalog.id_from_name("WATER DEPTH", Language::En, true), Some("H"));
//! assert_eq!(catalog.get("H", true).unwrap().name(Language::Fr), "HAUTEUR D'EAU");
//! ```

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::specs_2d::SPECS_2D;
use super::specs_3d::SPECS_3D;
use crate::serafin::RequestError;

/// Length of a stored variable name or unit, in bytes.
pub const NAME_LENGTH: usize = 16;

/// Identifier prefix of Rouse number variables, followed by the settling velocity.
pub const ROUSE_PREFIX: &str = "ROUSE ";

/// Language of the variable names stored in a file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Language {
    /// French names (`"HAUTEUR D'EAU"`)
    #[default]
    Fr,
    /// English names (`"WATER DEPTH"`)
    En,
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fr" => Ok(Language::Fr),
            "en" => Ok(Language::En),
            other => Err(format!("unknown language '{}', expected 'fr' or 'en'", other)),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::Fr => write!(f, "fr"),
            Language::En => write!(f, "en"),
        }
    }
}

/// A physical variable: identifier, bilingual name and unit.
///
/// Identity is the ID; two variables with the same ID are the same variable.
#[derive(Clone, Debug)]
pub struct Variable {
    /// Short identifier, e.g. `"H"`
    pub id: String,
    /// French stored name
    pub name_fr: String,
    /// English stored name
    pub name_en: String,
    /// Unit string (may be empty)
    pub unit: String,
    /// Position in the catalog table
    pub order: usize,
}

impl Variable {
    /// Stored name in the given language.
    pub fn name(&self, language: Language) -> &str {
        match language {
            Language::Fr => &self.name_fr,
            Language::En => &self.name_en,
        }
    }

    /// Name padded (or truncated) to the 16-byte on-disk field.
    pub fn stored_name(&self, language: Language) -> [u8; NAME_LENGTH] {
        pad_field(self.name(language))
    }

    /// Unit padded (or truncated) to the 16-byte on-disk field.
    pub fn stored_unit(&self) -> [u8; NAME_LENGTH] {
        pad_field(&self.unit)
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Variable {}

/// Pad a string with spaces to the 16-byte on-disk field, truncating if longer.
pub fn pad_field(text: &str) -> [u8; NAME_LENGTH] {
    let mut field = [b' '; NAME_LENGTH];
    for (dst, src) in field.iter_mut().zip(text.bytes()) {
        *dst = src;
    }
    field
}

/// Decode a 16-byte on-disk field, dropping trailing padding.
pub fn decode_field(field: &[u8]) -> String {
    String::from_utf8_lossy(field)
        .trim_end_matches([' ', '\0'])
        .to_string()
}

/// Identifier of the Rouse number variable for a settling velocity (m/s).
pub fn rouse_id(settling_velocity: f64) -> String {
    format!("{}{}", ROUSE_PREFIX, settling_velocity)
}

/// Extract the settling velocity from a Rouse identifier.
///
/// Returns `Ok(None)` if `id` is not a Rouse identifier, and a request error
/// if it carries the prefix but no usable value.
pub fn parse_rouse_id(id: &str) -> Result<Option<f64>, RequestError> {
    let Some(value) = id.strip_prefix(ROUSE_PREFIX) else {
        return Ok(None);
    };
    match value.trim().parse::<f64>() {
        Ok(v) if is_valid_settling_velocity(v) => Ok(Some(v)),
        _ => Err(RequestError::InvalidRouseId(id.to_string())),
    }
}

/// Whether a settling velocity can name a Rouse variable: finite, positive,
/// and short enough for its ID to fit the 16-byte stored name.
pub fn is_valid_settling_velocity(settling_velocity: f64) -> bool {
    settling_velocity.is_finite()
        && settling_velocity > 0.0
        && rouse_id(settling_velocity).len() <= NAME_LENGTH
}

/// Canonical form of a variable ID: Rouse identifiers are rewritten with the
/// shortest representation of their settling velocity, other IDs are kept.
pub fn canonical_id(id: &str) -> Cow<'_, str> {
    match parse_rouse_id(id) {
        Ok(Some(value)) => Cow::Owned(rouse_id(value)),
        _ => Cow::Borrowed(id),
    }
}

/// One dimension's table plus its lookup indices.
#[derive(Clone, Debug)]
struct VariableTable {
    variables: Vec<Variable>,
    by_id: HashMap<String, usize>,
    by_name_fr: HashMap<String, usize>,
    by_name_en: HashMap<String, usize>,
}

impl VariableTable {
    fn from_specs(specs: &[(&str, &str, &str, &str)]) -> Self {
        let variables: Vec<Variable> = specs
            .iter()
            .enumerate()
            .map(|(order, &(id, fr, en, unit))| Variable {
                id: id.to_string(),
                name_fr: fr.to_string(),
                name_en: en.to_string(),
                unit: unit.to_string(),
                order,
            })
            .collect();

        let mut by_id = HashMap::with_capacity(variables.len());
        let mut by_name_fr = HashMap::with_capacity(variables.len());
        let mut by_name_en = HashMap::with_capacity(variables.len());
        for (i, var) in variables.iter().enumerate() {
            by_id.insert(var.id.clone(), i);
            by_name_fr.insert(var.name_fr.clone(), i);
            by_name_en.insert(var.name_en.clone(), i);
        }

        Self {
            variables,
            by_id,
            by_name_fr,
            by_name_en,
        }
    }
}

/// Immutable bilingual variable catalog for 2D and 3D files.
///
/// Build once at start-up and pass by reference to the header parser, the
/// export job and anything else that needs name/ID lookups.
#[derive(Clone, Debug)]
pub struct VariableCatalog {
    table_2d: VariableTable,
    table_3d: VariableTable,
}

impl Default for VariableCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl VariableCatalog {
    /// Load the built-in 2D and 3D tables.
    pub fn new() -> Self {
        Self {
            table_2d: VariableTable::from_specs(SPECS_2D),
            table_3d: VariableTable::from_specs(SPECS_3D),
        }
    }

    fn table(&self, is_2d: bool) -> &VariableTable {
        if is_2d {
            &self.table_2d
        } else {
            &self.table_3d
        }
    }

    /// All variables of one dimension, in catalog order.
    pub fn variables(&self, is_2d: bool) -> &[Variable] {
        &self.table(is_2d).variables
    }

    /// Look up a variable by ID.
    pub fn get(&self, id: &str, is_2d: bool) -> Option<&Variable> {
        let table = self.table(is_2d);
        table.by_id.get(id).map(|&i| &table.variables[i])
    }

    /// Whether `id` is a catalog variable of the given dimension.
    pub fn contains(&self, id: &str, is_2d: bool) -> bool {
        self.table(is_2d).by_id.contains_key(id)
    }

    /// Map a stored name (without padding) to its ID.
    pub fn id_from_name(&self, name: &str, language: Language, is_2d: bool) -> Option<&str> {
        let table = self.table(is_2d);
        let index = match language {
            Language::Fr => table.by_name_fr.get(name),
            Language::En => table.by_name_en.get(name),
        };
        index.map(|&i| table.variables[i].id.as_str())
    }

    /// Build the variable describing the Rouse number for a settling velocity.
    ///
    /// Rouse variables are not catalog entries; one is synthesised per
    /// requested velocity and its ID doubles as its stored name.
    pub fn rouse_variable(&self, settling_velocity: f64) -> Variable {
        let id = rouse_id(settling_velocity);
        Variable {
            name_fr: id.clone(),
            name_en: id.clone(),
            unit: String::new(),
            order: self.table_2d.variables.len(),
            id,
        }
    }

    /// Resolve an ID to a variable, including synthesised Rouse variables.
    pub fn lookup(&self, id: &str, is_2d: bool) -> Result<Variable, RequestError> {
        if let Some(var) = self.get(id, is_2d) {
            return Ok(var.clone());
        }
        if is_2d {
            if let Some(ws) = parse_rouse_id(id)? {
                return Ok(self.rouse_variable(ws));
            }
        }
        Err(RequestError::UnknownVariable(id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!("fr".parse::<Language>().unwrap(), Language::Fr);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::En);
        assert!("de".parse::<Language>().is_err());
        assert_eq!(Language::En.to_string(), "en");
    }

    #[test]
    fn test_names_fit_on_disk() {
        let catalog = VariableCatalog::new();
        for is_2d in [true, false] {
            for var in catalog.variables(is_2d) {
                assert!(var.name_fr.len() <= NAME_LENGTH, "{}", var.name_fr);
                assert!(var.name_en.len() <= NAME_LENGTH, "{}", var.name_en);
                assert!(var.unit.len() <= NAME_LENGTH, "{}", var.unit);
            }
        }
    }

    #[test]
    fn test_ids_unique_per_dimension() {
        let catalog = VariableCatalog::new();
        for is_2d in [true, false] {
            let vars = catalog.variables(is_2d);
            let table = catalog.table(is_2d);
            assert_eq!(table.by_id.len(), vars.len());
            assert_eq!(table.by_name_fr.len(), vars.len());
        }
    }

    #[test]
    fn test_name_lookup_both_languages() {
        let catalog = VariableCatalog::new();
        assert_eq!(
            catalog.id_from_name("HAUTEUR D'EAU", Language::Fr, true),
            Some("H")
        );
        assert_eq!(
            catalog.id_from_name("BED SHEAR STRESS", Language::En, true),
            Some("TAU")
        );
        assert_eq!(catalog.id_from_name("WATER DEPTH", Language::Fr, true), None);
        assert_eq!(catalog.id_from_name("COTE Z", Language::Fr, false), Some("Z"));
        assert_eq!(catalog.id_from_name("COTE Z", Language::Fr, true), None);
    }

    #[test]
    fn test_disjoint_meaning_of_w() {
        let catalog = VariableCatalog::new();
        assert_eq!(catalog.get("W", true).unwrap().name_en, "BOTTOM FRICTION");
        assert_eq!(catalog.get("W", false).unwrap().name_en, "VELOCITY W");
        assert!(!catalog.contains("Z", true));
    }

    #[test]
    fn test_pad_and_decode_field() {
        let field = pad_field("FOND");
        assert_eq!(&field[..4], b"FOND");
        assert!(field[4..].iter().all(|&b| b == b' '));
        assert_eq!(decode_field(&field), "FOND");

        let long = pad_field("A NAME LONGER THAN SIXTEEN");
        assert_eq!(&long, b"A NAME LONGER TH");
    }

    #[test]
    fn test_rouse_ids() {
        assert_eq!(rouse_id(0.005), "ROUSE 0.005");
        assert_eq!(parse_rouse_id("ROUSE 0.005").unwrap(), Some(0.005));
        assert_eq!(parse_rouse_id("US").unwrap(), None);
        assert!(matches!(
            parse_rouse_id("ROUSE fast"),
            Err(RequestError::InvalidRouseId(_))
        ));
        assert!(parse_rouse_id("ROUSE -1").is_err());
    }

    #[test]
    fn test_rouse_id_must_fit_stored_name() {
        // 16 bytes fits, 17 would be cut on disk into another velocity
        assert_eq!(rouse_id(0.00012345).len(), NAME_LENGTH);
        assert_eq!(parse_rouse_id("ROUSE 0.00012345").unwrap(), Some(0.00012345));
        assert!(matches!(
            parse_rouse_id("ROUSE 0.000123456"),
            Err(RequestError::InvalidRouseId(_))
        ));
        assert!(matches!(
            VariableCatalog::new().lookup("ROUSE 0.000123456", true),
            Err(RequestError::InvalidRouseId(_))
        ));

        assert!(is_valid_settling_velocity(0.01));
        assert!(!is_valid_settling_velocity(0.000123456));
        assert!(!is_valid_settling_velocity(0.0));
        assert!(!is_valid_settling_velocity(-0.1));
        assert!(!is_valid_settling_velocity(f64::NAN));
    }

    #[test]
    fn test_canonical_id() {
        assert_eq!(canonical_id("ROUSE 0.0200"), "ROUSE 0.02");
        assert_eq!(canonical_id("H"), "H");
        assert_eq!(canonical_id("ROUSE x"), "ROUSE x");
    }

    #[test]
    fn test_lookup_synthesises_rouse() {
        let catalog = VariableCatalog::new();
        let var = catalog.lookup("ROUSE 0.01", true).unwrap();
        assert_eq!(var.id, "ROUSE 0.01");
        assert_eq!(var.unit, "");
        assert!(matches!(
            catalog.lookup("NOPE", true),
            Err(RequestError::UnknownVariable(_))
        ));
        assert!(catalog.lookup("ROUSE 0.01", false).is_err());
    }
}
