//! Variable table for 3D (layered prism) result files.

pub(super) const SPECS_3D: &[(&str, &str, &str, &str)] = &[
    ("Z", "COTE Z", "ELEVATION Z", "M"),
    ("U", "VITESSE U", "VELOCITY U", "M/S"),
    ("V", "VITESSE V", "VELOCITY V", "M/S"),
    ("W", "VITESSE W", "VELOCITY W", "M/S"),
    ("NUX", "NUX POUR VITESSE", "NUX FOR VELOCITY", "M2/S"),
    ("NUY", "NUY POUR VITESSE", "NUY FOR VELOCITY", "M2/S"),
    ("NUZ", "NUZ POUR VITESSE", "NUZ FOR VELOCITY", "M2/S"),
    ("M", "VITESSE SCALAIRE", "SCALAR VELOCITY", "M/S"),
    ("TEMP", "TEMPERATURE", "TEMPERATURE", "DEG C"),
    ("SALI", "SALINITE", "SALINITY", "G/L"),
];
