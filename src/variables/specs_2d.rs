//! Variable table for 2D (depth-averaged) result files.
//!
//! Columns: `(id, name_fr, name_en, unit)`. Names and units are the exact
//! strings written by the solver, each at most 16 bytes.

pub(super) const SPECS_2D: &[(&str, &str, &str, &str)] = &[
    ("U", "VITESSE U", "VELOCITY U", "M/S"),
    ("V", "VITESSE V", "VELOCITY V", "M/S"),
    ("C", "CELERITE", "CELERITY", "M/S"),
    ("H", "HAUTEUR D'EAU", "WATER DEPTH", "M"),
    ("S", "SURFACE LIBRE", "FREE SURFACE", "M"),
    ("B", "FOND", "BOTTOM", "M"),
    ("F", "FROUDE", "FROUDE NUMBER", ""),
    ("Q", "DEBIT SCALAIRE", "SCALAR FLOWRATE", "M2/S"),
    ("T", "TRACEUR", "TRACER", ""),
    ("K", "ENERGIE TURBUL.", "TURBULENT ENERG.", "JOULE/KG"),
    ("E", "DISSIPATION", "DISSIPATION", "WATT/KG"),
    ("D", "VISCOSITE TURB.", "VISCOSITY", "M2/S"),
    ("I", "DEBIT SUIVANT X", "FLOWRATE ALONG X", "M2/S"),
    ("J", "DEBIT SUIVANT Y", "FLOWRATE ALONG Y", "M2/S"),
    ("M", "VITESSE SCALAIRE", "SCALAR VELOCITY", "M/S"),
    ("X", "VENT X", "WIND ALONG X", "M/S"),
    ("Y", "VENT Y", "WIND ALONG Y", "M/S"),
    ("P", "PRESSION ATMOS.", "AIR PRESSURE", "PASCAL"),
    ("W", "FROTTEMENT", "BOTTOM FRICTION", ""),
    ("A", "DERIVE EN X", "DRIFT ALONG X", "M"),
    ("G", "DERIVE EN Y", "DRIFT ALONG Y", "M"),
    ("L", "NBRE DE COURANT", "COURANT NUMBER", ""),
    ("MAXZ", "COTE MAXIMUM", "HIGH WATER MARK", "M"),
    ("TMXZ", "TEMPS COTE MAXI", "HIGH WATER TIME", "S"),
    ("MAXV", "VITESSE MAXIMUM", "HIGHEST VELOCITY", "M/S"),
    ("TMXV", "T VITESSE MAXI", "TIME OF HIGH VEL", "S"),
    ("US", "VITESSE DE FROT.", "FRICTION VEL.", "M/S"),
    ("TAU", "CONTRAINTE", "BED SHEAR STRESS", "PASCAL"),
    ("DMAX", "DIAMETRE", "DIAMETER", "MM"),
    ("FROTP", "FROT. PEAU", "SKIN FRICTION", "PASCAL"),
    ("QS", "DEBIT SOLIDE", "SOLID DISCH", "M2/S"),
    ("QSX", "DEBIT SOLIDE X", "SOLID DISCH X", "M2/S"),
    ("QSY", "DEBIT SOLIDE Y", "SOLID DISCH Y", "M2/S"),
    ("QSBL", "QS CHARRIAGE", "QS BEDLOAD", "M2/S"),
    ("QSBLX", "QS CHARRIAGE X", "QS BEDLOAD X", "M2/S"),
    ("QSBLY", "QS CHARRIAGE Y", "QS BEDLOAD Y", "M2/S"),
    ("QSSUSP", "QS SUSPENSION", "QS SUSPENSION", "M2/S"),
    ("QSSUSPX", "QS SUSPENSION X", "QS SUSPENSION X", "M2/S"),
    ("QSSUSPY", "QS SUSPENSION Y", "QS SUSPENSION Y", "M2/S"),
    ("EV", "EVOLUTION", "EVOLUTION", "M"),
    ("RB", "FOND RIGIDE", "RIGID BED", "M"),
    ("HD", "EPAISSEUR DU LIT", "BED THICKNESS", "M"),
];
