//! Planning of derived-variable computations.
//!
//! The resolver walks a fixed, hand-ordered rule table. Several variables
//! are mutually derivable (S, B and H), so the derivation chosen for one
//! depends on what is already known; the table order encodes that
//! precedence as data.
//!
//! Resolution runs in three passes:
//!
//! 1. **Availability**: starting from the known IDs, sweep the rules in
//!    order, giving each not-yet-available output the first candidate whose
//!    inputs are available. Sweeps repeat until nothing new is found, so the
//!    discovery order is a valid topological order.
//! 2. **Demand**: from the wanted IDs that are not known, follow the chosen
//!    equations back to known inputs.
//! 3. **Emission**: chosen equations that are demanded, in discovery order.
//!
//! # Example
//!
//! ```
//! use serafin_rs::equations::{EquationResolver, FrictionLaw};
//!
//! let resolver = EquationResolver::new(true).with_friction_law(FrictionLaw::Chezy);
//! let plan = resolver.resolve(&["W", "H", "M"], &["TAU"]).unwrap();
//! assert_eq!(plan.output_ids(), vec!["US", "TAU"]);
//! ```

use std::collections::{HashMap, HashSet};
use std::fmt;

use super::graph::{Equation, EquationGraph};
use super::operator::FrictionLaw;
use crate::serafin::RequestError;
use crate::variables::{canonical_id, is_valid_settling_velocity, parse_rouse_id, rouse_id};

/// How a rule produces its output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Derivation {
    /// Candidates listed by the equation graph for the rule output
    Graph,
    /// Friction velocity through the configured law
    FrictionVelocity,
    /// One Rouse number per settling velocity
    Rouse,
}

/// One entry of the precedence chain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolutionRule {
    /// Output variable ID (`"ROUSE"` stands for the whole Rouse family)
    pub output: &'static str,
    pub derivation: Derivation,
}

const fn graph_rule(output: &'static str) -> ResolutionRule {
    ResolutionRule {
        output,
        derivation: Derivation::Graph,
    }
}

/// Precedence chain for 2D files.
pub const RULES_2D: &[ResolutionRule] = &[
    graph_rule("S"),
    graph_rule("B"),
    graph_rule("H"),
    graph_rule("M"),
    graph_rule("C"),
    graph_rule("F"),
    graph_rule("I"),
    graph_rule("J"),
    graph_rule("Q"),
    ResolutionRule {
        output: "US",
        derivation: Derivation::FrictionVelocity,
    },
    graph_rule("TAU"),
    graph_rule("DMAX"),
    graph_rule("FROTP"),
    ResolutionRule {
        output: "ROUSE",
        derivation: Derivation::Rouse,
    },
    graph_rule("QS"),
    graph_rule("QSBLX"),
    graph_rule("QSBLY"),
    graph_rule("QSSUSPX"),
    graph_rule("QSSUSPY"),
    graph_rule("QSX"),
    graph_rule("QSY"),
];

/// Precedence chain for 3D files.
pub const RULES_3D: &[ResolutionRule] = &[graph_rule("M")];

/// Ordered list of equations to run on every frame.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EquationPlan {
    equations: Vec<Equation>,
}

impl EquationPlan {
    pub fn new(equations: Vec<Equation>) -> Self {
        Self { equations }
    }

    pub fn equations(&self) -> &[Equation] {
        &self.equations
    }

    pub fn len(&self) -> usize {
        self.equations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.equations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Equation> {
        self.equations.iter()
    }

    /// Output IDs in execution order.
    pub fn output_ids(&self) -> Vec<String> {
        self.equations
            .iter()
            .map(|eq| eq.output_id().into_owned())
            .collect()
    }

    /// Variables the plan reads from the file: inputs not produced by an
    /// earlier equation, in order of first use.
    pub fn required_inputs(&self) -> Vec<&'static str> {
        let mut produced: HashSet<String> = HashSet::new();
        let mut required = Vec::new();
        for eq in &self.equations {
            for &input in eq.inputs() {
                if !produced.contains(input) && !required.contains(&input) {
                    required.push(input);
                }
            }
            produced.insert(eq.output_id().into_owned());
        }
        required
    }

    /// Prefix scan: every equation's inputs are known or produced earlier.
    pub fn is_valid_for<S: AsRef<str>>(&self, known: &[S]) -> bool {
        let mut available: HashSet<String> = known
            .iter()
            .map(|id| canonical_id(id.as_ref()).into_owned())
            .collect();
        for eq in &self.equations {
            if !eq.inputs().iter().all(|input| available.contains(*input)) {
                return false;
            }
            available.insert(eq.output_id().into_owned());
        }
        true
    }
}

impl<'a> IntoIterator for &'a EquationPlan {
    type Item = &'a Equation;
    type IntoIter = std::slice::Iter<'a, Equation>;

    fn into_iter(self) -> Self::IntoIter {
        self.equations.iter()
    }
}

impl fmt::Display for EquationPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.equations.is_empty() {
            return f.write_str("(no equation)");
        }
        for (i, eq) in self.equations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{eq}")?;
        }
        Ok(())
    }
}

/// A rule expanded for one resolution: concrete output and candidates.
struct Step {
    output: String,
    candidates: Vec<Equation>,
}

/// Plans the equations producing wanted variables from known ones.
#[derive(Clone, Debug)]
pub struct EquationResolver {
    graph: EquationGraph,
    friction_law: Option<FrictionLaw>,
    settling_velocities: Vec<f64>,
}

/// Keep the settling velocities that name a valid Rouse variable.
pub(crate) fn valid_settling_velocities(velocities: impl IntoIterator<Item = f64>) -> Vec<f64> {
    velocities
        .into_iter()
        .filter(|&ws| {
            let valid = is_valid_settling_velocity(ws);
            if !valid {
                log::warn!("Ignoring settling velocity {} for Rouse numbers", ws);
            }
            valid
        })
        .collect()
}

impl EquationResolver {
    /// Resolver over the 2D or 3D equation graph, with no friction law and
    /// no settling velocity.
    pub fn new(is_2d: bool) -> Self {
        Self {
            graph: EquationGraph::new(is_2d),
            friction_law: None,
            settling_velocities: Vec::new(),
        }
    }

    pub fn with_friction_law(mut self, law: FrictionLaw) -> Self {
        self.friction_law = Some(law);
        self
    }

    /// Settling velocities (m/s) whose Rouse numbers are offered by
    /// [`EquationResolver::available_variables`]. Rouse IDs passed to
    /// [`EquationResolver::resolve`] are always honoured.
    ///
    /// Velocities that cannot name a Rouse variable (not positive, not
    /// finite, or too long for a stored name) are dropped with a warning.
    pub fn with_settling_velocities(mut self, velocities: impl IntoIterator<Item = f64>) -> Self {
        self.settling_velocities = valid_settling_velocities(velocities);
        self
    }

    pub fn friction_law(&self) -> Option<FrictionLaw> {
        self.friction_law
    }

    pub fn is_2d(&self) -> bool {
        self.graph.is_2d()
    }

    /// The precedence chain in use.
    pub fn rules(&self) -> &'static [ResolutionRule] {
        if self.graph.is_2d() {
            RULES_2D
        } else {
            RULES_3D
        }
    }

    fn steps(&self, extra_rouse: &[f64]) -> Vec<Step> {
        let mut steps = Vec::new();
        for rule in self.rules() {
            match rule.derivation {
                Derivation::Graph => steps.push(Step {
                    output: rule.output.to_string(),
                    candidates: self
                        .graph
                        .candidates(rule.output)
                        .iter()
                        .map(|&eq| Equation::Static(eq))
                        .collect(),
                }),
                Derivation::FrictionVelocity => steps.push(Step {
                    output: rule.output.to_string(),
                    candidates: self
                        .friction_law
                        .map(|law| Equation::Static(self.graph.friction_equation(law)))
                        .into_iter()
                        .collect(),
                }),
                Derivation::Rouse => {
                    let mut seen: HashSet<String> = HashSet::new();
                    for &value in self.settling_velocities.iter().chain(extra_rouse) {
                        let output = rouse_id(value);
                        if seen.insert(output.clone()) {
                            steps.push(Step {
                                output,
                                candidates: vec![Equation::rouse(value)],
                            });
                        }
                    }
                }
            }
        }
        steps
    }

    /// Availability pass. Returns the chosen equations in discovery order.
    fn discover(known: &HashSet<String>, steps: &[Step]) -> Vec<Equation> {
        let mut available = known.clone();
        let mut chosen = Vec::new();
        loop {
            let mut progressed = false;
            for step in steps {
                if available.contains(&step.output) {
                    continue;
                }
                let candidate = step
                    .candidates
                    .iter()
                    .find(|eq| eq.inputs().iter().all(|input| available.contains(*input)));
                if let Some(eq) = candidate {
                    available.insert(step.output.clone());
                    chosen.push(*eq);
                    progressed = true;
                }
            }
            if !progressed {
                return chosen;
            }
        }
    }

    fn known_set<S: AsRef<str>>(known: &[S]) -> HashSet<String> {
        known
            .iter()
            .map(|id| canonical_id(id.as_ref()).into_owned())
            .collect()
    }

    /// Every variable available from `known`: the known IDs followed by the
    /// derivable ones in discovery order. Rouse numbers appear for the
    /// configured settling velocities.
    pub fn available_variables<S: AsRef<str>>(&self, known: &[S]) -> Vec<String> {
        let known_set = Self::known_set(known);
        let mut available: Vec<String> = Vec::new();
        for id in known {
            let id = canonical_id(id.as_ref()).into_owned();
            if !available.contains(&id) {
                available.push(id);
            }
        }
        let steps = self.steps(&[]);
        available.extend(
            Self::discover(&known_set, &steps)
                .iter()
                .map(|eq| eq.output_id().into_owned()),
        );
        available
    }

    /// Compute the minimal ordered plan producing `wanted` from `known`.
    ///
    /// Wanted IDs already known need no equation, so a fully known request
    /// yields an empty plan.
    ///
    /// # Errors
    ///
    /// - [`RequestError::InvalidRouseId`] for a malformed Rouse identifier
    /// - [`RequestError::MissingFrictionLaw`] when a wanted ID needs friction
    ///   velocity and no law was configured
    /// - [`RequestError::UnderivableVariable`] for any other wanted ID that
    ///   cannot be derived
    pub fn resolve<K: AsRef<str>, W: AsRef<str>>(
        &self,
        known: &[K],
        wanted: &[W],
    ) -> Result<EquationPlan, RequestError> {
        let known_set = Self::known_set(known);

        let mut wanted_ids: Vec<String> = Vec::with_capacity(wanted.len());
        let mut wanted_rouse: Vec<f64> = Vec::new();
        for id in wanted {
            let id = id.as_ref();
            if self.graph.is_2d() {
                if let Some(value) = parse_rouse_id(id)? {
                    wanted_rouse.push(value);
                }
            }
            wanted_ids.push(canonical_id(id).into_owned());
        }

        let steps = self.steps(&wanted_rouse);
        let chosen = Self::discover(&known_set, &steps);
        let by_output: HashMap<String, Equation> = chosen
            .iter()
            .map(|eq| (eq.output_id().into_owned(), *eq))
            .collect();

        for id in &wanted_ids {
            if !known_set.contains(id) && !by_output.contains_key(id) {
                return Err(self.underivable(&known_set, id));
            }
        }

        let mut needed: HashSet<String> = HashSet::new();
        let mut demand: Vec<String> = wanted_ids
            .into_iter()
            .filter(|id| !known_set.contains(id))
            .collect();
        while let Some(id) = demand.pop() {
            if known_set.contains(&id) || needed.contains(&id) {
                continue;
            }
            if let Some(eq) = by_output.get(&id) {
                demand.extend(eq.inputs().iter().map(|input| input.to_string()));
                needed.insert(id);
            }
        }

        let plan = EquationPlan::new(
            chosen
                .into_iter()
                .filter(|eq| needed.contains(eq.output_id().as_ref()))
                .collect(),
        );
        log::debug!("Resolved equation plan: {plan}");
        Ok(plan)
    }

    fn underivable(&self, known: &HashSet<String>, id: &str) -> RequestError {
        if self.friction_law.is_none() && self.graph.is_2d() {
            let extra: Vec<f64> = parse_rouse_id(id).ok().flatten().into_iter().collect();
            let with_law = self.clone().with_friction_law(FrictionLaw::Chezy);
            let derivable = Self::discover(known, &with_law.steps(&extra))
                .iter()
                .any(|eq| eq.output_id() == id);
            if derivable {
                return RequestError::MissingFrictionLaw(id.to_string());
            }
        }
        RequestError::UnderivableVariable(id.to_string())
    }
}
