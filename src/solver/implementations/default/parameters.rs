use super::*;
use crate::algebra::*;
use std::collections::{HashMap, HashSet};

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Dimensions of a declared parameter.
///
/// Values of `Matrix` parameters are supplied in column major order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParameterShape {
    Scalar,
    Vector(usize),
    Matrix(usize, usize),
}

impl ParameterShape {
    /// number of values held by a parameter of this shape
    pub fn numel(&self) -> usize {
        match *self {
            ParameterShape::Scalar => 1,
            ParameterShape::Vector(n) => n,
            ParameterShape::Matrix(r, c) => r * c,
        }
    }
}

/// A named parameter and the problem data entries it writes.
///
/// Element `k` of the parameter writes `coefficients[k] * value[k]` to
/// entry `targets[k]` of `field`.   For matrix fields the targets are
/// positions in the nonzero value array of the matrix, and for `P` that
/// is the upper triangular part.

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
pub struct Parameter<T> {
    pub name: String,
    pub shape: ParameterShape,
    pub field: DataField,
    pub targets: Vec<usize>,
    pub coefficients: Option<Vec<T>>,
}

impl<T> Parameter<T>
where
    T: FloatT,
{
    pub fn new(
        name: impl Into<String>,
        shape: ParameterShape,
        field: DataField,
        targets: Vec<usize>,
    ) -> Self {
        Self {
            name: name.into(),
            shape,
            field,
            targets,
            coefficients: None,
        }
    }

    /// scale each element by a fixed coefficient before it is written
    pub fn with_coefficients(mut self, coefficients: Vec<T>) -> Self {
        self.coefficients = Some(coefficients);
        self
    }

    pub(crate) fn coefficient(&self, k: usize) -> T {
        self.coefficients.as_ref().map_or(T::one(), |c| c[k])
    }
}

/// The collection of parameters declared for a solver.

#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(
        bound = "T: Serialize + DeserializeOwned + Clone",
        from = "Vec<Parameter<T>>",
        into = "Vec<Parameter<T>>"
    )
)]
pub struct ParameterSchema<T> {
    params: Vec<Parameter<T>>,
    lookup: HashMap<String, usize>,
}

impl<T> From<Vec<Parameter<T>>> for ParameterSchema<T> {
    fn from(params: Vec<Parameter<T>>) -> Self {
        let lookup = params
            .iter()
            .enumerate()
            .map(|(i, p)| (p.name.clone(), i))
            .collect();
        Self { params, lookup }
    }
}

impl<T> From<ParameterSchema<T>> for Vec<Parameter<T>> {
    fn from(schema: ParameterSchema<T>) -> Self {
        schema.params
    }
}

impl<T> ParameterSchema<T>
where
    T: FloatT,
{
    pub fn new(params: Vec<Parameter<T>>) -> Self {
        Self::from(params)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter<T>> {
        self.params.iter()
    }

    /// find a parameter by name
    pub fn get(&self, name: &str) -> Option<&Parameter<T>> {
        self.lookup.get(name).map(|&i| &self.params[i])
    }

    /// Checks the declarations against the problem data.   Each
    /// parameter must have one in-range target per element, and
    /// no two elements may write the same data entry.
    pub(crate) fn validate(&self, data: &DefaultProblemData<T>) -> Result<(), SolverError> {
        if self.lookup.len() != self.params.len() {
            let mut seen = HashSet::new();
            for p in self.params.iter() {
                if !seen.insert(p.name.as_str()) {
                    return Err(config_error(&p.name, "is declared twice"));
                }
            }
        }

        let mut written = HashSet::new();

        for p in self.params.iter() {
            let numel = p.shape.numel();
            if p.targets.len() != numel {
                return Err(config_error(&p.name, "has the wrong number of targets"));
            }
            if p.coefficients.as_ref().is_some_and(|c| c.len() != numel) {
                return Err(config_error(
                    &p.name,
                    "has the wrong number of coefficients",
                ));
            }

            let len = data.field_len(p.field);
            for &idx in p.targets.iter() {
                if idx >= len {
                    return Err(config_error(&p.name, "targets an entry out of range"));
                }
                if !written.insert((p.field, idx)) {
                    return Err(config_error(
                        &p.name,
                        "targets an entry written by another parameter",
                    ));
                }
            }
        }
        Ok(())
    }
}

fn config_error(name: &str, problem: &str) -> SolverError {
    SolverError::Configuration(format!("parameter \"{name}\" {problem}"))
}

// ---------------
// updating of parameter values
// ---------------

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    /// Sets the value of a declared parameter.   Scalars are passed as a
    /// single element slice and matrices in column major order.
    pub fn update_parameter(&mut self, name: &str, values: &[T]) -> Result<(), SolverError> {
        self.update_parameters(&[(name, values)])
    }

    /// Sets the values of several declared parameters.   Every update
    /// is checked before any is applied, so on error the problem data
    /// is unchanged.   Any KKT refresh is deferred to the next solve.
    pub fn update_parameters(&mut self, updates: &[(&str, &[T])]) -> Result<(), SolverError> {
        for &(name, values) in updates {
            let param = self
                .data
                .parameters
                .get(name)
                .ok_or_else(|| SolverError::UnknownParameter(name.to_string()))?;

            let expected = param.shape.numel();
            if values.len() != expected {
                return Err(SolverError::ParameterShape {
                    expected,
                    found: values.len(),
                });
            }
        }

        self.data.apply_parameters(updates);
        Ok(())
    }

    /// The parameters declared for this solver.
    pub fn parameters(&self) -> &ParameterSchema<T> {
        &self.data.parameters
    }
}
