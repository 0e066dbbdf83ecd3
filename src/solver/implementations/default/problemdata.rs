#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use crate::solver::core::{
    cones::{CompositeCone, Cone},
    traits::ProblemData,
};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies one of the problem data fields `P`, `q`, `A` or `b`.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum DataField {
    P,
    q,
    A,
    b,
}

impl std::fmt::Display for DataField {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ---------------
// Data type for default problem format
// ---------------

/// Standard-form solver type implementing the [`ProblemData`](crate::solver::core::traits::ProblemData) trait
///
/// All data is held in equilibrated form.   The sparsity patterns of
/// `P` and `A` are fixed at construction and only values may change.

pub struct DefaultProblemData<T> {
    pub P: CscMatrix<T>,
    pub q: Vec<T>,
    pub A: CscMatrix<T>,
    pub b: Vec<T>,
    pub n: usize,
    pub m: usize,
    pub equilibration: DefaultEquilibrationData<T>,

    // unscaled norm of q
    pub normq: T,

    // rows of orthant cones whose bound is infinite
    pub(crate) unbounded: Vec<bool>,
    orthant: Vec<bool>,
    infbound: T,

    // bumped on every change to P or A
    pub(crate) matrix_epoch: u64,

    pub parameters: ParameterSchema<T>,
}

impl<T> DefaultProblemData<T>
where
    T: FloatT,
{
    pub fn new(
        P: &CscMatrix<T>,
        q: &[T],
        A: &CscMatrix<T>,
        b: &[T],
        cones: &CompositeCone<T>,
        infbound: T,
    ) -> Self {
        // dimension checks will have already been
        // performed during problem setup, so skip here

        let P = if P.is_triu() { P.clone() } else { P.to_triu() };
        let q = q.to_vec();
        let A = A.clone();

        // cap entries in b at the infinite bound
        let mut b = b.to_vec();
        b.scalarop(|x| x.max(-infbound).min(infbound));

        let (m, n) = (A.nrows(), A.ncols());

        let mut orthant = vec![false; m];
        cones.orthant_rows(&mut orthant);

        let unbounded = orthant
            .iter()
            .zip(b.iter())
            .map(|(&o, &bi)| o && bi >= infbound)
            .collect();

        let equilibration = DefaultEquilibrationData::<T>::new(n, m);
        let normq = q.norm_inf();

        Self {
            P,
            q,
            A,
            b,
            n,
            m,
            equilibration,
            normq,
            unbounded,
            orthant,
            infbound,
            matrix_epoch: 0,
            parameters: ParameterSchema::default(),
        }
    }

    // number of updatable entries in a field
    pub(crate) fn field_len(&self, field: DataField) -> usize {
        match field {
            DataField::P => self.P.nnz(),
            DataField::q => self.n,
            DataField::A => self.A.nnz(),
            DataField::b => self.m,
        }
    }

    // Writes an unscaled value to entry `idx` of a field, reapplying
    // the equilibration.   The index must be in range.
    pub(crate) fn set_value(&mut self, field: DataField, idx: usize, value: T) {
        let equil = &self.equilibration;
        let (d, e, c) = (&equil.d, &equil.e, equil.c);

        match field {
            DataField::P => {
                let (row, col) = self.P.index_to_coord(idx);
                self.P.nzval[idx] = c * d[row] * d[col] * value;
            }
            DataField::A => {
                let (row, col) = self.A.index_to_coord(idx);
                self.A.nzval[idx] = e[row] * d[col] * value;
            }
            DataField::q => {
                self.q[idx] = c * d[idx] * value;
            }
            DataField::b => {
                let value = value.max(-self.infbound).min(self.infbound);
                self.b[idx] = e[idx] * value;
                self.unbounded[idx] = self.orthant[idx] && value >= self.infbound;
            }
        }
    }

    // Marks the data stale after a batch of `set_value` calls.
    pub(crate) fn finish_update(&mut self, field: DataField) {
        match field {
            DataField::P | DataField::A => {
                self.matrix_epoch += 1;
            }
            DataField::q => {
                let dinv = &self.equilibration.dinv;
                self.normq = self.q.norm_inf_scaled(dinv) / self.equilibration.c;
            }
            DataField::b => {}
        }
    }

    // Writes all values of a batch of declared parameters.  Names
    // and lengths are checked by the caller.  Each touched field is
    // finished once for the whole batch.
    pub(crate) fn apply_parameters(&mut self, updates: &[(&str, &[T])]) {
        // detach the schema so that data can be written while reading it
        let params = std::mem::take(&mut self.parameters);
        let mut touched = [false; 4];

        for &(name, values) in updates {
            if let Some(param) = params.get(name) {
                for (k, (&idx, &v)) in param.targets.iter().zip(values).enumerate() {
                    self.set_value(param.field, idx, param.coefficient(k) * v);
                }
                touched[field_slot(param.field)] = true;
            }
        }

        for field in [DataField::P, DataField::q, DataField::A, DataField::b] {
            if touched[field_slot(field)] {
                self.finish_update(field);
            }
        }

        self.parameters = params;
    }

    /// Unscaled copies of `(P, q, A, b)` as originally posed.
    pub fn unscaled(&self) -> (CscMatrix<T>, Vec<T>, CscMatrix<T>, Vec<T>) {
        let equil = &self.equilibration;
        let (dinv, einv) = (&equil.dinv, &equil.einv);
        let cinv = T::recip(equil.c);

        let mut P = self.P.clone();
        P.lrscale(dinv, dinv);
        P.scale(cinv);

        let mut q = self.q.clone();
        q.hadamard(dinv).scale(cinv);

        let mut A = self.A.clone();
        A.lrscale(einv, dinv);

        let mut b = self.b.clone();
        b.hadamard(einv);

        (P, q, A, b)
    }
}

impl<T> ProblemData<T> for DefaultProblemData<T>
where
    T: FloatT,
{
    type C = CompositeCone<T>;
    type SE = DefaultSettings<T>;

    fn equilibrate(&mut self, cones: &CompositeCone<T>, settings: &DefaultSettings<T>) {
        let data = self;
        let equil = &mut data.equilibration;

        // if equilibration is disabled, just return.  Note that
        // the default equilibration structure initializes with
        // identity scaling already.
        if !settings.equilibrate_enable {
            return;
        }

        // references to scaling matrices from workspace
        let (d, e) = (&mut equil.d, &mut equil.e);

        // use the inverse scalings as work vectors
        let dwork = &mut equil.dinv;
        let ework = &mut equil.einv;

        // references to problem data
        // note that P may be triu, but it shouldn't matter
        let (P, A, q, b) = (&mut data.P, &mut data.A, &mut data.q, &mut data.b);

        let scale_min = settings.equilibrate_min_scaling;
        let scale_max = settings.equilibrate_max_scaling;

        // perform scaling operations for a fixed number of steps
        for _ in 0..settings.equilibrate_max_iter {
            kkt_col_norms(P, A, dwork, ework);

            dwork.scalarop(|x| limit_scaling(x, scale_min, scale_max));
            ework.scalarop(|x| limit_scaling(x, scale_min, scale_max));

            dwork.rsqrt();
            ework.rsqrt();

            // the accumulated scalings d and e stay within bounds
            limit_cumulative_scaling(dwork, d, scale_min, scale_max);
            limit_cumulative_scaling(ework, e, scale_min, scale_max);

            // Scale the problem data and update the
            // equilibration matrices
            scale_data(P, A, q, b, Some(dwork), ework);
            d.hadamard(dwork);
            e.hadamard(ework);

            // now use the Dwork array to hold the
            // column norms of the newly scaled P
            // so that we can compute the mean
            P.col_norms_sym(dwork);
            let mean_col_norm_P = dwork.mean();
            let inf_norm_q = q.norm_inf();

            if mean_col_norm_P != T::zero() && inf_norm_q != T::zero() {
                let scale_cost = T::max(inf_norm_q, mean_col_norm_P);
                let scale_cost = limit_scaling(scale_cost, scale_min, scale_max);
                let ctmp = T::recip(scale_cost);

                // scale the penalty terms and overall scaling
                P.scale(ctmp);
                q.scale(ctmp);
                equil.c *= ctmp;
            }
        } //end Ruiz scaling loop

        // fix scalings in cones for which elementwise
        // scaling can't be applied
        if cones.rectify_equilibration(ework, e) {
            // only rescale again if some cones were rectified
            scale_data(P, A, q, b, None, ework);
            e.hadamard(ework);
        }

        // update the inverse scaling data
        equil.dinv.scalarop_from(T::recip, d);
        equil.einv.scalarop_from(T::recip, e);

        // equilibration changed the matrix values
        data.matrix_epoch += 1;
    }
}

fn field_slot(field: DataField) -> usize {
    match field {
        DataField::P => 0,
        DataField::q => 1,
        DataField::A => 2,
        DataField::b => 3,
    }
}
