use super::*;
use crate::algebra::*;
use std::collections::HashMap;
use std::iter::zip;
use std::ops::Range;

// -------------------------------------
// default composite cone type
// -------------------------------------

/// Cartesian product of the primitive cones making up `K`.
pub struct CompositeCone<T: FloatT = f64> {
    cones: Vec<SupportedCone<T>>,

    //Type count for each cone type
    pub(crate) type_counts: HashMap<SupportedConeTag, usize>,

    //overall size of the composite cone
    pub(crate) numel: usize,

    //ranges for the indices of the constituent cones
    pub(crate) rng_cones: Vec<Range<usize>>,
}

impl<T> CompositeCone<T>
where
    T: FloatT,
{
    pub fn new(types: &[SupportedConeT]) -> Self {
        let mut cones: Vec<SupportedCone<T>> = Vec::with_capacity(types.len());
        let mut type_counts = HashMap::new();

        for t in types.iter() {
            *type_counts.entry(t.as_tag()).or_insert(0) += 1;
            cones.push(make_cone(t));
        }

        let numel = cones.iter().map(|c| c.numel()).sum();
        let rng_cones = _make_rng_cones(&cones);

        Self {
            cones,
            type_counts,
            numel,
            rng_cones,
        }
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }
    pub fn iter(&self) -> std::slice::Iter<'_, SupportedCone<T>> {
        self.cones.iter()
    }
    pub(crate) fn get_type_count(&self, tag: SupportedConeTag) -> usize {
        self.type_counts.get(&tag).copied().unwrap_or(0)
    }

    /// Fill `ρ` with the per-row ADMM step size `ρ₀ × cone multiplier`
    pub(crate) fn rho_vector(&self, ρ: &mut [T], ρ0: T) {
        for (cone, rng) in zip(&self.cones, &self.rng_cones) {
            ρ[rng.clone()].set(ρ0 * cone.rho_scaling());
        }
    }

    /// Flag rows belonging to orthant cones, i.e. rows that can be
    /// deactivated by an infinite bound.
    pub(crate) fn orthant_rows(&self, rows: &mut [bool]) {
        for (cone, rng) in zip(&self.cones, &self.rng_cones) {
            rows[rng.clone()].fill(cone.is_orthant());
        }
    }

    /// The user facing description of each constituent cone.
    pub(crate) fn cone_types(&self) -> Vec<SupportedConeT> {
        self.cones
            .iter()
            .map(|cone| {
                let dim = cone.numel();
                match cone.as_tag() {
                    SupportedConeTag::ZeroCone => SupportedConeT::ZeroConeT(dim),
                    SupportedConeTag::NonnegativeCone => SupportedConeT::NonnegativeConeT(dim),
                    SupportedConeTag::SecondOrderCone => SupportedConeT::SecondOrderConeT(dim),
                }
            })
            .collect()
    }
}

fn _make_rng_cones<T>(cones: &[SupportedCone<T>]) -> Vec<Range<usize>>
where
    T: FloatT,
{
    let mut rngs = Vec::with_capacity(cones.len());
    let mut start = 0;
    for cone in cones {
        let stop = start + cone.numel();
        rngs.push(start..stop);
        start = stop;
    }
    rngs
}

impl<T> Cone<T> for CompositeCone<T>
where
    T: FloatT,
{
    fn dim(&self) -> usize {
        self.numel
    }

    fn numel(&self) -> usize {
        self.numel
    }

    fn rectify_equilibration(&self, δ: &mut [T], e: &[T]) -> bool {
        let mut any_changed = false;

        // we will update e <- δ .* e using return values
        // from this function.  default is to do nothing at all
        δ.fill(T::one());
        for (cone, rng) in zip(&self.cones, &self.rng_cones) {
            let δi = &mut δ[rng.clone()];
            let ei = &e[rng.clone()];
            any_changed |= cone.rectify_equilibration(δi, ei);
        }
        any_changed
    }

    fn project(&self, x: &mut [T]) {
        for (cone, rng) in zip(&self.cones, &self.rng_cones) {
            cone.project(&mut x[rng.clone()]);
        }
    }

    fn project_dual(&self, x: &mut [T]) {
        for (cone, rng) in zip(&self.cones, &self.rng_cones) {
            cone.project_dual(&mut x[rng.clone()]);
        }
    }

    fn rho_scaling(&self) -> T {
        // not meaningful for a collection.  See rho_vector
        T::one()
    }

    fn is_orthant(&self) -> bool {
        self.cones.iter().all(|c| c.is_orthant())
    }

    fn allows_polishing(&self) -> bool {
        self.cones.iter().all(|c| c.allows_polishing())
    }

    fn active_set(&self, active: &mut [bool], s: &[T], y: &[T]) {
        for (cone, rng) in zip(&self.cones, &self.rng_cones) {
            cone.active_set(&mut active[rng.clone()], &s[rng.clone()], &y[rng.clone()]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_cones() -> CompositeCone<f64> {
        CompositeCone::new(&[
            SupportedConeT::ZeroConeT(1),
            SupportedConeT::NonnegativeConeT(2),
            SupportedConeT::SecondOrderConeT(3),
        ])
    }

    #[test]
    fn test_composite_ranges() {
        let K = test_cones();
        assert_eq!(K.numel(), 6);
        assert_eq!(K.len(), 3);
        assert_eq!(K.rng_cones, vec![0..1, 1..3, 3..6]);
        assert_eq!(K.get_type_count(SupportedConeTag::NonnegativeCone), 1);
        assert!(!K.allows_polishing());

        let mut ρ = vec![0.; 6];
        K.rho_vector(&mut ρ, 0.1);
        assert_eq!(ρ, vec![100., 0.1, 0.1, 0.1, 0.1, 0.1]);

        let mut rows = vec![false; 6];
        K.orthant_rows(&mut rows);
        assert_eq!(rows, vec![false, true, true, false, false, false]);

        assert_eq!(
            K.cone_types(),
            vec![
                SupportedConeT::ZeroConeT(1),
                SupportedConeT::NonnegativeConeT(2),
                SupportedConeT::SecondOrderConeT(3),
            ]
        );
    }

    #[test]
    fn test_composite_projections() {
        let K = test_cones();

        let mut x = vec![5., -1., 2., 0., 3., 4.];
        K.project(&mut x);
        assert_eq!(x[0..3], [0., 0., 2.]);
        assert!((x[3] - 2.5).abs() < 1e-14);

        // dual of the zero cone is the free cone
        let mut x = vec![5., -1., 2., 1., 0., 0.];
        K.project_dual(&mut x);
        assert_eq!(x, vec![5., 0., 2., 1., 0., 0.]);
    }
}
