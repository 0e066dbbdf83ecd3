use crate::algebra::*;
use std::iter::zip;

impl<T: FloatT> MatrixVectorMultiply for CscMatrix<T> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_N(self, y, x, a, b);
    }
}

impl<T: FloatT> MatrixVectorMultiply for Adjoint<'_, CscMatrix<T>> {
    type T = T;

    fn gemv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_axpby_T(self.src, y, x, a, b);
    }
}

impl<T: FloatT> SymMatrixVectorMultiply for Symmetric<'_, CscMatrix<T>> {
    type T = T;

    fn symv(&self, y: &mut [T], x: &[T], a: T, b: T) {
        _csc_symv(self.src, y, x, a, b);
    }
}

impl<T: FloatT> MatrixMath for CscMatrix<T> {
    type T = T;

    //scalar mut operations
    fn scale(&mut self, c: T) {
        self.nzval.scale(c);
    }

    fn negate(&mut self) {
        self.nzval.negate();
    }

    fn col_norms(&self, norms: &mut [T]) {
        norms.fill(T::zero());
        self.col_norms_no_reset(norms);
    }

    fn col_norms_no_reset(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);

        for (i, v) in norms.iter_mut().enumerate() {
            let vals = &self.nzval[self.colptr[i]..self.colptr[i + 1]];
            *v = vals.iter().fold(*v, |m, &nzval| T::max(m, T::abs(nzval)));
        }
    }

    fn col_norms_sym(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.n);
        norms.fill(T::zero());

        for i in 0..norms.len() {
            for j in self.colptr[i]..self.colptr[i + 1] {
                let tmp = T::abs(self.nzval[j]);
                let r = self.rowval[j];
                norms[i] = T::max(norms[i], tmp);
                norms[r] = T::max(norms[r], tmp);
            }
        }
    }

    fn row_norms(&self, norms: &mut [T]) {
        assert_eq!(norms.len(), self.m);
        norms.fill(T::zero());

        for (row, val) in zip(&self.rowval, &self.nzval) {
            norms[*row] = T::max(norms[*row], T::abs(*val));
        }
    }

    fn lscale(&mut self, l: &[T]) {
        for (val, row) in zip(&mut self.nzval, &self.rowval) {
            *val *= l[*row];
        }
    }

    fn lrscale(&mut self, l: &[T], r: &[T]) {
        for (col, &ri) in r.iter().enumerate().take(self.n) {
            let (first, last) = (self.colptr[col], self.colptr[col + 1]);
            let vals = &mut self.nzval[first..last];
            let rows = &self.rowval[first..last];

            for (val, row) in zip(vals, rows) {
                *val *= l[*row] * ri;
            }
        }
    }

    fn quad_form(&self, y: &[T], x: &[T]) -> T {
        _csc_quad_form(self, y, x)
    }
}

// symmetric multiply using only the upper triangle of A
#[allow(non_snake_case)]
fn _csc_symv<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    y.scale(b);

    assert!(x.len() == A.n);
    assert!(y.len() == A.n);
    assert!(A.n == A.m);

    for (col, &xcol) in x.iter().enumerate() {
        let first = A.colptr[col];
        let last = A.colptr[col + 1];
        let rows = &A.rowval[first..last];
        let nzvals = &A.nzval[first..last];

        for (&row, &Aij) in zip(rows, nzvals) {
            y[row] += a * Aij * xcol;

            if row != col {
                //don't double up on the diagonal
                y[col] += a * Aij * x[row];
            }
        }
    }
}

#[allow(non_snake_case)]
#[allow(clippy::comparison_chain)]
fn _csc_quad_form<T: FloatT>(M: &CscMatrix<T>, y: &[T], x: &[T]) -> T {
    assert_eq!(M.n, M.m);
    assert_eq!(x.len(), M.n);
    assert_eq!(y.len(), M.n);

    let mut out = T::zero();

    for col in 0..M.n {
        let mut tmp1 = T::zero();
        let mut tmp2 = T::zero();

        //start / stop indices for the current column
        let first = M.colptr[col];
        let last = M.colptr[col + 1];

        let values = &M.nzval[first..last];
        let rows = &M.rowval[first..last];

        for (&Mv, &row) in zip(values, rows) {
            if row < col {
                //triu terms only
                tmp1 += Mv * x[row];
                tmp2 += Mv * y[row];
            } else if row == col {
                out += Mv * x[col] * y[col];
            } else {
                panic!("Input matrix should be triu form.");
            }
        }
        out += tmp1 * y[col] + tmp2 * x[col];
    }
    out
}

// scales y by b in place, with shortcuts for the common values
fn _scale_by<T: FloatT>(y: &mut [T], b: T) {
    if b == T::zero() {
        y.fill(T::zero());
    } else if b == -T::one() {
        y.negate();
    } else if b != T::one() {
        y.scale(b);
    }
}

// sparse matrix-vector multiply, no transpose
#[allow(non_snake_case)]
fn _csc_axpby_N<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    _scale_by(y, b);

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(x.len(), A.n);
    assert_eq!(y.len(), A.m);

    //y += A*x
    for (j, &xj) in x.iter().enumerate() {
        let axj = a * xj;
        for i in A.colptr[j]..A.colptr[j + 1] {
            y[A.rowval[i]] += A.nzval[i] * axj;
        }
    }
}

// sparse matrix-vector multiply, transposed
#[allow(non_snake_case)]
fn _csc_axpby_T<T: FloatT>(A: &CscMatrix<T>, y: &mut [T], x: &[T], a: T, b: T) {
    _scale_by(y, b);

    // if a is zero, we're done
    if a == T::zero() {
        return;
    }

    assert_eq!(x.len(), A.m);
    assert_eq!(y.len(), A.n);

    //y += A'*x
    for (j, yj) in y.iter_mut().enumerate() {
        let mut acc = T::zero();
        for k in A.colptr[j]..A.colptr[j + 1] {
            acc += A.nzval[k] * x[A.rowval[k]];
        }
        *yj += a * acc;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_matrix() -> CscMatrix<f64> {
        CscMatrix::from(&[
            [1., 0., 2.], //
            [0., 3., 0.], //
        ])
    }

    #[test]
    fn test_gemv() {
        let A = test_matrix();
        let x = vec![1., 2., 3.];
        let mut y = vec![1., 1.];
        A.gemv(&mut y, &x, 2.0, -1.0);
        assert_eq!(y, vec![13., 11.]);

        let x = vec![1., -1.];
        let mut y = vec![0.; 3];
        A.t().gemv(&mut y, &x, 1.0, 0.0);
        assert_eq!(y, vec![1., -3., 2.]);
    }

    #[test]
    fn test_symv_and_quad_form() {
        // triu of [4 1; 1 2]
        let P = CscMatrix::from(&[
            [4., 1.], //
            [0., 2.], //
        ]);
        let x = vec![1., 2.];
        let mut y = vec![0.; 2];
        P.sym().symv(&mut y, &x, 1.0, 0.0);
        assert_eq!(y, vec![6., 5.]);
        assert_eq!(P.quad_form(&x, &x), 16.);
    }

    #[test]
    fn test_norms_and_scaling() {
        let mut A = test_matrix();
        let mut cn = vec![0.; 3];
        let mut rn = vec![0.; 2];
        A.col_norms(&mut cn);
        A.row_norms(&mut rn);
        assert_eq!(cn, vec![1., 3., 2.]);
        assert_eq!(rn, vec![2., 3.]);

        A.lrscale(&[2., 1.], &[1., 1., 0.5]);
        assert_eq!(A.nzval, vec![2., 3., 2.]);
    }
}
