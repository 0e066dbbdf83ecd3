#![allow(non_snake_case)]
use super::*;
use crate::algebra::*;
use core::iter::Zip;
use core::slice::Iter;

// Every update on this page checks all of its input before writing
// anything, so a failed update leaves the problem data untouched.

/// Trait for updating P and A matrices from various data types
pub trait MatrixProblemDataUpdate<T: FloatT> {
    fn update_matrix(
        &self,
        data: &mut DefaultProblemData<T>,
        field: DataField,
    ) -> Result<(), SolverError>;
}

/// Trait for updating q and b vectors from various data types
pub trait VectorProblemDataUpdate<T: FloatT> {
    fn update_vector(
        &self,
        data: &mut DefaultProblemData<T>,
        field: DataField,
    ) -> Result<(), SolverError>;
}

impl<T> DefaultSolver<T>
where
    T: FloatT,
{
    /// Overwrites selected values of one problem data field.
    ///
    /// For `P` and `A` the indices are positions in the nonzero value
    /// array of the fixed sparsity pattern, with `P` stored as its upper
    /// triangle.   For `q` and `b` they are vector positions.   Values
    /// are given in the original (unscaled) problem coordinates.
    pub fn update(
        &mut self,
        field: DataField,
        indices: &[usize],
        values: &[T],
    ) -> Result<(), SolverError> {
        check_lengths(indices.len(), values.len())?;

        let len = self.data.field_len(field);
        if let Some(&index) = indices.iter().find(|&&i| i >= len) {
            return Err(SolverError::InvalidIndex { field, index });
        }

        for (&idx, &v) in indices.iter().zip(values) {
            self.data.set_value(field, idx, v);
        }
        self.data.finish_update(field);
        Ok(())
    }

    /// Overwrites matrix values addressed by `(row, col)` coordinates.
    /// A coordinate outside the sparsity pattern is an `InvalidIndex`
    /// error, reported at its position in `coords`.   Coordinates in the
    /// lower triangle of `P` address the mirrored upper triangular entry.
    /// For `q` and `b` the column must be zero.
    pub fn update_entries(
        &mut self,
        field: DataField,
        coords: &[(usize, usize)],
        values: &[T],
    ) -> Result<(), SolverError> {
        check_lengths(coords.len(), values.len())?;

        for (index, &coord) in coords.iter().enumerate() {
            if self.entry_index(field, coord).is_none() {
                return Err(SolverError::InvalidIndex { field, index });
            }
        }

        for (&coord, &v) in coords.iter().zip(values) {
            if let Some(idx) = self.entry_index(field, coord) {
                self.data.set_value(field, idx, v);
            }
        }
        self.data.finish_update(field);
        Ok(())
    }

    fn entry_index(&self, field: DataField, (row, col): (usize, usize)) -> Option<usize> {
        match field {
            DataField::P => self.data.P.find_entry_index((row.min(col), row.max(col))),
            DataField::A => self.data.A.find_entry_index((row, col)),
            DataField::q => (col == 0 && row < self.data.n).then_some(row),
            DataField::b => (col == 0 && row < self.data.m).then_some(row),
        }
    }

    /// Overwrites internal problem data structures in a solver object with new data, avoiding new memory allocations.
    /// See `update_P`, `update_q`, `update_A`, `update_b` for allowable inputs.
    ///
    /// The four updates are applied in order and each is all-or-nothing,
    /// so an error in a later field leaves earlier fields updated.
    pub fn update_data<
        DataP: MatrixProblemDataUpdate<T> + ?Sized,
        Dataq: VectorProblemDataUpdate<T> + ?Sized,
        DataA: MatrixProblemDataUpdate<T> + ?Sized,
        Datab: VectorProblemDataUpdate<T> + ?Sized,
    >(
        &mut self,
        P: &DataP,
        q: &Dataq,
        A: &DataA,
        b: &Datab,
    ) -> Result<(), SolverError> {
        self.update_P(P)?;
        self.update_q(q)?;
        self.update_A(A)?;
        self.update_b(b)?;

        Ok(())
    }

    /// Overwrites the `P` matrix data in an existing solver object.   The input `P` can be
    ///
    /// - a nonempty Vector, in which case the nonzero values of the original `P` are overwritten, preserving the sparsity pattern, or
    ///
    /// - a CscMatrix, in which case the input must match the sparsity pattern of the upper triangular part of the original `P`.
    ///
    /// - an iterator zip(&index,&values), specifying a selective update of values.
    ///
    /// - an empty vector, in which case no action is taken.
    ///
    pub fn update_P<Data: MatrixProblemDataUpdate<T> + ?Sized>(
        &mut self,
        data: &Data,
    ) -> Result<(), SolverError> {
        data.update_matrix(&mut self.data, DataField::P)
    }

    /// Overwrites the `A` matrix data in an existing solver object.   The input `A` can be
    ///
    /// - a nonempty Vector, in which case the nonzero values of the original `A` are overwritten, preserving the sparsity pattern, or
    ///
    /// - a CscMatrix, in which case the input must match the sparsity pattern of the original `A`.
    ///
    /// - an iterator zip(&index,&values), specifying a selective update of values.
    ///
    /// - an empty vector, in which case no action is taken.
    ///
    pub fn update_A<Data: MatrixProblemDataUpdate<T> + ?Sized>(
        &mut self,
        data: &Data,
    ) -> Result<(), SolverError> {
        data.update_matrix(&mut self.data, DataField::A)
    }

    /// Overwrites the `q` vector data in an existing solver object.  No action is taken if the input is empty.
    pub fn update_q<Data: VectorProblemDataUpdate<T> + ?Sized>(
        &mut self,
        data: &Data,
    ) -> Result<(), SolverError> {
        data.update_vector(&mut self.data, DataField::q)
    }

    /// Overwrites the `b` vector data in an existing solver object.  No action is taken if the input is empty.
    pub fn update_b<Data: VectorProblemDataUpdate<T> + ?Sized>(
        &mut self,
        data: &Data,
    ) -> Result<(), SolverError> {
        data.update_vector(&mut self.data, DataField::b)
    }
}

fn check_lengths(expected: usize, found: usize) -> Result<(), SolverError> {
    if expected != found {
        return Err(SolverError::ParameterShape { expected, found });
    }
    Ok(())
}

// overwrite an entire field from a dense slice of values
fn update_all<T: FloatT>(
    values: &[T],
    data: &mut DefaultProblemData<T>,
    field: DataField,
) -> Result<(), SolverError> {
    if values.is_empty() {
        return Ok(());
    }
    check_lengths(data.field_len(field), values.len())?;

    for (idx, &v) in values.iter().enumerate() {
        data.set_value(field, idx, v);
    }
    data.finish_update(field);
    Ok(())
}

// overwrite selected entries of a field from (index, value) pairs
fn update_partial<'a, T: FloatT>(
    pairs: Zip<Iter<'a, usize>, Iter<'a, T>>,
    data: &mut DefaultProblemData<T>,
    field: DataField,
) -> Result<(), SolverError> {
    let len = data.field_len(field);
    if let Some((&index, _)) = pairs.clone().find(|&(&i, _)| i >= len) {
        return Err(SolverError::InvalidIndex { field, index });
    }

    for (&idx, &v) in pairs {
        data.set_value(field, idx, v);
    }
    data.finish_update(field);
    Ok(())
}

impl<T> MatrixProblemDataUpdate<T> for CscMatrix<T>
where
    T: FloatT,
{
    fn update_matrix(
        &self,
        data: &mut DefaultProblemData<T>,
        field: DataField,
    ) -> Result<(), SolverError> {
        let M = match field {
            DataField::P => &data.P,
            _ => &data.A,
        };

        if self.size() != M.size() {
            return Err(SolverError::ParameterShape {
                expected: M.nnz(),
                found: self.nnz(),
            });
        }

        // a full P must be reduced to its triangle first
        let triu;
        let src = if field == DataField::P && !self.is_triu() {
            triu = self.to_triu();
            &triu
        } else {
            self
        };

        if src.nnz() != M.nnz() {
            return Err(SolverError::ParameterShape {
                expected: M.nnz(),
                found: src.nnz(),
            });
        }

        // first entry that lands somewhere else in the pattern
        if let Some(index) = (0..M.nnz()).find(|&k| src.index_to_coord(k) != M.index_to_coord(k)) {
            return Err(SolverError::InvalidIndex { field, index });
        }

        update_all(&src.nzval, data, field)
    }
}

impl<T> MatrixProblemDataUpdate<T> for [T]
where
    T: FloatT,
{
    fn update_matrix(
        &self,
        data: &mut DefaultProblemData<T>,
        field: DataField,
    ) -> Result<(), SolverError> {
        update_all(self, data, field)
    }
}

impl<T: FloatT> MatrixProblemDataUpdate<T> for Vec<T> {
    fn update_matrix(
        &self,
        data: &mut DefaultProblemData<T>,
        field: DataField,
    ) -> Result<(), SolverError> {
        update_all(self, data, field)
    }
}

impl<T: FloatT> MatrixProblemDataUpdate<T> for [T; 0] {
    fn update_matrix(
        &self,
        _data: &mut DefaultProblemData<T>,
        _field: DataField,
    ) -> Result<(), SolverError> {
        Ok(())
    }
}

// Can't write a single impl for [T], Vec<T> and [T;0] above because
// bounding by AsRef<[T]> is not specific enough to distinguish it from
// the zip iterator for partial updates implemented next.

impl<'a, T> MatrixProblemDataUpdate<T> for Zip<Iter<'a, usize>, Iter<'a, T>>
where
    T: FloatT,
{
    fn update_matrix(
        &self,
        data: &mut DefaultProblemData<T>,
        field: DataField,
    ) -> Result<(), SolverError> {
        update_partial(self.clone(), data, field)
    }
}

impl<T> VectorProblemDataUpdate<T> for [T]
where
    T: FloatT,
{
    fn update_vector(
        &self,
        data: &mut DefaultProblemData<T>,
        field: DataField,
    ) -> Result<(), SolverError> {
        update_all(self, data, field)
    }
}

impl<T: FloatT> VectorProblemDataUpdate<T> for Vec<T> {
    fn update_vector(
        &self,
        data: &mut DefaultProblemData<T>,
        field: DataField,
    ) -> Result<(), SolverError> {
        update_all(self, data, field)
    }
}

impl<T: FloatT> VectorProblemDataUpdate<T> for [T; 0] {
    fn update_vector(
        &self,
        _data: &mut DefaultProblemData<T>,
        _field: DataField,
    ) -> Result<(), SolverError> {
        Ok(())
    }
}

impl<'a, T> VectorProblemDataUpdate<T> for Zip<Iter<'a, usize>, Iter<'a, T>>
where
    T: FloatT,
{
    fn update_vector(
        &self,
        data: &mut DefaultProblemData<T>,
        field: DataField,
    ) -> Result<(), SolverError> {
        update_partial(self.clone(), data, field)
    }
}
