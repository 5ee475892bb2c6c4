use std::ops::{Index, IndexMut};

use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::EvalError;

#[derive(Clone, Debug, PartialEq)]
pub struct Array2<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T> Array2<T> {
    pub fn from_shape_vec(shape: (usize, usize), data: Vec<T>) -> Result<Self, EvalError> {
        let (rows, cols) = shape;
        if data.len() != rows * cols {
            return Err(EvalError::InvalidShape {
                rows,
                cols,
                len: data.len(),
            });
        }
        Ok(Self { data, rows, cols })
    }

    /// Build a matrix from row vectors. All rows must share the first row's length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, EvalError> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(EvalError::InvalidShape {
                    rows: nrows,
                    cols: ncols,
                    len: data.len() + row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: nrows,
            cols: ncols,
        })
    }

    pub fn nrows(&self) -> usize {
        self.rows
    }

    pub fn ncols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    #[inline]
    fn offset(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    pub fn row_slice(&self, row: usize) -> &[T] {
        let start = self.offset(row, 0);
        &self.data[start..start + self.cols]
    }

    pub fn column(&self, col: usize) -> Vec<T>
    where
        T: Clone,
    {
        assert!(col < self.cols, "column index out of bounds");
        (0..self.rows).map(|row| self[(row, col)].clone()).collect()
    }

    /// Gather rows by index. Indices may repeat (bootstrap samples).
    pub fn select_rows(&self, indices: &[usize]) -> Array2<T>
    where
        T: Clone,
    {
        let mut data = Vec::with_capacity(indices.len() * self.cols);
        for &row in indices {
            data.extend_from_slice(self.row_slice(row));
        }
        Array2 {
            data,
            rows: indices.len(),
            cols: self.cols,
        }
    }

    /// Apply `f(col, value)` to every element, keeping the shape.
    pub fn map_columns<U, F>(&self, mut f: F) -> Array2<U>
    where
        F: FnMut(usize, &T) -> U,
    {
        let cols = self.cols;
        Array2 {
            data: self
                .data
                .iter()
                .enumerate()
                .map(|(i, v)| f(i % cols, v))
                .collect(),
            rows: self.rows,
            cols,
        }
    }
}

impl Array2<f64> {
    /// Copy into the row-major `DenseMatrix` smartcore estimators consume.
    pub fn to_dense(&self) -> Result<DenseMatrix<f64>, EvalError> {
        Ok(DenseMatrix::new(self.rows, self.cols, self.data.clone(), false)?)
    }
}

impl<T> Index<(usize, usize)> for Array2<T> {
    type Output = T;

    fn index(&self, index: (usize, usize)) -> &Self::Output {
        let offset = self.offset(index.0, index.1);
        &self.data[offset]
    }
}

impl<T> IndexMut<(usize, usize)> for Array2<T> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output {
        let offset = self.offset(index.0, index.1);
        &mut self.data[offset]
    }
}
