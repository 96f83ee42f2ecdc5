//! Rectangular observation grids in a plane of constant z

use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::core::error::MaxwellError;

/// An `nx × ny` raster of points in the plane `z = const`
///
/// Point `(x_i, y_j)` has flat index `i * ny + j`: x is the outer loop and y
/// the inner loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationGrid {
    /// Points along x
    pub nx: usize,
    /// Points along y
    pub ny: usize,
    /// `[x_min, x_max]`, both included
    pub x_range: [f64; 2],
    /// `[y_min, y_max]`, both included
    pub y_range: [f64; 2],
    /// Height of the plane
    #[serde(default)]
    pub z: f64,
}

impl ObservationGrid {
    /// Grid in the plane `z = 0`
    pub fn new(
        nx: usize,
        ny: usize,
        x_range: [f64; 2],
        y_range: [f64; 2],
    ) -> Result<Self, MaxwellError> {
        let grid = Self {
            nx,
            ny,
            x_range,
            y_range,
            z: 0.0,
        };
        grid.validate()?;
        Ok(grid)
    }

    /// Move the grid to another plane
    pub fn with_z(mut self, z: f64) -> Self {
        self.z = z;
        self
    }

    /// Check the sizes and bounds
    pub fn validate(&self) -> Result<(), MaxwellError> {
        if self.nx == 0 || self.ny == 0 {
            return Err(MaxwellError::InvalidParameters(format!(
                "grid must have at least one point per axis, got {} x {}",
                self.nx, self.ny
            )));
        }
        let bounds = [self.x_range[0], self.x_range[1], self.y_range[0], self.y_range[1], self.z];
        if bounds.iter().any(|v| !v.is_finite()) {
            return Err(MaxwellError::InvalidParameters(
                "grid bounds must be finite".to_string(),
            ));
        }
        Ok(())
    }

    /// Total number of points
    pub fn num_points(&self) -> usize {
        self.nx * self.ny
    }

    /// x coordinates
    pub fn x_coords(&self) -> Vec<f64> {
        linspace(self.x_range, self.nx)
    }

    /// y coordinates
    pub fn y_coords(&self) -> Vec<f64> {
        linspace(self.y_range, self.ny)
    }

    /// Flat index of `(x_i, y_j)`
    #[inline]
    pub fn index(&self, i: usize, j: usize) -> usize {
        i * self.ny + j
    }

    /// All points in raster order (`num_points × 3`)
    pub fn points(&self) -> Array2<f64> {
        let xs = self.x_coords();
        let ys = self.y_coords();
        let mut points = Array2::zeros((self.num_points(), 3));
        for (i, &x) in xs.iter().enumerate() {
            for (j, &y) in ys.iter().enumerate() {
                let mut row = points.row_mut(self.index(i, j));
                row[0] = x;
                row[1] = y;
                row[2] = self.z;
            }
        }
        points
    }

    /// Reshape raster-ordered values to an image with x horizontal
    ///
    /// The result has shape `(ny, nx)`: the `(nx, ny)` raster, transposed.
    pub fn to_image(&self, values: ArrayView1<'_, f64>) -> Result<Array2<f64>, MaxwellError> {
        if values.len() != self.num_points() {
            return Err(MaxwellError::InvalidParameters(format!(
                "{} values for a grid of {} points",
                values.len(),
                self.num_points()
            )));
        }
        let image = Array2::from_shape_fn((self.ny, self.nx), |(j, i)| values[self.index(i, j)]);
        Ok(image)
    }
}

/// Evenly spaced values including both ends; a single value is the lower end
fn linspace(range: [f64; 2], n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![range[0]];
    }
    let step = (range[1] - range[0]) / (n - 1) as f64;
    (0..n)
        .map(|i| {
            if i == n - 1 {
                range[1]
            } else {
                range[0] + step * i as f64
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array1;

    #[test]
    fn test_raster_order() {
        let grid = ObservationGrid::new(3, 2, [-1.0, 1.0], [0.0, 2.0]).unwrap();
        let points = grid.points();
        assert_eq!(points.nrows(), 6);
        let xs = [-1.0, 0.0, 1.0];
        let ys = [0.0, 2.0];
        for i in 0..3 {
            for j in 0..2 {
                let row = points.row(i * 2 + j);
                assert_eq!(row[0], xs[i]);
                assert_eq!(row[1], ys[j]);
                assert_eq!(row[2], 0.0);
            }
        }
    }

    #[test]
    fn test_single_point_axis_uses_lower_bound() {
        let grid = ObservationGrid::new(1, 3, [4.0, 9.0], [0.0, 1.0]).unwrap();
        assert_eq!(grid.x_coords(), vec![4.0]);
        assert_eq!(grid.y_coords(), vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_to_image_transposes() {
        let grid = ObservationGrid::new(3, 2, [0.0, 1.0], [0.0, 1.0]).unwrap();
        let values = Array1::from_iter((0..6).map(|v| v as f64));
        let image = grid.to_image(values.view()).unwrap();
        assert_eq!(image.dim(), (2, 3));
        // Row j of the image holds y_j across all x
        assert_eq!(image.row(0).to_vec(), vec![0.0, 2.0, 4.0]);
        assert_eq!(image.row(1).to_vec(), vec![1.0, 3.0, 5.0]);

        let short = Array1::zeros(5);
        assert!(grid.to_image(short.view()).is_err());
    }

    #[test]
    fn test_invalid_grid() {
        assert!(ObservationGrid::new(0, 2, [0.0, 1.0], [0.0, 1.0]).is_err());
        assert!(ObservationGrid::new(2, 2, [0.0, f64::INFINITY], [0.0, 1.0]).is_err());
    }

    #[test]
    fn test_with_z() {
        let grid = ObservationGrid::new(2, 2, [0.0, 1.0], [0.0, 1.0])
            .unwrap()
            .with_z(0.5);
        assert!(grid.points().column(2).iter().all(|&z| z == 0.5));
    }
}
