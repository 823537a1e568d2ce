use crate::core::models::record::RecordTable;
use nalgebra::{DMatrix, Point3};

/// Computes the symmetric pairwise Euclidean distance matrix of a point
/// set.
///
/// Row and column `i` correspond to `positions[i]`; the diagonal is zero.
/// Edge-construction functions index this matrix by node order, so callers
/// must pass coordinates in exactly that order.
pub fn distance_matrix(positions: &[Point3<f64>]) -> DMatrix<f64> {
    let n = positions.len();
    DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            0.0
        } else {
            (positions[i] - positions[j]).norm()
        }
    })
}

/// Computes the pairwise distance matrix over a record table, indexed by
/// table row order.
pub fn table_distance_matrix(table: &RecordTable) -> DMatrix<f64> {
    distance_matrix(&table.positions())
}

/// Arithmetic mean of a set of coordinates.
///
/// Returns the origin for an empty slice; callers group rows per residue
/// and never pass empty groups.
pub fn centroid(positions: &[Point3<f64>]) -> Point3<f64> {
    if positions.is_empty() {
        return Point3::origin();
    }
    let sum = positions
        .iter()
        .fold(Point3::origin(), |acc, p| acc + p.coords);
    sum / positions.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_matrix_is_symmetric_with_zero_diagonal() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(0.0, 4.0, 0.0),
        ];
        let m = distance_matrix(&points);

        assert_eq!(m.nrows(), 3);
        assert_eq!(m[(0, 0)], 0.0);
        assert_eq!(m[(1, 1)], 0.0);
        assert_eq!(m[(0, 1)], 3.0);
        assert_eq!(m[(1, 0)], 3.0);
        assert_eq!(m[(0, 2)], 4.0);
        assert_eq!(m[(1, 2)], 5.0);
        assert_eq!(m[(2, 1)], 5.0);
    }

    #[test]
    fn centroid_is_the_coordinate_mean() {
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 4.0, 6.0),
        ];
        assert_eq!(centroid(&points), Point3::new(1.0, 2.0, 3.0));
        assert_eq!(centroid(&[]), Point3::origin());
    }

    #[test]
    fn empty_point_set_yields_empty_matrix() {
        let m = distance_matrix(&[]);
        assert_eq!(m.nrows(), 0);
        assert_eq!(m.ncols(), 0);
    }
}
