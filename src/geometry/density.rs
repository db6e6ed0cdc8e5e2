use std::collections::BTreeMap;

use num_traits::cast;
use tracing::debug;

use crate::error::{GeoAnalysisError, Result};
use crate::geometry::Site;
use crate::kdtree::{KDTreeBuilder, KDTreeIndex};
use crate::store::PointId;

/// One occupied square of a [`DensityGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityCell {
    /// Column index: the cell spans `[col * size, (col + 1) * size)` on x.
    pub col: i64,
    /// Row index: the cell spans `[row * size, (row + 1) * size)` on y.
    pub row: i64,
    pub count: usize,
    /// Points per square kilometre.
    pub density: f64,
}

/// Counts of sites binned into a square grid aligned with the projection origin.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    /// Side of each cell, in metres.
    pub cell_size: f64,
    /// Occupied cells, ordered by `(row, col)`.
    pub cells: Vec<DensityCell>,
    pub total: usize,
    /// Highest count in any cell.
    pub max_count: usize,
    /// Mean count over occupied cells.
    pub mean_count: f64,
}

impl DensityGrid {
    /// The occupied cell containing `(x, y)`, if any.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<&DensityCell> {
        let (col, row) = cell_index(x, y, self.cell_size)?;
        self.cells
            .binary_search_by_key(&(row, col), |c| (c.row, c.col))
            .ok()
            .map(|i| &self.cells[i])
    }

    /// Center of the cell at `(col, row)`, in projected metres.
    pub fn cell_center(&self, col: i64, row: i64) -> (f64, f64) {
        (
            (col as f64 + 0.5) * self.cell_size,
            (row as f64 + 0.5) * self.cell_size,
        )
    }
}

fn cell_index(x: f64, y: f64, cell_size: f64) -> Option<(i64, i64)> {
    let col: i64 = cast((x / cell_size).floor())?;
    let row: i64 = cast((y / cell_size).floor())?;
    Some((col, row))
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !(value.is_finite() && value > 0.0) {
        return Err(GeoAnalysisError::InvalidArgument(format!(
            "{} must be a positive number of metres, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Number of sites a k-d tree can hold, which is bounded by its `u32` point identifiers.
fn tree_capacity(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| {
        GeoAnalysisError::InvalidArgument(format!(
            "{} sites exceed the spatial index capacity of {}",
            len,
            u32::MAX
        ))
    })
}

/// Bin `sites` into square cells of `cell_size` metres.
///
/// # Errors
///
/// [`GeoAnalysisError::InvalidArgument`] if `cell_size` is not positive and finite, or a site
/// falls outside the representable grid.
pub fn grid_density(sites: &[Site], cell_size: f64) -> Result<DensityGrid> {
    check_positive("cell size", cell_size)?;

    let mut counts: BTreeMap<(i64, i64), usize> = BTreeMap::new();
    for site in sites {
        let (col, row) = cell_index(site.x, site.y, cell_size).ok_or_else(|| {
            GeoAnalysisError::InvalidArgument(format!(
                "site {} at ({}, {}) is outside the density grid",
                site.id, site.x, site.y
            ))
        })?;
        *counts.entry((row, col)).or_insert(0) += 1;
    }

    let cell_km2 = (cell_size / 1000.0).powi(2);
    let cells: Vec<DensityCell> = counts
        .into_iter()
        .map(|((row, col), count)| DensityCell {
            col,
            row,
            count,
            density: count as f64 / cell_km2,
        })
        .collect();

    let max_count = cells.iter().map(|c| c.count).max().unwrap_or(0);
    let mean_count = if cells.is_empty() {
        0.0
    } else {
        sites.len() as f64 / cells.len() as f64
    };

    debug!(
        sites = sites.len(),
        cells = cells.len(),
        max_count,
        "grid density computed"
    );

    Ok(DensityGrid {
        cell_size,
        cells,
        total: sites.len(),
        max_count,
        mean_count,
    })
}

/// For every site, in input order, the number of other sites within `radius` metres.
///
/// # Errors
///
/// [`GeoAnalysisError::InvalidArgument`] if `radius` is not positive and finite, or there are
/// more sites than a k-d tree can index.
pub fn kernel_density(sites: &[Site], radius: f64) -> Result<Vec<(PointId, usize)>> {
    check_positive("radius", radius)?;

    let mut builder = KDTreeBuilder::new(tree_capacity(sites.len())?);
    for site in sites {
        builder.add(site.id, site.x, site.y);
    }
    let tree = builder.finish();

    let count = |site: &Site| {
        let within = tree.within(site.x, site.y, radius);
        (site.id, within.len().saturating_sub(1))
    };

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        Ok(sites.par_iter().map(count).collect())
    }

    #[cfg(not(feature = "rayon"))]
    {
        Ok(sites.iter().map(count).collect())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::test::{clustered_points, sites_from_xy};

    #[test]
    fn grid_counts() {
        let sites = sites_from_xy(&[
            (10., 10.),
            (490., 499.),
            (500., 0.),
            (-1., -1.),
            (-499., -0.5),
            (1200., 1200.),
        ]);
        let grid = grid_density(&sites, 500.).unwrap();
        let cells: Vec<(i64, i64, usize)> =
            grid.cells.iter().map(|c| (c.col, c.row, c.count)).collect();
        assert_eq!(
            cells,
            vec![(-1, -1, 2), (0, 0, 2), (1, 0, 1), (2, 2, 1)]
        );
        assert_eq!(grid.total, 6);
        assert_eq!(grid.max_count, 2);
        assert_eq!(grid.mean_count, 1.5);
        // a 500 m cell is a quarter of a square kilometre
        assert_eq!(grid.cell_at(250., 250.).unwrap().density, 8.0);
        assert!(grid.cell_at(5_000., 5_000.).is_none());
        assert_eq!(grid.cell_center(-1, -1), (-250., -250.));
    }

    #[test]
    fn grid_preserves_total() {
        let sites = sites_from_xy(&clustered_points(1_000, 3));
        let grid = grid_density(&sites, 250.).unwrap();
        assert_eq!(grid.cells.iter().map(|c| c.count).sum::<usize>(), 1_000);
    }

    #[test]
    fn empty_input() {
        let grid = grid_density(&[], 100.).unwrap();
        assert!(grid.cells.is_empty());
        assert_eq!(grid.max_count, 0);
        assert_eq!(grid.mean_count, 0.0);
        assert!(kernel_density(&[], 10.).unwrap().is_empty());
    }

    #[test]
    fn invalid_sizes() {
        let sites = sites_from_xy(&[(0., 0.)]);
        for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
            assert!(grid_density(&sites, bad).is_err());
            assert!(kernel_density(&sites, bad).is_err());
        }
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn tree_capacity_is_bounded_by_ids() {
        assert_eq!(tree_capacity(3).unwrap(), 3);
        assert_eq!(tree_capacity(u32::MAX as usize).unwrap(), u32::MAX);
        assert!(matches!(
            tree_capacity(u32::MAX as usize + 1),
            Err(GeoAnalysisError::InvalidArgument(_))
        ));
    }

    #[test]
    fn kernel_counts_neighbours() {
        let sites = sites_from_xy(&[(0., 0.), (3., 4.), (6., 8.), (100., 100.), (0., 0.)]);
        let counts = kernel_density(&sites, 5.).unwrap();
        assert_eq!(
            counts,
            vec![
                (PointId(0), 2),
                (PointId(1), 3),
                (PointId(2), 1),
                (PointId(3), 0),
                (PointId(4), 2),
            ]
        );
    }
}
