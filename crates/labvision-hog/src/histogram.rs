//! Cell orientation histograms and block normalization.

use crate::gradient::GradientField;
use crate::{BlockNorm, HogParams};

const EPS: f64 = 1e-5;
const L2_HYS_CLIP: f64 = 0.2;

/// Orientation histograms for every cell, laid out `[cell_row][cell_col][bin]`.
#[derive(Clone, Debug)]
pub(crate) struct CellGrid {
    pub rows: usize,
    pub cols: usize,
    pub bins: usize,
    pub values: Vec<f64>,
}

impl CellGrid {
    #[inline]
    fn cell(&self, r: usize, c: usize) -> &[f64] {
        let start = (r * self.cols + c) * self.bins;
        &self.values[start..start + self.bins]
    }
}

/// Map an orientation in degrees to a bin over `[0, 180)`.
///
/// Returns `None` when rounding pushed the angle onto `180.0`.
#[inline]
fn orientation_to_bin(deg: f64, bins: usize) -> Option<usize> {
    let width = 180.0 / bins as f64;
    let idx = (deg / width).floor();
    if idx < 0.0 {
        return Some(0);
    }
    let idx = idx as usize;
    (idx < bins).then_some(idx)
}

/// Accumulate magnitude-weighted orientation histograms per cell.
///
/// Pixels beyond the last full cell are ignored. Each bin is averaged over
/// the cell area.
pub(crate) fn cell_histograms(field: &GradientField, params: &HogParams) -> CellGrid {
    let [cell_h, cell_w] = params.pixels_per_cell;
    let bins = params.orientations;
    let rows = field.height / cell_h;
    let cols = field.width / cell_w;
    let area = (cell_h * cell_w) as f64;

    let mut values = vec![0.0; rows * cols * bins];
    for r in 0..rows {
        for c in 0..cols {
            let hist = &mut values[(r * cols + c) * bins..(r * cols + c + 1) * bins];
            for y in r * cell_h..(r + 1) * cell_h {
                for x in c * cell_w..(c + 1) * cell_w {
                    let idx = y * field.width + x;
                    let mag = field.magnitude(idx);
                    if mag == 0.0 {
                        continue;
                    }
                    if let Some(bin) = orientation_to_bin(field.orientation_deg(idx), bins) {
                        hist[bin] += mag;
                    }
                }
            }
            for v in hist.iter_mut() {
                *v /= area;
            }
        }
    }

    CellGrid {
        rows,
        cols,
        bins,
        values,
    }
}

fn normalize_block(block: &mut [f64], norm: BlockNorm) {
    match norm {
        BlockNorm::L1 => {
            let s: f64 = block.iter().map(|v| v.abs()).sum::<f64>() + EPS;
            block.iter_mut().for_each(|v| *v /= s);
        }
        BlockNorm::L1Sqrt => {
            let s: f64 = block.iter().map(|v| v.abs()).sum::<f64>() + EPS;
            block.iter_mut().for_each(|v| *v = (*v / s).sqrt());
        }
        BlockNorm::L2 => l2(block),
        BlockNorm::L2Hys => {
            l2(block);
            block.iter_mut().for_each(|v| *v = v.min(L2_HYS_CLIP));
            l2(block);
        }
    }
}

fn l2(block: &mut [f64]) {
    let s = (block.iter().map(|v| v * v).sum::<f64>() + EPS * EPS).sqrt();
    block.iter_mut().for_each(|v| *v /= s);
}

/// Slide a block window with one-cell stride and write normalized blocks in
/// block-row, block-col, cell-row, cell-col, bin order.
pub(crate) fn normalized_blocks(cells: &CellGrid, params: &HogParams) -> Vec<f64> {
    let [b_rows, b_cols] = params.cells_per_block;
    let n_rows = cells.rows + 1 - b_rows;
    let n_cols = cells.cols + 1 - b_cols;
    let block_len = params.block_len();

    let mut out = Vec::with_capacity(n_rows * n_cols * block_len);
    let mut block = Vec::with_capacity(block_len);
    for br in 0..n_rows {
        for bc in 0..n_cols {
            block.clear();
            for r in br..br + b_rows {
                for c in bc..bc + b_cols {
                    block.extend_from_slice(cells.cell(r, c));
                }
            }
            normalize_block(&mut block, params.block_norm);
            out.extend_from_slice(&block);
        }
    }
    out
}
