//! Central-difference gradients and the multichannel combination rule.

use labvision_core::ImageF32;

/// Per-pixel gradient of the dominant channel, row-major.
#[derive(Clone, Debug)]
pub(crate) struct GradientField {
    pub width: usize,
    pub height: usize,
    /// d/d(row), i.e. vertical.
    pub g_row: Vec<f64>,
    /// d/d(col), i.e. horizontal.
    pub g_col: Vec<f64>,
}

impl GradientField {
    #[inline]
    pub fn magnitude(&self, idx: usize) -> f64 {
        self.g_row[idx].hypot(self.g_col[idx])
    }

    /// Unsigned orientation in degrees, folded into `[0, 180)`.
    ///
    /// Rounding can produce exactly `180.0` for tiny negative angles; such
    /// samples fall outside every bin.
    #[inline]
    pub fn orientation_deg(&self, idx: usize) -> f64 {
        self.g_row[idx]
            .atan2(self.g_col[idx])
            .to_degrees()
            .rem_euclid(180.0)
    }
}

/// Gradients of one dense plane. Border rows/cols are zero.
fn plane_gradient(plane: &[f64], width: usize, height: usize) -> (Vec<f64>, Vec<f64>) {
    let mut g_row = vec![0.0; width * height];
    let mut g_col = vec![0.0; width * height];

    for y in 1..height.saturating_sub(1) {
        for x in 0..width {
            g_row[y * width + x] = plane[(y + 1) * width + x] - plane[(y - 1) * width + x];
        }
    }
    for y in 0..height {
        let row = y * width;
        for x in 1..width.saturating_sub(1) {
            g_col[row + x] = plane[row + x + 1] - plane[row + x - 1];
        }
    }

    (g_row, g_col)
}

/// Compute gradients for every channel and keep, per pixel, the channel with
/// the largest magnitude (the first channel wins ties).
pub(crate) fn dominant_gradient(img: &ImageF32, transform_sqrt: bool) -> GradientField {
    let (w, h) = (img.width, img.height);
    let mut best: Option<(Vec<f64>, Vec<f64>, Vec<f64>)> = None;

    for c in 0..img.channels {
        let plane: Vec<f64> = img
            .channel(c)
            .into_iter()
            .map(|v| {
                let v = f64::from(v);
                if transform_sqrt {
                    v.max(0.0).sqrt()
                } else {
                    v
                }
            })
            .collect();
        let (g_row, g_col) = plane_gradient(&plane, w, h);

        match best.as_mut() {
            None => {
                let mag = g_row
                    .iter()
                    .zip(&g_col)
                    .map(|(r, c)| r.hypot(*c))
                    .collect();
                best = Some((g_row, g_col, mag));
            }
            Some((best_row, best_col, best_mag)) => {
                for i in 0..w * h {
                    let m = g_row[i].hypot(g_col[i]);
                    if m > best_mag[i] {
                        best_mag[i] = m;
                        best_row[i] = g_row[i];
                        best_col[i] = g_col[i];
                    }
                }
            }
        }
    }

    let (g_row, g_col) = best
        .map(|(r, c, _)| (r, c))
        .unwrap_or_else(|| (vec![0.0; w * h], vec![0.0; w * h]));

    GradientField {
        width: w,
        height: h,
        g_row,
        g_col,
    }
}
