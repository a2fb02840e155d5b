//! Gradient-directed circular Hough transform.
//!
//! Every edge point casts votes along its gradient line, in both directions,
//! for all distances inside the radius window. Votes are split bilinearly
//! between the four nearest accumulator cells. Centers are local maxima of
//! the Gaussian-smoothed accumulator; their support is the raw vote mass in
//! a small window around the maximum, so edges whose lines miss the center
//! by a pixel or two still count. Radii are then recovered per center from a
//! histogram of edge distances, so one center may yield several concentric
//! circles.

use crate::segment::gradient::EdgePoint;
use crate::segment::smooth::{blur, GaussianKernel1D};
use crate::segment::{Circle, SegmentConfig};
use std::cmp::Ordering;
use std::f32::consts::PI;

/// Center vote accumulator with `1 / resolution` cells per image pixel.
pub(crate) struct Accumulator {
    width: usize,
    height: usize,
    resolution: f32,
    votes: Vec<f32>,
}

/// Accepted vote peak in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct CenterPeak {
    pub x: f32,
    pub y: f32,
    /// Raw vote mass inside the peak window.
    pub support: f32,
}

impl Accumulator {
    pub(crate) fn new(img_width: usize, img_height: usize, resolution: f32) -> Self {
        let width = (img_width as f32 / resolution).ceil() as usize + 1;
        let height = (img_height as f32 / resolution).ceil() as usize + 1;
        Self {
            width,
            height,
            resolution,
            votes: vec![0.0; width * height],
        }
    }

    /// Casts unit votes for every edge point along its gradient line.
    pub(crate) fn vote(
        &mut self,
        edges: &[EdgePoint],
        img_width: usize,
        img_height: usize,
        cfg: &SegmentConfig,
    ) {
        let max_x = img_width as f32;
        let max_y = img_height as f32;
        for edge in edges {
            for sign in [1.0f32, -1.0] {
                for r in cfg.min_radius..=cfg.max_radius {
                    let dist = sign * r as f32;
                    let cx = edge.x + dist * edge.ux;
                    let cy = edge.y + dist * edge.uy;
                    if cx < 0.0 || cy < 0.0 || cx >= max_x || cy >= max_y {
                        break;
                    }
                    self.bilinear_add(cx / self.resolution, cy / self.resolution);
                }
            }
        }
    }

    fn bilinear_add(&mut self, ax: f32, ay: f32) {
        let x0 = ax.floor() as usize;
        let y0 = ay.floor() as usize;
        if x0 + 1 >= self.width || y0 + 1 >= self.height {
            return;
        }
        let fx = ax - x0 as f32;
        let fy = ay - y0 as f32;
        let base = y0 * self.width + x0;
        self.votes[base] += (1.0 - fx) * (1.0 - fy);
        self.votes[base + 1] += fx * (1.0 - fy);
        self.votes[base + self.width] += (1.0 - fx) * fy;
        self.votes[base + self.width + 1] += fx * fy;
    }

    /// Returns vote peaks ordered by descending support, spaced apart by at
    /// least `min_center_distance` image pixels.
    pub(crate) fn peaks(&self, cfg: &SegmentConfig) -> Vec<CenterPeak> {
        let w = self.width;
        let h = self.height;
        let kernel = GaussianKernel1D::new(cfg.accumulator_sigma);
        let smoothed = blur(&self.votes, w, h, &kernel);
        let window = ((2.0 * cfg.accumulator_sigma).ceil() as usize).max(1);
        let threshold = cfg.accumulator_threshold as f32;

        let mut cells: Vec<(usize, usize, f32)> = Vec::new();
        for y in 0..h {
            for x in 0..w {
                let v = smoothed[y * w + x];
                if v <= 0.0 || !is_local_max(&smoothed, w, h, x, y) {
                    continue;
                }
                let support = self.window_sum(x, y, window);
                if support >= threshold {
                    cells.push((x, y, support));
                }
            }
        }
        cells.sort_by(|a, b| {
            b.2.partial_cmp(&a.2)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
                .then(a.0.cmp(&b.0))
        });

        let min_dist_sq = cfg.min_center_distance * cfg.min_center_distance;
        let mut kept: Vec<CenterPeak> = Vec::new();
        for (x, y, support) in cells {
            let (cx, cy) = self.refine(x, y, window);
            let far_enough = kept.iter().all(|k| {
                let dx = k.x - cx;
                let dy = k.y - cy;
                dx * dx + dy * dy >= min_dist_sq
            });
            if far_enough {
                kept.push(CenterPeak {
                    x: cx,
                    y: cy,
                    support,
                });
            }
        }
        kept
    }

    fn window_bounds(&self, x: usize, y: usize, window: usize) -> (usize, usize, usize, usize) {
        (
            x.saturating_sub(window),
            (x + window).min(self.width - 1),
            y.saturating_sub(window),
            (y + window).min(self.height - 1),
        )
    }

    fn window_sum(&self, x: usize, y: usize, window: usize) -> f32 {
        let (x0, x1, y0, y1) = self.window_bounds(x, y, window);
        (y0..=y1)
            .map(|ny| {
                let row = ny * self.width;
                self.votes[row + x0..=row + x1].iter().sum::<f32>()
            })
            .sum()
    }

    /// Vote-weighted centroid of the raw votes in the peak window, in image
    /// pixels.
    fn refine(&self, x: usize, y: usize, window: usize) -> (f32, f32) {
        let (x0, x1, y0, y1) = self.window_bounds(x, y, window);
        let mut sum = 0.0f32;
        let mut sx = 0.0f32;
        let mut sy = 0.0f32;
        for ny in y0..=y1 {
            for nx in x0..=x1 {
                let v = self.votes[ny * self.width + nx];
                sum += v;
                sx += v * nx as f32;
                sy += v * ny as f32;
            }
        }
        if sum <= 0.0 {
            return (x as f32 * self.resolution, y as f32 * self.resolution);
        }
        (sx / sum * self.resolution, sy / sum * self.resolution)
    }
}

// Plateaus keep their first cell in scan order.
fn is_local_max(map: &[f32], w: usize, h: usize, x: usize, y: usize) -> bool {
    let v = map[y * w + x];
    for dy in -1isize..=1 {
        for dx in -1isize..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as isize + dx;
            let ny = y as isize + dy;
            if nx < 0 || ny < 0 || nx >= w as isize || ny >= h as isize {
                continue;
            }
            let n = map[ny as usize * w + nx as usize];
            let earlier = dy < 0 || (dy == 0 && dx < 0);
            if n > v || (earlier && n == v) {
                return false;
            }
        }
    }
    true
}

/// Recovers the radii supported by edge points around `center`.
///
/// An edge point counts for a radius when its gradient is roughly radial with
/// respect to the center. Candidate radii are local maxima of a three-bin
/// window whose support, normalized by the circumference, reaches
/// `radius_support`; accepted radii are at least `min_radius_gap` apart.
pub(crate) fn radii_for_center(
    center: CenterPeak,
    edges: &[EdgePoint],
    cfg: &SegmentConfig,
) -> Vec<Circle> {
    let max_bin = cfg.max_radius as usize + 1;
    let mut hist = vec![0u32; max_bin + 2];
    for edge in edges {
        let dx = edge.x - center.x;
        let dy = edge.y - center.y;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist < 1.0 {
            continue;
        }
        let radial = (edge.ux * dx + edge.uy * dy).abs() / dist;
        if radial < cfg.gradient_alignment {
            continue;
        }
        let bin = dist.round() as usize;
        if bin <= max_bin {
            hist[bin] += 1;
        }
    }

    let support = |r: usize| hist[r - 1] + hist[r] + hist[r + 1];
    let mut candidates: Vec<(usize, f32)> = Vec::new();
    for r in cfg.min_radius as usize..=cfg.max_radius as usize {
        let s = support(r);
        if s == 0 {
            continue;
        }
        let is_peak = s >= support(r - 1).max(support(r + 1));
        let ratio = s as f32 / (2.0 * PI * r as f32);
        if is_peak && ratio >= cfg.radius_support {
            candidates.push((r, ratio));
        }
    }
    candidates.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    let mut kept: Vec<usize> = Vec::new();
    for (r, _) in candidates {
        if kept
            .iter()
            .all(|&k| r.abs_diff(k) >= cfg.min_radius_gap as usize)
        {
            kept.push(r);
        }
    }

    kept.into_iter()
        .map(|r| {
            let s = support(r) as f32;
            let weighted = ((r - 1) as f32 * hist[r - 1] as f32
                + r as f32 * hist[r] as f32
                + (r + 1) as f32 * hist[r + 1] as f32)
                / s;
            Circle::new(center.x, center.y, weighted)
        })
        .collect()
}
