// SPDX-License-Identifier: MIT OR Apache-2.0
//! LOGIC_E: cluster collinear, co-thickness rectangles into bands and merge
//! each band's members end-to-end.

use crate::stages::geom_util::{canonical_direction, dot2, line_direction, point_on_axis, project_onto_line_at_param, project_scalar};
use wf_config::AlgorithmConfig;
use wf_core::{BBox, Point, TrimmedRectangle};

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self { parent: (0..n).collect() }
    }

    fn find(&mut self, x: usize) -> usize {
        if self.parent[x] != x {
            self.parent[x] = self.find(self.parent[x]);
        }
        self.parent[x]
    }

    fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra != rb {
            self.parent[ra] = rb;
        }
    }
}

fn rect_direction(rect: &TrimmedRectangle) -> (f64, f64) {
    canonical_direction(line_direction(rect.trimmed_segment_a.p1, rect.trimmed_segment_a.p2))
}

fn angle_diff_deg(u: (f64, f64), v: (f64, f64)) -> f64 {
    let cos_theta = dot2(u, v).clamp(-1.0, 1.0);
    cos_theta.acos().to_degrees()
}

/// Normal-direction offset of `rect`'s reference point from the global
/// origin, measured along `normal` (the perpendicular of `dir`).
fn normal_offset(rect: &TrimmedRectangle, dir: (f64, f64)) -> f64 {
    let normal = (-dir.1, dir.0);
    dot2((rect.trimmed_segment_a.p1.x, rect.trimmed_segment_a.p1.y), normal)
}

fn same_band(a: &TrimmedRectangle, b: &TrimmedRectangle, config: &AlgorithmConfig) -> bool {
    let da = rect_direction(a);
    let db = rect_direction(b);
    if angle_diff_deg(da, db) > config.band_angle_tolerance_deg {
        return false;
    }
    let offset_a = normal_offset(a, da);
    let offset_b = normal_offset(b, da);
    (offset_a - offset_b).abs() <= config.band_offset_tolerance_mm
}

fn round_key(v: f64) -> i64 {
    (v * 1000.0).round() as i64
}

fn band_sort_key(rect: &TrimmedRectangle) -> (i64, i64) {
    let dir = rect_direction(rect);
    let angle = dir.1.atan2(dir.0).to_degrees();
    (round_key(angle), round_key(normal_offset(rect, dir)))
}

struct Span {
    origin_a: Point,
    dir_a: (f64, f64),
    origin_b: Point,
    dir_b: (f64, f64),
    lo: f64,
    hi: f64,
    thickness: f64,
    source_pair_ids: Vec<uuid::Uuid>,
}

fn make_span(rect: &TrimmedRectangle, axis_origin: Point, axis_dir: (f64, f64)) -> Span {
    let lo = project_scalar(rect.trimmed_segment_a.p1, axis_origin, axis_dir)
        .min(project_scalar(rect.trimmed_segment_a.p2, axis_origin, axis_dir));
    let hi = project_scalar(rect.trimmed_segment_a.p1, axis_origin, axis_dir)
        .max(project_scalar(rect.trimmed_segment_a.p2, axis_origin, axis_dir));
    Span {
        origin_a: rect.trimmed_segment_a.p1,
        dir_a: line_direction(rect.trimmed_segment_a.p1, rect.trimmed_segment_a.p2),
        origin_b: rect.trimmed_segment_b.p1,
        dir_b: line_direction(rect.trimmed_segment_b.p1, rect.trimmed_segment_b.p2),
        lo,
        hi,
        thickness: rect.thickness(),
        source_pair_ids: rect.source_pair_ids.clone(),
    }
}

fn finish_span(span: Span, axis_origin: Point, axis_dir: (f64, f64)) -> TrimmedRectangle {
    let a_p1 = project_onto_line_at_param(span.origin_a, span.dir_a, axis_origin, axis_dir, span.lo);
    let a_p2 = project_onto_line_at_param(span.origin_a, span.dir_a, axis_origin, axis_dir, span.hi);
    let b_p1 = project_onto_line_at_param(span.origin_b, span.dir_b, axis_origin, axis_dir, span.lo);
    let b_p2 = project_onto_line_at_param(span.origin_b, span.dir_b, axis_origin, axis_dir, span.hi);
    let mut source_pair_ids = span.source_pair_ids;
    source_pair_ids.sort();
    source_pair_ids.dedup();
    TrimmedRectangle {
        trimmed_segment_a: wf_core::Segment::new(a_p1, a_p2),
        trimmed_segment_b: wf_core::Segment::new(b_p1, b_p2),
        bounding_rectangle: BBox::of_points(&[a_p1, a_p2, b_p1, b_p2]),
        source_pair_ids,
    }
}

/// Run LOGIC_E over LOGIC_D's rectangles: cluster into bands, merge
/// end-to-end within each band, and emit bands in deterministic
/// (sorted-by-band-key) order.
#[must_use]
pub fn run(rectangles: &[TrimmedRectangle], config: &AlgorithmConfig) -> Vec<TrimmedRectangle> {
    if rectangles.is_empty() {
        return Vec::new();
    }

    let mut uf = UnionFind::new(rectangles.len());
    for i in 0..rectangles.len() {
        for j in (i + 1)..rectangles.len() {
            if same_band(&rectangles[i], &rectangles[j], config) {
                uf.union(i, j);
            }
        }
    }

    let mut bands: std::collections::BTreeMap<usize, Vec<usize>> = std::collections::BTreeMap::new();
    for i in 0..rectangles.len() {
        let root = uf.find(i);
        bands.entry(root).or_default().push(i);
    }

    let mut merged_bands: Vec<((i64, i64), Vec<TrimmedRectangle>)> = Vec::new();

    for members in bands.values() {
        let axis_rect = &rectangles[members[0]];
        let axis_origin = axis_rect.trimmed_segment_a.p1;
        let axis_dir = rect_direction(axis_rect);
        let key = band_sort_key(axis_rect);

        let mut spans: Vec<Span> = members.iter().map(|&idx| make_span(&rectangles[idx], axis_origin, axis_dir)).collect();
        spans.sort_by(|a, b| a.lo.partial_cmp(&b.lo).unwrap());

        let mut merged_rects = Vec::new();
        let mut current = spans.remove(0);
        for next in spans {
            let mergeable = next.lo <= current.hi + config.band_join_gap_mm
                && (next.thickness - current.thickness).abs() <= config.band_thickness_tolerance_mm;
            if mergeable {
                current.hi = current.hi.max(next.hi);
                current.source_pair_ids.extend(next.source_pair_ids);
            } else {
                merged_rects.push(finish_span(current, axis_origin, axis_dir));
                current = next;
            }
        }
        merged_rects.push(finish_span(current, axis_origin, axis_dir));

        merged_bands.push((key, merged_rects));
    }

    merged_bands.sort_by(|a, b| a.0.cmp(&b.0));
    merged_bands.into_iter().flat_map(|(_, rects)| rects).collect()
}
