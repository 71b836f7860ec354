// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clean-Dedup: drop exact-duplicate entities (by content hash) and build
//! the per-drawing canvas artifact for the (out-of-scope) viewer.

use std::collections::{BTreeMap, HashSet};
use wf_core::{
    BBox, CanvasArtifact, CanvasLine, CleanDedupOutput, DedupStatistics, Entity, LayerCanvas,
};

/// FNV-1a, 64-bit, over the layer name's UTF-8 bytes.
fn fnv1a(bytes: &[u8]) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET_BASIS;
    for &b in bytes {
        hash ^= u64::from(b);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// Deterministic per-layer colour: FNV-1a(layer name) folded onto an HSL hue
/// wheel, fixed saturation/lightness, rendered as `#rrggbb`.
#[must_use]
pub fn layer_color(layer: &str) -> String {
    let hash = fnv1a(layer.as_bytes());
    let hue = (hash % 360) as f64;
    let (r, g, b) = hsl_to_rgb(hue, 0.55, 0.45);
    format!("#{r:02x}{g:02x}{b:02x}")
}

fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let h_prime = h / 60.0;
    let x = c * (1.0 - (h_prime.rem_euclid(2.0) - 1.0).abs());
    let (r1, g1, b1) = match h_prime as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let to_byte = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
    (to_byte(r1), to_byte(g1), to_byte(b1))
}

/// Run Clean-Dedup over Normalize's output entities.
///
/// Entities share an identical content hash if and only if they describe
/// the same `(layer, entity_type, canonical_geometry)` — `Normalize`
/// recomputes each entity's id from its rounded coordinates, so grouping by
/// [`Entity::id`] here *is* the hash-equality dedup rule of spec.md §4.4.
#[must_use]
pub fn run(entities: &[Entity]) -> CleanDedupOutput {
    let entities_in = entities.len() as u64;
    let mut seen = HashSet::new();
    let mut kept = Vec::with_capacity(entities.len());
    let mut duplicates_removed = 0u64;

    for entity in entities {
        if seen.insert(entity.id().clone()) {
            kept.push(entity.clone());
        } else {
            duplicates_removed += 1;
        }
    }

    let canvas = build_canvas(&kept, duplicates_removed, entities_in);
    CleanDedupOutput { entities: kept, canvas }
}

fn build_canvas(kept: &[Entity], duplicates_removed: u64, entities_in: u64) -> CanvasArtifact {
    let mut layers: BTreeMap<String, Vec<CanvasLine>> = BTreeMap::new();
    let mut bounds: Option<BBox> = None;

    for entity in kept {
        let Entity::Line(line) = entity else { continue };
        let canvas_line =
            CanvasLine { id: line.id.clone(), start: line.p1, end: line.p2, length: line.length };
        bounds = Some(match bounds {
            None => BBox::of_points(&[line.p1, line.p2]),
            Some(b) => b.union_point(line.p1).union_point(line.p2),
        });
        layers.entry(line.layer.clone()).or_default().push(canvas_line);
    }

    let layers = layers
        .into_iter()
        .map(|(name, lines)| {
            let color = layer_color(&name);
            (name, LayerCanvas { lines, color, visible: true })
        })
        .collect();

    let drawing_bounds = bounds.unwrap_or(BBox { min_x: 0.0, min_y: 0.0, max_x: 0.0, max_y: 0.0 });

    CanvasArtifact {
        drawing_bounds,
        layers,
        statistics: DedupStatistics {
            entities_in,
            entities_out: entities_in - duplicates_removed,
            duplicates_removed,
        },
    }
}
