// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canonical byte encoding, content hashing, and deterministic UUID
//! derivation for the wall-geometry pipeline.
//!
//! Two entities that describe the same geometry on the same layer MUST
//! collide to the same [`EntityId`] regardless of which order their
//! coordinates were authored in; two detector passes over the same input
//! MUST derive the same [`Uuid`] for the same candidate pair. Both
//! properties live here, in one place, so Clean-Dedup and the detector
//! never have to agree on canonicalization by convention.
#![deny(unsafe_code)]
#![warn(missing_docs)]

use sha2::{Digest, Sha256};
use uuid::Uuid;
use wf_core::{EntityId, Point};

/// Namespace UUID for pair-id derivation, fixed so that re-runs across
/// process restarts and machines produce identical ids.
///
/// Generated once, out of band, and frozen: changing this value would
/// change every previously emitted `pair_id`.
pub const PAIR_ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6b, 0x3c, 0x6a, 0x9e, 0x0a, 0x6f, 0x4e, 0x2b, 0x9b, 0x0d, 0x2a, 0x77, 0x4f, 0x1c, 0x8e, 0x55,
]);

/// Format a single coordinate with fixed precision so that floating-point
/// representation noise never changes the canonical encoding. `v + 0.0`
/// collapses `-0.0` to `0.0` so the two don't hash differently.
fn encode_coord(buf: &mut Vec<u8>, v: f64) {
    buf.extend_from_slice(format!("{:.6}", v + 0.0).as_bytes());
}

fn encode_point(buf: &mut Vec<u8>, p: Point) {
    encode_coord(buf, p.x);
    buf.push(b',');
    encode_coord(buf, p.y);
}

/// Order two endpoints so a line's canonical encoding does not depend on
/// which endpoint was recorded first (`p1`-`p2` vs. `p2`-`p1`).
fn ordered_endpoints(p1: Point, p2: Point) -> (Point, Point) {
    if (p1.x, p1.y) <= (p2.x, p2.y) { (p1, p2) } else { (p2, p1) }
}

/// Canonical byte encoding of a line entity: `layer || "LINE" || min || max`.
#[must_use]
pub fn canonical_line_bytes(layer: &str, p1: Point, p2: Point) -> Vec<u8> {
    let (lo, hi) = ordered_endpoints(p1, p2);
    let mut buf = Vec::with_capacity(layer.len() + 32);
    buf.extend_from_slice(layer.as_bytes());
    buf.push(0);
    buf.extend_from_slice(b"LINE");
    buf.push(0);
    encode_point(&mut buf, lo);
    buf.push(b'|');
    encode_point(&mut buf, hi);
    buf
}

/// Canonical byte encoding of a block entity:
/// `layer || "BLOCK" || name || position || rotation`.
#[must_use]
pub fn canonical_block_bytes(layer: &str, name: &str, position: Point, rotation_deg: f64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(layer.len() + name.len() + 32);
    buf.extend_from_slice(layer.as_bytes());
    buf.push(0);
    buf.extend_from_slice(b"BLOCK");
    buf.push(0);
    buf.extend_from_slice(name.as_bytes());
    buf.push(0);
    encode_point(&mut buf, position);
    buf.push(b'|');
    encode_coord(&mut buf, rotation_deg);
    buf
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Derive the content-hash id for a line entity.
#[must_use]
pub fn hash_line(layer: &str, p1: Point, p2: Point) -> EntityId {
    EntityId::new(sha256_hex(&canonical_line_bytes(layer, p1, p2)))
}

/// Derive the content-hash id for a block entity.
#[must_use]
pub fn hash_block(layer: &str, name: &str, position: Point, rotation_deg: f64) -> EntityId {
    EntityId::new(sha256_hex(&canonical_block_bytes(layer, name, position, rotation_deg)))
}

/// Derive the content-hash id for a polyline entity, before Normalize
/// explodes it into lines. Not part of the dedup contract in spec.md
/// (dedup only defines Line/Block hashing) but entities need an id the
/// moment they're extracted, so polylines get one in the same style.
#[must_use]
pub fn hash_polyline(layer: &str, vertices: &[Point], closed: bool) -> EntityId {
    let mut buf = Vec::with_capacity(layer.len() + vertices.len() * 16 + 16);
    buf.extend_from_slice(layer.as_bytes());
    buf.push(0);
    buf.extend_from_slice(b"POLYLINE");
    buf.push(0);
    for v in vertices {
        encode_point(&mut buf, *v);
        buf.push(b'|');
    }
    buf.push(if closed { b'1' } else { b'0' });
    EntityId::new(sha256_hex(&buf))
}

/// Derive the deterministic `pair_id` for a candidate pair of line ids.
///
/// The two ids are sorted before hashing so `(a, b)` and `(b, a)` — which
/// the O(n²) detector visits as distinct index pairs — always produce the
/// same pair id.
#[must_use]
pub fn derive_pair_id(id1: &EntityId, id2: &EntityId) -> Uuid {
    let (lo, hi) = if id1.as_str() <= id2.as_str() { (id1, id2) } else { (id2, id1) };
    let name = format!("{}|{}", lo.as_str(), hi.as_str());
    Uuid::new_v5(&PAIR_ID_NAMESPACE, name.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_hash_is_direction_independent() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(100.0, 0.0);
        assert_eq!(hash_line("A-WALL", p1, p2), hash_line("A-WALL", p2, p1));
    }

    #[test]
    fn line_hash_differs_by_layer() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(100.0, 0.0);
        assert_ne!(hash_line("A-WALL", p1, p2), hash_line("A-WALL-EXT", p1, p2));
    }

    #[test]
    fn hash_is_64_hex_chars() {
        let id = hash_line("A-WALL", Point::new(1.0, 2.0), Point::new(3.0, 4.0));
        assert_eq!(id.as_str().len(), 64);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn pair_id_is_symmetric_and_stable() {
        let a = EntityId::new("aaaa".repeat(16));
        let b = EntityId::new("bbbb".repeat(16));
        let forward = derive_pair_id(&a, &b);
        let backward = derive_pair_id(&b, &a);
        assert_eq!(forward, backward);

        let again = derive_pair_id(&a, &b);
        assert_eq!(forward, again);
    }

    #[test]
    fn pair_id_differs_for_different_pairs() {
        let a = EntityId::new("aaaa".repeat(16));
        let b = EntityId::new("bbbb".repeat(16));
        let c = EntityId::new("cccc".repeat(16));
        assert_ne!(derive_pair_id(&a, &b), derive_pair_id(&a, &c));
    }
}
