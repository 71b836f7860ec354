// SPDX-License-Identifier: MIT OR Apache-2.0
//! The eleven pipeline stages, one module each, in execution order.

pub mod clean_dedup;
pub mod detector;
pub mod door_bridge;
pub mod door_rectangle_assignment;
pub mod extract;
pub mod geom_util;
pub mod logic_b;
pub mod logic_c;
pub mod logic_d;
pub mod logic_e;
pub mod normalize;
pub mod parallel_naive;
pub mod wall_candidates_placeholder;
