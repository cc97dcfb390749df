// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small geometry helpers shared across the crate.

/// An axis-aligned rectangle in document pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Float comparison with a tolerance suited to pixel arithmetic.
pub fn nearly_eq(a: f32, b: f32) -> bool {
    (a - b).abs() <= 1e-4
}
