// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Document editing: cursor addressing and the mutation facade.

mod cursor;
mod document;

pub use cursor::Cursor;
pub use document::{Document, SnapshotHandle};
