// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph layout: greedy line breaking, the paragraph list, and the
//! background re-wrap worker.

mod list;
mod paragraph;
mod rewrap;
pub(crate) mod wrap;

pub use list::ParagraphList;
pub use paragraph::Paragraph;
pub use rewrap::Rewrapper;
pub use wrap::BreakList;

pub(crate) use list::glyph_segments;
