// Copyright 2026 the Galley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod utils;

mod test_document;
mod test_movement;
