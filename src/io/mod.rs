// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - STL export and import, JSON dumps of build results

pub mod dump;
pub mod stl;

pub use dump::{dump_result, ResultDump};
pub use stl::{read_stl, write_stl, PartSelection};
