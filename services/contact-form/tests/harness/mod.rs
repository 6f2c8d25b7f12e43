// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for contact form abuse simulation.
//!
//! Generators for submitters and hostile input, attack patterns, and an
//! outcome collector used by `security_test.rs`.

pub mod attacks;
pub mod generators;
pub mod metrics;
