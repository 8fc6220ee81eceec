// Copyright 2026 QubitOS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Gate library and composition.
//!
//! Gates are dense d × d unitaries. A list is composed in application order,
//! so the first gate acts first and is the rightmost factor of the product.

pub mod compose;
pub mod library;

pub use compose::{compose, is_unitary, NetUnitary};
pub use library::{hadamard, identity, pauli_x, pauli_y, pauli_z, phase, reference_sequence};
