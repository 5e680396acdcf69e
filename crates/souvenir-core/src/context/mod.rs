//! Reflective context assembly for Souvenir.
//!
//! This module renders retrieved exchanges into the text block that is
//! prepended to the model's next turn.

pub mod assembler;
