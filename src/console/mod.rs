//! Console-side helpers for presenting and exporting configuration safely.

pub mod masking;
