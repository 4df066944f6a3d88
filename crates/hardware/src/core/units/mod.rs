//! Functional components of the memory hierarchy.
//!
//! This module contains the set-associative cache level, its sets and its event
//! notification layer.

/// Cache level implementation with round-robin replacement and write-back.
pub mod cache;
