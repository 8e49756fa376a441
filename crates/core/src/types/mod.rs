//! Core types for merchdrop.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;

pub use id::{LineId, VariantGid};
pub use price::{CurrencyCode, Price};
