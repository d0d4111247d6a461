//! Output back ends for compiled sheets.
//!
//! Both back ends read the same resolved type catalog, so the generated
//! types and the JSON documents always agree on names and shapes.
//!
//! # Pipeline Position
//!
//! ```text
//! Sheet Grid
//!     ↓ parse
//! Sheet Schema
//!     ↓ catalog + resolve
//! Resolved Types + Materialized Rows
//!     ↓ export (this module)
//! C# Source Units + JSON Document
//! ```
//!
//! # Available Back Ends
//!
//! - [`csharp`]: one source unit per sheet plus the shared support units
//! - [`json`]: one data document per sheet with a Design or Constant block

pub mod csharp;
pub mod json;
