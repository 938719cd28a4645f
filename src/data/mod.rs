//! Data layer: survey records, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  .parquet / .json / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse + validate file → Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Table    │  Vec<Record>, read-only
//!   └──────────┘
//!        │   FilterSelection (year, region, districts)
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  keep matching records
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate │  per-month category % (×4 indicators)
//!   └───────────┘
//! ```
//!
//! `pipeline` ties filter and aggregate together for one filter change.

pub mod aggregate;
pub mod filter;
pub mod loader;
pub mod model;
pub mod pipeline;
