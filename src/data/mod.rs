//! Data layer: core types, loading, filtering and growth statistics.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → EvDataset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ EvDataset  │  Vec<EvRecord>, unique years / regions / powertrains
//!   └───────────┘
//!        │
//!        ├──────────────────┐
//!        ▼                  ▼
//!   ┌──────────┐      ┌──────────┐
//!   │  filter   │      │  growth   │  percentage change between two years
//!   └──────────┘      └──────────┘
//!   region/powertrain
//!   rows → year series
//! ```

pub mod filter;
pub mod growth;
pub mod loader;
pub mod model;
