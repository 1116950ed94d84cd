//! Data layer: entity types, loading, linking, and querying.
//!
//! Architecture:
//! ```text
//!  neos.csv        cad.json
//!     │               │
//!     ▼               ▼
//!   ┌──────────────────────┐
//!   │        loader        │  parse files → Vec<NearEarthObject>, Vec<CloseApproach>
//!   └──────────────────────┘
//!              │
//!              ▼
//!   ┌──────────────────────┐
//!   │      NeoDatabase     │  designation/name indices, approach ↔ NEO links
//!   └──────────────────────┘
//!              │
//!              ▼
//!   ┌──────────────────────┐
//!   │        filter        │  criteria → AttributeFilter predicates, limit
//!   └──────────────────────┘
//! ```

pub mod database;
pub mod filter;
pub mod loader;
pub mod model;
pub mod time;
