//! Near-Earth object explorer: an in-memory database of NEOs and their close
//! approaches to Earth, with designation/name lookup and filtered queries.

pub mod cli;
pub mod data;
pub mod output;

pub use data::database::NeoDatabase;
pub use data::filter::{create_filters, limit, AttributeFilter, Comparison, Criteria, FilterError};
pub use data::loader::{load_approaches, load_database, load_neos};
pub use data::model::{ApproachRef, CloseApproach, NearEarthObject};
