//! Incidents - Similar-Incident Search over Clustered Support Data
//!
//! Loads a CSV of support incidents that already carry a cluster label,
//! finds incidents whose short-description tags resemble a query, and
//! summarizes the matches by cluster, state and assignee.

pub mod commands;
pub mod config;
pub mod dataset;
pub mod display;
pub mod explore;
pub mod notes;
pub mod ranker;
pub mod tags;
pub mod vectorizer;

pub use config::Config;
pub use dataset::{Dataset, Incident};
pub use explore::{explore, ClusterFilter, Exploration};
pub use ranker::{rank, Matches, Tagged};
pub use tags::normalize;
