//! Hybrid retrieval and relevance engine for a multi-religion scripture corpus.
//!
//! - [`authority`]: layered 1–10 authority resolution with reloadable defaults
//! - [`query`]: trailing parenthetical filter parsing and filter expressions
//! - [`highlight`]: fuzzy anchor matching and sentence location
//! - [`search`]: federated keyword/vector request building and the index client
//! - [`research`]: multi-query research plan execution

pub mod authority;
pub mod config;
pub mod embedding;
pub mod errors;
pub mod highlight;
pub mod logging;
pub mod query;
pub mod research;
pub mod search;
