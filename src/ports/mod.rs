//! Port traits: the boundaries between the screening domain and its collaborators.

pub mod config_port;
pub mod data_port;
pub mod report_port;
