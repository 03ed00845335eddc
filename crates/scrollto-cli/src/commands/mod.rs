pub mod config;
pub mod curve;
pub mod easings;
pub mod run;
