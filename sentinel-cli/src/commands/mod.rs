pub mod backup;
pub mod config;
pub mod purge;
pub mod run;
pub mod status;
