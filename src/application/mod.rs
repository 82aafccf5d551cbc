pub mod config;
pub mod logging;
pub mod records;
pub mod rpc;
