pub mod http;
pub mod rpc;
pub mod service;
