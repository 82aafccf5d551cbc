pub mod client;
pub mod dispatcher;
pub mod ops;
pub mod registry;
pub mod rpc;
