pub mod logging;
pub mod service_node;
