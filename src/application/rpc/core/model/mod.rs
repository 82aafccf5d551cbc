pub mod json;
pub mod message;
pub mod record;
pub mod version;
