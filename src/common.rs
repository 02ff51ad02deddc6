pub mod error;
pub mod json;
pub mod response;
pub mod serde_utils;
