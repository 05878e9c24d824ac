//! Types shared by the HTTP layer.

mod response;

pub use response::{ApiResponse, Empty};
