//! Core data models for works requests, pages and records.

mod page;
mod request;
mod work;

pub use page::WorksPage;
pub use request::{from_pub_date_filter, WorksRequest, DEEP_PAGING_CURSOR};
pub use work::Work;
