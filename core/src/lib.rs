pub mod booking;
pub mod catalog;
pub mod model;
pub mod params;
pub mod persist;
pub mod query;
pub mod session;
pub mod text;

pub use catalog::Catalog;
pub use model::{Review, SalonId, SalonRecord, SalonSummary, ServiceOffering, ServiceType, Specialist};
pub use params::{QueryParameters, SortKey};
pub use query::{query, QueryResult, DEFAULT_PAGE_SIZE};
