pub mod errors;
pub mod handler;
pub mod handlers;
pub mod pg_store;
pub mod registry;
pub mod scheduler;
pub mod store;

pub use errors::*;
pub use handler::*;
pub use handlers::*;
pub use pg_store::*;
pub use registry::*;
pub use scheduler::*;
pub use store::*;
