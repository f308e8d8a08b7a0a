pub mod access;
pub mod feedback;
pub mod handlers;
pub mod links;
pub mod routes;
pub mod session;
pub mod snippets;
pub mod templates;

pub use routes::create_router;
