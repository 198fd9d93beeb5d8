pub mod handlers;
pub mod middleware;
pub mod providers;
pub mod routes;
pub mod searches;

pub use routes::create_router;
