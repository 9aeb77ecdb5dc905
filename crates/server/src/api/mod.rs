pub mod handlers;
pub mod middleware;
pub mod proxies;
pub mod routes;

pub use routes::create_router;
