/*
* Registration, login and logout. Sessions are UUID tokens in Redis.
*/

pub mod handler;
pub mod routes;

pub use routes::{auth_routes, logout_route};
