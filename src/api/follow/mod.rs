/*
* The follow toggle and the authenticated user's following feed.
*/

pub mod handler;
pub mod routes;

pub use routes::follow_routes;
