/*
* Influencer listing, creation and per-influencer video queries.
*/

pub mod handler;
pub mod routes;

pub use routes::influencer_routes;
