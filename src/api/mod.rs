/*
* HTTP API surface: route groups plus the session middleware.
*/

pub mod auth;
pub mod follow;
pub mod health;
pub mod influencers;
pub mod middleware;
