/*
* Bilibili crawling: the API client, location extraction from
* descriptions, and the background sync sweep.
*/

pub mod bilibili;
pub mod location;
pub mod sync;

pub use bilibili::BilibiliClient;
