pub mod classifier;
pub mod dispatcher;
pub mod fetcher;
pub mod http_client;
pub mod link_patterns;
pub mod pipeline;
pub mod ranker;
pub mod registry;
