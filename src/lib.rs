pub mod config;
pub mod export;
pub mod fetch_cache;
pub mod form;
pub mod html;
pub mod http_client;
pub mod injuries;
pub mod logging;
pub mod match_input;
pub mod pipeline;
pub mod predict;
pub mod retrieval;
pub mod state;
pub mod understat;
pub mod vote_pick;
pub mod worker;
