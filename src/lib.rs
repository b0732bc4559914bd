pub mod booking;
pub mod config;
pub mod error;
pub mod fake_feed;
pub mod feed_file;
pub mod filter;
pub mod ledger;
pub mod logging;
pub mod state;
pub mod win_prob;
