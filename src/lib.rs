// Library for tests to access modules

pub mod bus;
pub mod collector;
pub mod config;
pub mod discovery;
pub mod models;
pub mod publisher;
pub mod scheduler;
pub mod series;
pub mod version;
pub mod xo_client;
