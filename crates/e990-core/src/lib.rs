pub mod config;
pub mod logging;

pub mod catalog;
pub mod classify;
pub mod fetch;
pub mod harvest;
pub mod part;
pub mod retry;
pub mod storage;
pub mod years;
