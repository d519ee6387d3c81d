pub mod retry;
pub mod service;
