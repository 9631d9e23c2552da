pub mod cache;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod scanner;
pub mod session;

#[cfg(test)]
mod test_support;
