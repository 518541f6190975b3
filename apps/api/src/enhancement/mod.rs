//! Resume improvement suggestions and job-description keyword matching.

pub mod enhancer;
pub mod handlers;
pub mod keywords;
pub mod models;
pub mod prompts;
pub mod suggestions;

pub use enhancer::ContentEnhancer;
