//! Resume structuring: text in, `StructuredResume` out, through whichever
//! provider was asked for or recommended.

pub mod basic;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod structurer;

pub use structurer::ResumeStructurer;
