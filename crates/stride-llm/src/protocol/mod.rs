//! Vendor wire formats

pub mod anthropic;
pub mod openai;
