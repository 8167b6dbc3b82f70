pub mod base;
pub mod configs;
pub mod factory;
pub mod groq;
pub mod openai;
pub mod utils;

#[cfg(test)]
pub mod mock;
