mod client;
mod delete;
mod fetch;
mod pace;
#[cfg(test)]
pub mod testing;

pub use client::*;
pub use delete::*;
pub use fetch::*;
pub use pace::*;
