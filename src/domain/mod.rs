mod credential;
mod parse;
mod text;
mod types;

pub use credential::*;
pub use parse::*;
pub use text::*;
pub use types::*;
