pub mod ast;
pub mod emit;
pub mod utils;

pub use emit::{print, Emit};
