pub mod extractor;
pub mod extractor_utils;
pub mod parser;
pub mod visitor;


pub use extractor::*;
pub use parser::*;
pub use visitor::*;
