mod batch;
mod lexer;
mod parser;
mod token;
mod transaction;

pub use batch::parse_files;
pub use lexer::{fields, Lexeme, Lexer};
pub use parser::*;
pub use token::Token;
pub use transaction::parse_transaction;
