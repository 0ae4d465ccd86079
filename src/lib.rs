pub mod ast;
pub mod cli;
pub mod evaluator;
pub mod lexer;
pub mod oracle;
pub mod output;
pub mod parser;
pub mod planner;

pub use ast::{AstNode, BoolOp, CompOp, EntityTypeSet, Filter, Literal, Location, Token, TokenKind};
pub use evaluator::{EvalError, matches, merge};
pub use lexer::Lexer;
pub use oracle::{MetadataOracle, OracleError, PropertyMapping};
pub use output::to_tree_string;
pub use parser::{ErrorKind, ParseError, Parser, parse};
pub use planner::{SearchPlan, plan};
