//! # Entity Search Expressions - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the entity search
//! expressions of a federated identity directory. An expression selects
//! entities (people, groups, login accounts) by type and by property
//! predicates.
//!
//! ## Architecture Overview
//!
//! The AST module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[operators]** - Comparison and boolean operators
//! - **[location]** - Storage location tags
//! - **[nodes]** - Predicate nodes and literals
//! - **[filter]** - The parsed expression root with its entity types
//!
//! ## Quick Start
//!
//! ```text
//! //entities[@xsi:type='PersonAccount' and uid='jdoe']
//! ```
//!
//! This selects person accounts whose `uid` is `jdoe`.
//!
//! ## Core Concepts
//!
//! ### Entity Types
//!
//! The `@xsi:type='...'` tests in front of the predicate name the entity
//! types searched. Several types are combined with `or` inside parentheses:
//!
//! ```text
//! //entities[(@xsi:type='PersonAccount' or @xsi:type='Group') and cn='a*']
//! ```
//!
//! ### Locations
//!
//! A property is stored either in the **repository** (the backing
//! directory) or in the **look-aside** store (a local overlay). Each node is
//! tagged with the location of everything below it. An `and`/`or` whose
//! operands are stored in different places becomes a
//! [`AstNode::FederationLogical`], and a parenthesis around one becomes a
//! [`AstNode::FederationParenthesis`]. Such subtrees cannot be handed to a
//! single store and have to be split by the caller.
//!
//! Without a metadata oracle every node is
//! [`Location::Unclassified`].
//!
//! ### Precedence
//!
//! `and` binds tighter than `or`. Parentheses are kept as explicit nodes so
//! the original grouping survives printing.
//!
//! ## Examples
//!
//! ### Type Only
//!
//! ```text
//! //entities[@xsi:type='Group']
//! ```
//!
//! ### Bare Predicate
//!
//! ```text
//! uid='jdoe' or mail='jdoe@example.com'
//! ```
//!
//! ### Grouping
//!
//! ```text
//! //entities[@xsi:type='PersonAccount' and sn='Doe' and (cn='J*' or uid='j*')]
//! ```
pub mod tokens;
pub mod operators;
pub mod location;
pub mod nodes;
pub mod filter;

pub use tokens::{Position, Token, TokenKind};
pub use operators::{BoolOp, CompOp};
pub use location::Location;
pub use nodes::{AstNode, Literal, PropertyRef, TYPE_PROPERTY};
pub use filter::{EntityTypeSet, Filter};
