use std::str::FromStr;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, trace};

use crate::{
    ast::{AstNode, BoolOp, CompOp, EntityTypeSet, Filter, Literal, Location, Token, TokenKind, TYPE_PROPERTY},
    lexer::Lexer,
    oracle::{MetadataOracle, OracleError},
};

/// Entity type used for classification when an expression names none and no
/// default types were configured. Every directory entity type derives from it.
pub const DEFAULT_ENTITY_TYPE: &str = "Entity";

/// Deepest predicate accepted. Each parenthesis and each `and`/`or`
/// continuation is one level.
pub const MAX_NESTING_DEPTH: usize = 256;

/// Continuations accepted after a complete predicate.
const PREDICATE_FOLLOW: [TokenKind; 2] = [TokenKind::And, TokenKind::Or];

/// Continuations accepted after a complete type list.
const TYPE_LIST_FOLLOW: [TokenKind; 1] = [TokenKind::Or];

/// Errors that can occur while parsing a search expression.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The token stream does not match the grammar
    #[error("syntax error: unexpected {found}, expected {}", describe_expected(.expected))]
    Syntax {
        found: Token,
        expected: Vec<TokenKind>,
    },

    /// A property is stored neither in the repository nor in the look-aside
    /// store for any of the searched entity types
    #[error(
        "property '{property}' is not supported by the repository or the look-aside store for entity types [{}]",
        .entity_types.join(", ")
    )]
    UnsupportedAttribute {
        property: String,
        entity_types: Vec<String>,
    },

    /// The metadata oracle itself failed
    #[error("property metadata lookup failed: {0}")]
    Oracle(#[source] OracleError),

    /// The predicate nests deeper than [`MAX_NESTING_DEPTH`]
    #[error("expression nested more than {limit} levels deep at {found}")]
    NestingTooDeep { found: Token, limit: usize },
}

/// Coarse category of a [`ParseError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Syntax,
    UnsupportedAttribute,
    Oracle,
    NestingTooDeep,
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Syntax { .. } => ErrorKind::Syntax,
            ParseError::UnsupportedAttribute { .. } => ErrorKind::UnsupportedAttribute,
            ParseError::Oracle(_) => ErrorKind::Oracle,
            ParseError::NestingTooDeep { .. } => ErrorKind::NestingTooDeep,
        }
    }

    fn syntax(found: &Token, expected: &[TokenKind]) -> Self {
        ParseError::Syntax {
            found: found.clone(),
            expected: expected.to_vec(),
        }
    }

    /// Of two syntax errors, the one that got further into the input. On a
    /// tie the expected sets are merged.
    fn furthest(self, other: ParseError) -> ParseError {
        match (self, other) {
            (
                ParseError::Syntax { found, expected },
                ParseError::Syntax {
                    found: other_found,
                    expected: other_expected,
                },
            ) => {
                if other_found.position.offset > found.position.offset {
                    ParseError::Syntax {
                        found: other_found,
                        expected: other_expected,
                    }
                } else if other_found.position.offset == found.position.offset {
                    ParseError::Syntax { found, expected }.also_expecting(&other_expected)
                } else {
                    ParseError::Syntax { found, expected }
                }
            }
            (first, _) => first,
        }
    }

    /// Adds `kinds` to the expected set of a syntax error.
    fn also_expecting(self, kinds: &[TokenKind]) -> ParseError {
        match self {
            ParseError::Syntax { found, mut expected } => {
                for kind in kinds {
                    if !expected.contains(kind) {
                        expected.push(*kind);
                    }
                }
                ParseError::Syntax { found, expected }
            }
            other => other,
        }
    }
}

fn describe_expected(expected: &[TokenKind]) -> String {
    match expected {
        [] => "nothing".to_string(),
        [only] => only.to_string(),
        _ => {
            let kinds: Vec<String> = expected.iter().map(|k| k.to_string()).collect();
            format!("one of {}", kinds.join(", "))
        }
    }
}

/// Read position in a token slice. Copying a cursor is how speculative
/// parses rewind.
#[derive(Debug, Clone, Copy)]
struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

type Step<'t, T> = Result<(T, Cursor<'t>), ParseError>;

impl<'t> Cursor<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    fn peek(&self) -> &'t Token {
        // The lexer always terminates the slice with Eof.
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.pos.min(last)]
    }

    fn kind(&self) -> TokenKind {
        self.peek().kind
    }

    fn advance(self) -> Self {
        Cursor {
            tokens: self.tokens,
            pos: self.pos + 1,
        }
    }

    /// Nesting level below `depth`, or an error past the limit.
    fn deeper(&self, depth: usize) -> Result<usize, ParseError> {
        if depth >= MAX_NESTING_DEPTH {
            Err(ParseError::NestingTooDeep {
                found: self.peek().clone(),
                limit: MAX_NESTING_DEPTH,
            })
        } else {
            Ok(depth + 1)
        }
    }

    fn expect(self, kind: TokenKind) -> Step<'t, &'t Token> {
        self.expect_one_of(&[kind])
    }

    fn expect_one_of(self, kinds: &[TokenKind]) -> Step<'t, &'t Token> {
        let token = self.peek();
        if kinds.contains(&token.kind) {
            Ok((token, self.advance()))
        } else {
            Err(ParseError::syntax(token, kinds))
        }
    }
}

type Production<'o, 't> = fn(&Parser<'o>, Cursor<'t>) -> Step<'t, Filter>;

/// Parses entity search expressions and classifies property locations.
///
/// A parser only holds its configuration; every call to [`Parser::parse`]
/// starts from scratch, so one instance can be reused for any number of
/// expressions.
///
/// # Examples
///
/// ```
/// use wim_xpath::parser::Parser;
/// use wim_xpath::ast::{AstNode, Location};
///
/// let filter = Parser::new(None)
///     .parse("//entities[@xsi:type='PersonAccount' and uid='jdoe']")
///     .unwrap();
///
/// assert_eq!(filter.entity_types.as_slice(), ["PersonAccount"]);
/// assert!(matches!(
///     filter.predicate,
///     Some(AstNode::Property { location: Location::Unclassified, .. })
/// ));
/// ```
#[derive(Clone, Copy)]
pub struct Parser<'o> {
    oracle: Option<&'o dyn MetadataOracle>,
    default_entity_types: &'o [String],
}

impl<'o> Parser<'o> {
    pub fn new(oracle: Option<&'o dyn MetadataOracle>) -> Self {
        Parser {
            oracle,
            default_entity_types: &[],
        }
    }

    /// Entity types used for classification when an expression does not
    /// name any.
    pub fn with_default_entity_types(mut self, types: &'o [String]) -> Self {
        self.default_entity_types = types;
        self
    }

    /// Parse a complete search expression.
    pub fn parse(&self, input: &str) -> Result<Filter, ParseError> {
        let tokens = Lexer::new(input).tokenize();
        let cur = Cursor::new(&tokens);

        debug!(expression = input, classify = self.oracle.is_some(), "parsing search expression");

        let (filter, _) = if cur.kind() == TokenKind::DoubleSlash {
            let cur = self.entities_path(cur.advance())?;
            self.alternatives(cur, &[TokenKind::RBracket, TokenKind::Eof])?
        } else {
            self.alternatives(cur, &[TokenKind::Eof])?
        };

        debug!(
            entity_types = ?filter.entity_types.as_slice(),
            federated = filter.is_federated(),
            "parsed search expression"
        );
        Ok(filter)
    }

    /// `entities [` after the leading `//`.
    fn entities_path<'t>(&self, cur: Cursor<'t>) -> Result<Cursor<'t>, ParseError> {
        let (name, cur) = cur.expect(TokenKind::Name)?;
        if !name.text.eq_ignore_ascii_case("entities") {
            return Err(ParseError::syntax(name, &[TokenKind::Name]));
        }
        let (_, cur) = cur.expect(TokenKind::LBracket)?;
        Ok(cur)
    }

    /// Ordered choice between the expression forms, each of which must be
    /// followed by `end`. Only syntax errors fall through to the next form.
    fn alternatives<'t>(&self, cur: Cursor<'t>, end: &[TokenKind]) -> Step<'t, Filter> {
        let choices: [(&str, Production<'o, 't>, &[TokenKind]); 3] = [
            ("predefined predicate", Self::predefined_predicate, &PREDICATE_FOLLOW),
            ("entity type list", Self::type_list, &TYPE_LIST_FOLLOW),
            ("predicate", Self::predicate_only, &PREDICATE_FOLLOW),
        ];

        let mut failure: Option<ParseError> = None;

        for (form, production, follow) in choices {
            let attempt = production(self, cur).and_then(|(filter, mut cur)| {
                for (i, kind) in end.iter().enumerate() {
                    cur = match cur.expect(*kind) {
                        Ok((_, next)) => next,
                        // The form could also have continued here.
                        Err(err) if i == 0 => return Err(err.also_expecting(follow)),
                        Err(err) => return Err(err),
                    };
                }
                Ok((filter, cur))
            });

            match attempt {
                Ok(done) => return Ok(done),
                Err(err @ ParseError::Syntax { .. }) => {
                    trace!(form, error = %err, "expression form rejected");
                    failure = Some(match failure {
                        Some(previous) => previous.furthest(err),
                        None => err,
                    });
                }
                Err(err) => return Err(err),
            }
        }

        Err(failure.unwrap_or_else(|| ParseError::syntax(cur.peek(), end)))
    }

    /// `TypeExpr and Predicate` or `( OrTypeExpr ) and Predicate`
    fn predefined_predicate<'t>(&self, cur: Cursor<'t>) -> Step<'t, Filter> {
        let (entity_types, cur) = if cur.kind() == TokenKind::LParen {
            let (types, cur) = self.or_type_expr(cur.advance())?;
            let (_, cur) = cur
                .expect(TokenKind::RParen)
                .map_err(|err| err.also_expecting(&TYPE_LIST_FOLLOW))?;
            (types, cur)
        } else {
            let (entity_type, cur) = self.type_expr(cur)?;
            let mut types = EntityTypeSet::new();
            types.push(entity_type);
            (types, cur)
        };

        let (_, cur) = cur.expect(TokenKind::And)?;
        let (predicate, cur) = self.or_expr(cur, &entity_types, 0)?;

        Ok((
            Filter {
                entity_types,
                predicate: Some(predicate),
            },
            cur,
        ))
    }

    /// `TypeExpr (or TypeExpr)*` with no property predicate.
    fn type_list<'t>(&self, cur: Cursor<'t>) -> Step<'t, Filter> {
        let (entity_types, cur) = self.or_type_expr(cur)?;
        Ok((
            Filter {
                entity_types,
                predicate: None,
            },
            cur,
        ))
    }

    /// A predicate without entity types.
    fn predicate_only<'t>(&self, cur: Cursor<'t>) -> Step<'t, Filter> {
        let entity_types = EntityTypeSet::new();
        let (predicate, cur) = self.or_expr(cur, &entity_types, 0)?;
        Ok((
            Filter {
                entity_types,
                predicate: Some(predicate),
            },
            cur,
        ))
    }

    fn or_type_expr<'t>(&self, cur: Cursor<'t>) -> Step<'t, EntityTypeSet> {
        let mut types = EntityTypeSet::new();
        let (first, mut cur) = self.type_expr(cur)?;
        types.push(first);

        while cur.kind() == TokenKind::Or {
            let (next, rest) = self.type_expr(cur.advance())?;
            types.push(next);
            cur = rest;
        }
        Ok((types, cur))
    }

    /// `@xsi:type = 'Name'`
    fn type_expr<'t>(&self, cur: Cursor<'t>) -> Step<'t, String> {
        let (_, cur) = cur.expect(TokenKind::At)?;
        let (name, cur) = cur.expect(TokenKind::CompositeName)?;
        if name.text != TYPE_PROPERTY {
            return Err(ParseError::syntax(name, &[TokenKind::CompositeName]));
        }
        let (op, cur) = cur.expect(TokenKind::CompOp)?;
        if CompOp::from_symbol(&op.text) != Some(CompOp::Equal) {
            return Err(ParseError::syntax(op, &[TokenKind::CompOp]));
        }
        let (value, cur) = cur.expect(TokenKind::StringLiteral)?;
        Ok((unquote(&value.text), cur))
    }

    fn or_expr<'t>(&self, cur: Cursor<'t>, types: &EntityTypeSet, depth: usize) -> Step<'t, AstNode> {
        let (left, cur) = self.and_expr(cur, types, depth)?;

        if cur.kind() == TokenKind::Or {
            let depth = cur.deeper(depth)?;
            let (right, cur) = self.or_expr(cur.advance(), types, depth)?;
            Ok((AstNode::logical(left, BoolOp::Or, right), cur))
        } else {
            Ok((left, cur))
        }
    }

    fn and_expr<'t>(&self, cur: Cursor<'t>, types: &EntityTypeSet, depth: usize) -> Step<'t, AstNode> {
        let (left, cur) = self.primary(cur, types, depth)?;

        if cur.kind() == TokenKind::And {
            let depth = cur.deeper(depth)?;
            let (right, cur) = self.and_expr(cur.advance(), types, depth)?;
            Ok((AstNode::logical(left, BoolOp::And, right), cur))
        } else {
            Ok((left, cur))
        }
    }

    fn primary<'t>(&self, cur: Cursor<'t>, types: &EntityTypeSet, depth: usize) -> Step<'t, AstNode> {
        if cur.kind() == TokenKind::LParen {
            let depth = cur.deeper(depth)?;
            let (child, cur) = self.or_expr(cur.advance(), types, depth)?;
            let (_, cur) = cur
                .expect(TokenKind::RParen)
                .map_err(|err| err.also_expecting(&PREDICATE_FOLLOW))?;
            Ok((AstNode::parenthesis(child), cur))
        } else {
            self.rel_expr(cur, types)
        }
    }

    /// `[@] name op literal`
    fn rel_expr<'t>(&self, cur: Cursor<'t>, types: &EntityTypeSet) -> Step<'t, AstNode> {
        let cur = if cur.kind() == TokenKind::At { cur.advance() } else { cur };

        let (name, cur) = cur.expect_one_of(&[TokenKind::Name, TokenKind::CompositeName])?;
        let (op, cur) = cur.expect(TokenKind::CompOp)?;
        let operator =
            CompOp::from_symbol(&op.text).ok_or_else(|| ParseError::syntax(op, &[TokenKind::CompOp]))?;
        let (value, cur) = self.literal(cur)?;

        let location = self.classify(&name.text, types)?;

        Ok((
            AstNode::Property {
                name: name.text.clone(),
                operator,
                value,
                location,
            },
            cur,
        ))
    }

    fn literal<'t>(&self, cur: Cursor<'t>) -> Step<'t, Literal> {
        const LITERALS: [TokenKind; 3] = [
            TokenKind::StringLiteral,
            TokenKind::IntLiteral,
            TokenKind::DecimalLiteral,
        ];

        let (token, next) = cur.expect_one_of(&LITERALS)?;
        let literal = match token.kind {
            TokenKind::StringLiteral => Some(Literal::String(unquote(&token.text))),
            TokenKind::IntLiteral => match token.text.parse::<i64>() {
                Ok(n) => Some(Literal::Integer(n)),
                // Too wide for i64, still a valid number.
                Err(_) => Decimal::from_str(&token.text).ok().map(Literal::Decimal),
            },
            _ => Decimal::from_str(&token.text).ok().map(Literal::Decimal),
        };

        match literal {
            Some(literal) => Ok((literal, next)),
            None => Err(ParseError::syntax(token, &LITERALS)),
        }
    }

    /// Decides where `property` is stored for the types in scope.
    fn classify(&self, property: &str, types: &EntityTypeSet) -> Result<Location, ParseError> {
        let Some(oracle) = self.oracle else {
            return Ok(Location::Unclassified);
        };

        if property == TYPE_PROPERTY {
            return Ok(Location::Repository);
        }

        let fallback = [DEFAULT_ENTITY_TYPE.to_string()];
        let scope: &[String] = if !types.is_empty() {
            types.as_slice()
        } else if !self.default_entity_types.is_empty() {
            self.default_entity_types
        } else {
            &fallback
        };

        for entity_type in scope {
            if oracle
                .is_property_in_repository(property, entity_type)
                .map_err(ParseError::Oracle)?
            {
                trace!(property, entity_type = entity_type.as_str(), "property stored in repository");
                return Ok(Location::Repository);
            }
        }

        for entity_type in scope {
            if oracle
                .is_property_in_lookaside(property, entity_type)
                .map_err(ParseError::Oracle)?
            {
                trace!(property, entity_type = entity_type.as_str(), "property stored in look-aside");
                return Ok(Location::LookAside);
            }
        }

        debug!(property, entity_types = ?scope, "property not supported by any store");
        Err(ParseError::UnsupportedAttribute {
            property: property.to_string(),
            entity_types: scope.to_vec(),
        })
    }
}

/// Parse `input`, classifying property locations when `oracle` is given.
pub fn parse(input: &str, oracle: Option<&dyn MetadataOracle>) -> Result<Filter, ParseError> {
    Parser::new(oracle).parse(input)
}

/// Strips the surrounding quotes and collapses doubled quote characters.
fn unquote(text: &str) -> String {
    let Some(quote) = text.chars().next() else {
        return String::new();
    };
    let inner = text
        .strip_prefix(quote)
        .and_then(|rest| rest.strip_suffix(quote))
        .unwrap_or(text);
    inner.replace(&format!("{quote}{quote}"), &quote.to_string())
}

#[test]
fn test_unquote() {
    assert_eq!(unquote("'admin'"), "admin");
    assert_eq!(unquote("'O''Brien'"), "O'Brien");
    assert_eq!(unquote("\"say \"\"hi\"\"\""), "say \"hi\"");
    assert_eq!(unquote("''"), "");
}
