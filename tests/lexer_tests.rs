// tests/lexer_tests.rs

use wim_xpath::ast::{Token, TokenKind};
use wim_xpath::lexer::Lexer;

fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::new(input).tokenize().into_iter().map(|t| t.kind).collect()
}

fn single(input: &str) -> Token {
    let mut lexer = Lexer::new(input);
    let token = lexer.next_token();
    assert_eq!(lexer.next_token().kind, TokenKind::Eof, "trailing tokens for input: {}", input);
    token
}

// ============================================================================
// Punctuation and Operators
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("@", TokenKind::At),
        ("(", TokenKind::LParen),
        (")", TokenKind::RParen),
        ("[", TokenKind::LBracket),
        ("]", TokenKind::RBracket),
        ("=", TokenKind::CompOp),
        ("<", TokenKind::CompOp),
        (">", TokenKind::CompOp),
    ];

    for (input, expected) in test_cases {
        let token = single(input);
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(token.text, input);
    }
}

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![
        ("//", TokenKind::DoubleSlash),
        ("!=", TokenKind::CompOp),
        ("<=", TokenKind::CompOp),
        (">=", TokenKind::CompOp),
    ];

    for (input, expected) in test_cases {
        let token = single(input);
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(token.text, input);
    }
}

#[test]
fn test_two_char_vs_single_char() {
    let mut lexer = Lexer::new("< =");
    assert_eq!(lexer.next_token().text, "<");
    assert_eq!(lexer.next_token().text, "=");
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);

    let mut lexer = Lexer::new("<==");
    assert_eq!(lexer.next_token().text, "<=");
    assert_eq!(lexer.next_token().text, "=");
}

// ============================================================================
// Keywords and Names
// ============================================================================

#[test]
fn test_keywords_any_case() {
    for input in ["and", "AND", "And"] {
        assert_eq!(single(input).kind, TokenKind::And, "Failed for input: {}", input);
    }
    for input in ["or", "OR", "oR"] {
        assert_eq!(single(input).kind, TokenKind::Or, "Failed for input: {}", input);
    }
}

#[test]
fn test_keywords_vs_names() {
    let test_cases = vec!["android", "and_item", "_and", "or_gate", "order", "oracle"];

    for input in test_cases {
        let token = single(input);
        assert_eq!(token.kind, TokenKind::Name, "Failed for input: {}", input);
        assert_eq!(token.text, input);
    }
}

#[test]
fn test_name_characters() {
    let test_cases = vec!["uid", "ibm-primaryEmail", "home.address", "_private", "cn2"];

    for input in test_cases {
        let token = single(input);
        assert_eq!(token.kind, TokenKind::Name, "Failed for input: {}", input);
        assert_eq!(token.text, input);
    }
}

#[test]
fn test_composite_name() {
    let token = single("xsi:type");
    assert_eq!(token.kind, TokenKind::CompositeName);
    assert_eq!(token.text, "xsi:type");
}

#[test]
fn test_colon_needs_name_after_it() {
    // "xsi:" is a name followed by an unrecognized ':'
    assert_eq!(
        kinds("xsi:"),
        vec![TokenKind::Name, TokenKind::Invalid, TokenKind::Eof]
    );
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_string_literals_keep_quotes() {
    let token = single("'admin'");
    assert_eq!(token.kind, TokenKind::StringLiteral);
    assert_eq!(token.text, "'admin'");

    let token = single("\"admin\"");
    assert_eq!(token.kind, TokenKind::StringLiteral);
    assert_eq!(token.text, "\"admin\"");
}

#[test]
fn test_doubled_quote_stays_in_string() {
    let token = single("'O''Brien'");
    assert_eq!(token.kind, TokenKind::StringLiteral);
    assert_eq!(token.text, "'O''Brien'");

    // The other quote character needs no escaping.
    let token = single("\"it's\"");
    assert_eq!(token.kind, TokenKind::StringLiteral);
}

#[test]
fn test_unterminated_string_is_invalid() {
    assert_eq!(kinds("'admin"), vec![TokenKind::Invalid, TokenKind::Eof]);
    assert_eq!(kinds("'a''"), vec![TokenKind::Invalid, TokenKind::Eof]);
}

#[test]
fn test_numbers() {
    let test_cases = vec![
        ("42", TokenKind::IntLiteral),
        ("-7", TokenKind::IntLiteral),
        ("3.14", TokenKind::DecimalLiteral),
        ("-0.5", TokenKind::DecimalLiteral),
    ];

    for (input, expected) in test_cases {
        let token = single(input);
        assert_eq!(token.kind, expected, "Failed for input: {}", input);
        assert_eq!(token.text, input);
    }
}

#[test]
fn test_trailing_dot_is_not_decimal() {
    assert_eq!(
        kinds("1."),
        vec![TokenKind::IntLiteral, TokenKind::Invalid, TokenKind::Eof]
    );
}

// ============================================================================
// Errors and Positions
// ============================================================================

#[test]
fn test_unexpected_characters_are_invalid_tokens() {
    for input in ["#", "/", "!", "$", "&", "-"] {
        let token = single(input);
        assert_eq!(token.kind, TokenKind::Invalid, "Failed for input: {}", input);
        assert_eq!(token.text, input);
    }
}

#[test]
fn test_positions() {
    let tokens = Lexer::new("uid = 'x'\n  and cn='y'").tokenize();

    assert_eq!(tokens[0].position.offset, 0);
    assert_eq!((tokens[1].position.line, tokens[1].position.column), (1, 5));
    assert_eq!((tokens[2].position.line, tokens[2].position.column), (1, 7));

    let and = &tokens[3];
    assert_eq!(and.kind, TokenKind::And);
    assert_eq!((and.position.line, and.position.column), (2, 3));
    assert_eq!(and.position.offset, 12);
}

#[test]
fn test_whitespace_insignificant() {
    assert_eq!(kinds("uid='x'"), kinds("  uid \t=\n 'x'  "));
}

#[test]
fn test_eof_repeats() {
    let mut lexer = Lexer::new("");
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_reset_restarts_from_zero() {
    let mut lexer = Lexer::new("uid='x'");
    let first = lexer.tokenize();
    lexer.reset();
    let second = lexer.tokenize();
    assert_eq!(first, second);
}

#[test]
fn test_full_expression() {
    assert_eq!(
        kinds("//entities[@xsi:type='PersonAccount' and (uid='a*' or age >= 18)]"),
        vec![
            TokenKind::DoubleSlash,
            TokenKind::Name,
            TokenKind::LBracket,
            TokenKind::At,
            TokenKind::CompositeName,
            TokenKind::CompOp,
            TokenKind::StringLiteral,
            TokenKind::And,
            TokenKind::LParen,
            TokenKind::Name,
            TokenKind::CompOp,
            TokenKind::StringLiteral,
            TokenKind::Or,
            TokenKind::Name,
            TokenKind::CompOp,
            TokenKind::IntLiteral,
            TokenKind::RParen,
            TokenKind::RBracket,
            TokenKind::Eof,
        ]
    );
}
