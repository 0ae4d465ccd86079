use crate::ast::{Position, Token, TokenKind};

/// Turns search expression text into tokens.
///
/// The lexer never fails: input it cannot recognize comes back as a
/// [`TokenKind::Invalid`] token and the parser reports it as a syntax error.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Rewinds to the start of the input.
    pub fn reset(&mut self) {
        self.position = 0;
        self.line = 1;
        self.column = 1;
    }

    /// All remaining tokens, terminated by a single `Eof`.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let done = token.is(TokenKind::Eof);
            tokens.push(token);
            if done {
                return tokens;
            }
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(ch) = self.current_char() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
            self.position += 1;
        }
    }

    fn here(&self) -> Position {
        Position {
            offset: self.position,
            line: self.line,
            column: self.column,
        }
    }

    fn text_from(&self, start: &Position) -> String {
        self.input[start.offset..self.position].iter().collect()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn is_name_start(ch: char) -> bool {
        ch.is_alphabetic() || ch == '_'
    }

    fn is_name_char(ch: char) -> bool {
        ch.is_alphanumeric() || matches!(ch, '_' | '.' | '-')
    }

    fn read_name(&mut self) {
        while let Some(ch) = self.current_char() {
            if Self::is_name_char(ch) {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Consumes a quoted string. Returns false when the closing quote is
    /// missing.
    fn read_string(&mut self, quote: char) -> bool {
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            self.advance();
            if ch == quote {
                // A doubled quote is an escaped quote, not the end.
                if self.current_char() == Some(quote) {
                    self.advance();
                } else {
                    return true;
                }
            }
        }
        false
    }

    fn read_number(&mut self) -> TokenKind {
        let mut is_decimal = false;

        if self.current_char() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                self.advance();
            } else if ch == '.'
                && !is_decimal
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_decimal = true;
                self.advance();
            } else {
                break;
            }
        }

        if is_decimal {
            TokenKind::DecimalLiteral
        } else {
            TokenKind::IntLiteral
        }
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        kind
    }

    fn pair(&mut self, kind: TokenKind) -> TokenKind {
        self.advance();
        self.advance();
        kind
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.here();
        let kind = match self.current_char() {
            None => TokenKind::Eof,
            Some('@') => self.single(TokenKind::At),
            Some('(') => self.single(TokenKind::LParen),
            Some(')') => self.single(TokenKind::RParen),
            Some('[') => self.single(TokenKind::LBracket),
            Some(']') => self.single(TokenKind::RBracket),
            Some('/') => {
                if self.peek_char(1) == Some('/') {
                    self.pair(TokenKind::DoubleSlash)
                } else {
                    self.single(TokenKind::Invalid)
                }
            }
            Some('=') => self.single(TokenKind::CompOp),
            Some('!') => {
                if self.peek_char(1) == Some('=') {
                    self.pair(TokenKind::CompOp)
                } else {
                    self.single(TokenKind::Invalid)
                }
            }
            Some('<') | Some('>') => {
                if self.peek_char(1) == Some('=') {
                    self.pair(TokenKind::CompOp)
                } else {
                    self.single(TokenKind::CompOp)
                }
            }
            Some(quote @ ('\'' | '"')) => {
                if self.read_string(quote) {
                    TokenKind::StringLiteral
                } else {
                    TokenKind::Invalid
                }
            }
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => self.read_number(),
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if Self::is_name_start(ch) => {
                self.read_name();
                if self.current_char() == Some(':')
                    && self.peek_char(1).is_some_and(Self::is_name_start)
                {
                    self.advance(); // ':'
                    self.read_name();
                    TokenKind::CompositeName
                } else {
                    let name = self.text_from(&start);
                    if name.eq_ignore_ascii_case("and") {
                        TokenKind::And
                    } else if name.eq_ignore_ascii_case("or") {
                        TokenKind::Or
                    } else {
                        TokenKind::Name
                    }
                }
            }
            Some(_) => self.single(TokenKind::Invalid),
        };

        Token::new(kind, self.text_from(&start), start)
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and OR And");
    assert_eq!(lexer.next_token().kind, TokenKind::And);
    assert_eq!(lexer.next_token().kind, TokenKind::Or);
    assert_eq!(lexer.next_token().kind, TokenKind::And);
    assert_eq!(lexer.next_token().kind, TokenKind::Eof);
}

#[test]
fn test_entities_path() {
    let mut lexer = Lexer::new("//entities[@xsi:type='Group']");
    let kinds: Vec<TokenKind> = lexer.tokenize().into_iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TokenKind::DoubleSlash,
            TokenKind::Name,
            TokenKind::LBracket,
            TokenKind::At,
            TokenKind::CompositeName,
            TokenKind::CompOp,
            TokenKind::StringLiteral,
            TokenKind::RBracket,
            TokenKind::Eof,
        ]
    );
}
