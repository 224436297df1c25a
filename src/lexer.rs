//! STAR/CIF tokenizer.
//!
//! [`Lexer`] turns raw text into a lazy, finite sequence of [`Token`]s. It
//! handles every value form (bare, `'single'`, `"double"`, and `;` text
//! fields), reserved words, tags, and comments. Comments are dropped.
//!
//! Quoting follows the CIF 1.1 rule: a quote character only closes a quoted
//! value when it is followed by whitespace or end of input, so `'it's'` reads
//! as `it's`. Quoted values cannot span lines. A text field opens with `;` in
//! the first column and closes at the next line that starts with `;`.
//!
//! ```rust
//! use starcif::lexer::{Lexer, TokenKind};
//!
//! let kinds: Vec<TokenKind> = Lexer::new("data_x _a 'b c' # note\n")
//!     .map(|t| t.unwrap().kind)
//!     .collect();
//! assert_eq!(kinds.len(), 3);
//! assert!(matches!(kinds[0], TokenKind::DataBlock(ref n) if n == "x"));
//! ```

use crate::{Error, QuoteStyle, Result, Value};

/// The lexical category of a token, with its payload.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    /// `data_NAME`; the name may be empty.
    DataBlock(String),
    /// `global_`
    Global,
    /// `save_NAME`
    SaveStart(String),
    /// A bare `save_`, closing a save frame.
    SaveEnd,
    /// `loop_`
    Loop,
    /// `stop_`
    Stop,
    /// A bare token starting with `_`.
    Tag(String),
    Value(Value),
}

/// A token and the 1-based position of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

/// Streaming tokenizer over a borrowed input string.
///
/// Yields `Err` at most once; after an error the iterator is exhausted.
pub struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    line: usize,
    line_start: usize,
    // Column of byte offset `col_from`, advanced forward as tokens are read.
    col_from: usize,
    col: usize,
    failed: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            line: 1,
            line_start: 0,
            col_from: 0,
            col: 1,
            failed: false,
        }
    }

    /// The full text of a 1-based source line, for error context.
    pub fn line_text(&self, line: usize) -> &'a str {
        self.input
            .lines()
            .nth(line.saturating_sub(1))
            .unwrap_or("")
    }

    /// The line the lexer has reached.
    pub fn line(&self) -> usize {
        self.line
    }

    fn column(&mut self) -> usize {
        if self.col_from < self.line_start {
            self.col_from = self.line_start;
            self.col = 1;
        }
        self.col += self.input[self.col_from..self.pos].chars().count();
        self.col_from = self.pos;
        self.col
    }

    fn newline_at(&mut self, idx: usize) {
        self.line += 1;
        self.line_start = idx + 1;
    }

    fn skip_whitespace_and_comments(&mut self) {
        while self.pos < self.bytes.len() {
            match self.bytes[self.pos] {
                b'\n' => {
                    self.newline_at(self.pos);
                    self.pos += 1;
                }
                b'#' => {
                    while self.pos < self.bytes.len() && self.bytes[self.pos] != b'\n' {
                        self.pos += 1;
                    }
                }
                c if c.is_ascii_whitespace() => self.pos += 1,
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Result<Token> {
        let line = self.line;
        let col = self.column();
        let b = self.bytes[self.pos];

        let kind = if b == b';' && self.pos == self.line_start {
            self.scan_text_field(line, col)?
        } else if b == b'\'' || b == b'"' {
            self.scan_quoted(b, line, col)?
        } else {
            let start = self.pos;
            while self.pos < self.bytes.len() && !self.bytes[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }
            classify_bare(&self.input[start..self.pos])
        };

        Ok(Token { kind, line, col })
    }

    fn scan_quoted(&mut self, quote: u8, line: usize, col: usize) -> Result<TokenKind> {
        let start = self.pos;
        let mut i = start + 1;
        loop {
            if i >= self.bytes.len() || self.bytes[i] == b'\n' {
                return Err(Error::malformed(
                    line,
                    col,
                    "unterminated quoted string",
                    self.line_text(line),
                ));
            }
            // A closing quote must be followed by whitespace or end of input.
            if self.bytes[i] == quote
                && (i + 1 >= self.bytes.len() || self.bytes[i + 1].is_ascii_whitespace())
            {
                let style = if quote == b'\'' {
                    QuoteStyle::Single
                } else {
                    QuoteStyle::Double
                };
                let content = &self.input[start + 1..i];
                self.pos = i + 1;
                return Ok(TokenKind::Value(Value::quoted(content, style)));
            }
            i += 1;
        }
    }

    fn scan_text_field(&mut self, line: usize, col: usize) -> Result<TokenKind> {
        let content_start = self.pos + 1;
        let mut cursor = content_start;

        loop {
            let newline = match self.bytes[cursor..].iter().position(|&c| c == b'\n') {
                Some(offset) => cursor + offset,
                None => {
                    return Err(Error::malformed(
                        line,
                        col,
                        "unterminated text field",
                        self.line_text(line),
                    ))
                }
            };
            self.newline_at(newline);
            cursor = newline + 1;

            if self.bytes.get(cursor) == Some(&b';') {
                let mut content = &self.input[content_start..newline];
                content = content.strip_suffix('\r').unwrap_or(content);
                // The rest of the opening line is usually empty; drop its newline.
                content = content
                    .strip_prefix("\r\n")
                    .or_else(|| content.strip_prefix('\n'))
                    .unwrap_or(content);
                self.pos = cursor + 1;
                return Ok(TokenKind::Value(Value::quoted(
                    content,
                    QuoteStyle::TextField,
                )));
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        self.skip_whitespace_and_comments();
        if self.pos >= self.bytes.len() {
            return None;
        }
        let token = self.scan_token();
        self.failed = token.is_err();
        Some(token)
    }
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len() && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

/// Reserved words are matched case-insensitively.
fn classify_bare(s: &str) -> TokenKind {
    if starts_with_ignore_case(s, "data_") {
        TokenKind::DataBlock(s[5..].to_string())
    } else if s.eq_ignore_ascii_case("loop_") {
        TokenKind::Loop
    } else if s.eq_ignore_ascii_case("stop_") {
        TokenKind::Stop
    } else if s.eq_ignore_ascii_case("global_") {
        TokenKind::Global
    } else if starts_with_ignore_case(s, "save_") {
        if s.len() == 5 {
            TokenKind::SaveEnd
        } else {
            TokenKind::SaveStart(s[5..].to_string())
        }
    } else if s.starts_with('_') {
        TokenKind::Tag(s.to_string())
    } else if s == "." {
        TokenKind::Value(Value::Inapplicable)
    } else if s == "?" {
        TokenKind::Value(Value::Unknown)
    } else {
        TokenKind::Value(Value::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input).map(|t| t.unwrap().kind).collect()
    }

    fn text(content: &str, style: QuoteStyle) -> TokenKind {
        TokenKind::Value(Value::quoted(content, style))
    }

    #[test]
    fn test_reserved_words_any_case() {
        assert_eq!(
            kinds("DATA_Blk Loop_ STOP_ Global_ save_frame SAVE_"),
            vec![
                TokenKind::DataBlock("Blk".into()),
                TokenKind::Loop,
                TokenKind::Stop,
                TokenKind::Global,
                TokenKind::SaveStart("frame".into()),
                TokenKind::SaveEnd,
            ]
        );
    }

    #[test]
    fn test_empty_block_name() {
        assert_eq!(kinds("data_\n"), vec![TokenKind::DataBlock(String::new())]);
    }

    #[test]
    fn test_sentinels_only_when_bare() {
        let tokens = kinds("? . '?' \".\" ?x");
        assert_eq!(tokens[0], TokenKind::Value(Value::Unknown));
        assert_eq!(tokens[1], TokenKind::Value(Value::Inapplicable));
        assert_eq!(tokens[2], text("?", QuoteStyle::Single));
        assert_eq!(tokens[3], text(".", QuoteStyle::Double));
        assert_eq!(tokens[4], text("?x", QuoteStyle::Bare));
    }

    #[test]
    fn test_quote_closes_only_before_whitespace() {
        let tokens = kinds("'it's here' \"say \"hi\"\" 'a''b'");
        assert_eq!(tokens[0], text("it's here", QuoteStyle::Single));
        assert_eq!(tokens[1], text("say \"hi\"", QuoteStyle::Double));
        assert_eq!(tokens[2], text("a''b", QuoteStyle::Single));
    }

    #[test]
    fn test_hash_inside_bare_token_is_content() {
        assert_eq!(
            kinds("_tag a#b # trailing comment\n"),
            vec![TokenKind::Tag("_tag".into()), text("a#b", QuoteStyle::Bare)]
        );
    }

    #[test]
    fn test_text_field() {
        let tokens = kinds("_t\n;\nline one\n  line two\n;\n_u x");
        assert_eq!(tokens[1], text("line one\n  line two", QuoteStyle::TextField));
        assert_eq!(tokens[2], TokenKind::Tag("_u".into()));
    }

    #[test]
    fn test_text_field_content_on_opening_line() {
        let tokens = kinds(";first\nsecond\n;");
        assert_eq!(tokens[0], text("first\nsecond", QuoteStyle::TextField));
    }

    #[test]
    fn test_text_field_crlf() {
        let tokens = kinds(";\r\nabc\r\n;\r\n");
        assert_eq!(tokens, vec![text("abc", QuoteStyle::TextField)]);
    }

    #[test]
    fn test_semicolon_mid_line_is_bare() {
        assert_eq!(kinds("_a ;x"), vec![TokenKind::Tag("_a".into()), text(";x", QuoteStyle::Bare)]);
    }

    #[test]
    fn test_positions() {
        let tokens: Vec<Token> = Lexer::new("data_a\n  _tag  val\n").map(|t| t.unwrap()).collect();
        assert_eq!((tokens[1].line, tokens[1].col), (2, 3));
        assert_eq!((tokens[2].line, tokens[2].col), (2, 9));
    }

    #[test]
    fn test_positions_along_one_long_line() {
        let mut text = String::from("loop_ _a\n");
        for _ in 0..1000 {
            text.push_str("é ");
        }
        text.push_str("'ü x' tail\n_b 1\n");
        let tokens: Vec<Token> = Lexer::new(&text).map(|t| t.unwrap()).collect();
        assert_eq!((tokens[2].line, tokens[2].col), (2, 1));
        assert_eq!((tokens[3].line, tokens[3].col), (2, 3));
        assert_eq!((tokens[1001].line, tokens[1001].col), (2, 1999));
        assert_eq!((tokens[1002].line, tokens[1002].col), (2, 2001));
        assert_eq!((tokens[1003].line, tokens[1003].col), (2, 2007));
        assert_eq!((tokens[1004].line, tokens[1004].col), (3, 1));
        assert_eq!((tokens[1005].line, tokens[1005].col), (3, 4));
    }

    #[test]
    fn test_unterminated_quote_stops_iteration() {
        let mut lexer = Lexer::new("_a 'open\n_b 2");
        assert!(lexer.next().unwrap().is_ok());
        let err = lexer.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::MalformedToken { line: 1, col: 4, .. }));
        assert!(lexer.next().is_none());
    }

    #[test]
    fn test_unterminated_text_field() {
        let err = Lexer::new("_a\n;\nnever closed\n").nth(1).unwrap().unwrap_err();
        assert!(matches!(err, Error::MalformedToken { line: 2, .. }));
        assert!(err.to_string().contains("text field"));
    }
}
