//! STAR/CIF block parser.
//!
//! [`Parser`] consumes the [`Lexer`](crate::lexer::Lexer) token stream and
//! builds a [`Document`]. It is an explicit state machine with three states:
//!
//! - `InBlock`: between items; a tag starts a pair, `loop_` starts a loop
//! - `InLoopTags`: collecting a loop's column tags
//! - `InLoopRows`: collecting a loop's values
//!
//! A loop ends at whichever comes first: `stop_`, a tag, `loop_`, `data_`,
//! `save_`, or end of input. Termination is decided by token shape alone,
//! never by counting rows, so a one-row loop directly followed by another
//! block or loop is read unambiguously. The only lookahead is the single
//! token after a tag, which must be that tag's value.
//!
//! ```rust
//! use starcif::{from_str, Item};
//!
//! let doc = from_str("data_a\n_x 1\nloop_\n_c\n1\n2\n_y 2\n").unwrap();
//! let items = &doc.blocks[0].items;
//! assert!(matches!(items[0], Item::Pair(_)));
//! assert!(matches!(items[1], Item::Loop(ref lp) if lp.nrows() == 2));
//! assert!(matches!(items[2], Item::Pair(_)));
//! ```

use crate::document::{Block, Document, Item, Loop, Pair};
use crate::lexer::{Lexer, Token, TokenKind};
use crate::{Error, ParseOptions, Result, Value};
use indexmap::IndexMap;
use tracing::debug;

/// A loop under construction, remembering where `loop_` appeared.
#[derive(Debug)]
struct LoopBuilder {
    line: usize,
    col: usize,
    tags: Vec<String>,
    values: Vec<Value>,
}

#[derive(Debug)]
enum State {
    InBlock,
    InLoopTags(LoopBuilder),
    InLoopRows(LoopBuilder),
}

/// An open data block or save frame, with the tags it has defined so far.
struct Scope {
    block: Block,
    line: usize,
    col: usize,
    /// Lower-cased tag -> position of its first definition.
    seen: IndexMap<String, (usize, usize)>,
}

impl Scope {
    fn new(name: String, line: usize, col: usize) -> Self {
        Scope {
            block: Block::new(name),
            line,
            col,
            seen: IndexMap::new(),
        }
    }
}

/// The STAR/CIF parser.
///
/// Holds all parse state explicitly, so independent parses never interact.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    pending: Option<Token>,
    options: ParseOptions,
    blocks: Vec<Block>,
    current: Option<Scope>,
    frame: Option<Scope>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str, options: ParseOptions) -> Self {
        Parser {
            lexer: Lexer::new(input),
            pending: None,
            options,
            blocks: Vec::new(),
            current: None,
            frame: None,
        }
    }

    /// Runs the parser to completion.
    pub fn parse_document(mut self) -> Result<Document> {
        let mut state = State::InBlock;
        while let Some(token) = self.next_token()? {
            state = self.step(state, token)?;
        }
        self.finish(state)
    }

    fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(token) = self.pending.take() {
            return Ok(Some(token));
        }
        self.lexer.next().transpose()
    }

    fn push_back(&mut self, token: Token) {
        debug_assert!(self.pending.is_none());
        self.pending = Some(token);
    }

    fn unexpected(&self, line: usize, col: usize, msg: &str) -> Error {
        Error::unexpected(line, col, msg, self.lexer.line_text(line))
    }

    fn step(&mut self, state: State, token: Token) -> Result<State> {
        match state {
            State::InBlock => self.in_block(token),
            State::InLoopTags(lp) => self.in_loop_tags(lp, token),
            State::InLoopRows(lp) => self.in_loop_rows(lp, token),
        }
    }

    fn in_block(&mut self, token: Token) -> Result<State> {
        let Token { kind, line, col } = token;

        if self.current.is_none() && !matches!(kind, TokenKind::DataBlock(_)) {
            let msg = format!("{} before the first data block", describe(&kind));
            return Err(self.unexpected(line, col, &msg));
        }

        match kind {
            TokenKind::DataBlock(name) => {
                self.close_block()?;
                self.current = Some(Scope::new(name, line, col));
            }
            TokenKind::Global => {
                return Err(self.unexpected(line, col, "global_ blocks are not supported"));
            }
            TokenKind::SaveStart(name) => {
                if self.frame.is_some() {
                    return Err(self.unexpected(line, col, "save frames cannot be nested"));
                }
                self.frame = Some(Scope::new(name, line, col));
            }
            TokenKind::SaveEnd => match self.frame.take() {
                Some(frame) => {
                    if let Some(current) = self.current.as_mut() {
                        current.block.frames.push(frame.block);
                    }
                }
                None => {
                    return Err(self.unexpected(line, col, "save_ without an open save frame"));
                }
            },
            TokenKind::Loop => {
                return Ok(State::InLoopTags(LoopBuilder {
                    line,
                    col,
                    tags: Vec::new(),
                    values: Vec::new(),
                }));
            }
            TokenKind::Stop => {
                return Err(self.unexpected(line, col, "stop_ outside of a loop"));
            }
            TokenKind::Tag(tag) => {
                let value = match self.next_token()? {
                    Some(Token {
                        kind: TokenKind::Value(value),
                        ..
                    }) => value,
                    Some(other) => {
                        let msg = format!("tag `{}` has no value (found {})", tag, describe(&other.kind));
                        return Err(self.unexpected(line, col, &msg));
                    }
                    None => {
                        let msg = format!("tag `{}` has no value (found end of input)", tag);
                        return Err(self.unexpected(line, col, &msg));
                    }
                };
                self.define_tag(&tag, line, col)?;
                self.push_item(Item::Pair(Pair { tag, value }));
            }
            TokenKind::Value(value) => {
                let msg = format!("value `{}` is not preceded by a tag", value);
                return Err(self.unexpected(line, col, &msg));
            }
        }
        Ok(State::InBlock)
    }

    fn in_loop_tags(&mut self, mut lp: LoopBuilder, token: Token) -> Result<State> {
        match token.kind {
            TokenKind::Tag(tag) => {
                if lp.tags.iter().any(|t| t.eq_ignore_ascii_case(&tag)) {
                    let msg = format!("duplicate tag `{}` in loop", tag);
                    return Err(self.unexpected(token.line, token.col, &msg));
                }
                self.define_tag(&tag, token.line, token.col)?;
                lp.tags.push(tag);
                Ok(State::InLoopTags(lp))
            }
            _ if lp.tags.is_empty() => Err(self.unexpected(
                lp.line,
                lp.col,
                "loop_ must be followed by at least one tag",
            )),
            TokenKind::Value(value) => {
                lp.values.push(value);
                Ok(State::InLoopRows(lp))
            }
            TokenKind::Stop => {
                self.close_loop(lp, token.line, token.col)?;
                Ok(State::InBlock)
            }
            _ => {
                self.close_loop(lp, token.line, token.col)?;
                self.push_back(token);
                Ok(State::InBlock)
            }
        }
    }

    fn in_loop_rows(&mut self, mut lp: LoopBuilder, token: Token) -> Result<State> {
        match token.kind {
            TokenKind::Value(value) => {
                lp.values.push(value);
                Ok(State::InLoopRows(lp))
            }
            TokenKind::Stop => {
                self.close_loop(lp, token.line, token.col)?;
                Ok(State::InBlock)
            }
            _ => {
                self.close_loop(lp, token.line, token.col)?;
                self.push_back(token);
                Ok(State::InBlock)
            }
        }
    }

    /// Ends a loop at the boundary token found at `line`/`col`.
    fn close_loop(&mut self, lp: LoopBuilder, line: usize, col: usize) -> Result<()> {
        let width = lp.tags.len();
        if lp.values.len() % width != 0 {
            let msg = format!(
                "loop starting at line {} has {} values, which do not fill rows of {} tags",
                lp.line,
                lp.values.len(),
                width
            );
            return Err(self.unexpected(line, col, &msg));
        }
        let lp = Loop::from_parts(lp.tags, lp.values);
        self.push_item(Item::Loop(lp));
        Ok(())
    }

    /// Records a tag definition in the open scope, rejecting repeats.
    fn define_tag(&mut self, tag: &str, line: usize, col: usize) -> Result<()> {
        if !self.options.check_duplicate_tags {
            return Ok(());
        }
        let key = tag.to_ascii_lowercase();
        let Some(scope) = self.scope_mut() else {
            return Ok(());
        };
        if let Some(&(first_line, _)) = scope.seen.get(&key) {
            let msg = format!(
                "duplicate tag `{}` (first defined at line {})",
                tag, first_line
            );
            return Err(self.unexpected(line, col, &msg));
        }
        scope.seen.insert(key, (line, col));
        Ok(())
    }

    /// The innermost open scope: the save frame if one is open, else the data block.
    fn scope_mut(&mut self) -> Option<&mut Scope> {
        self.frame.as_mut().or(self.current.as_mut())
    }

    fn push_item(&mut self, item: Item) {
        if let Some(scope) = self.scope_mut() {
            scope.block.items.push(item);
        }
    }

    fn close_block(&mut self) -> Result<()> {
        if let Some(frame) = &self.frame {
            let msg = format!("save frame `{}` is never closed with save_", frame.block.name);
            return Err(self.unexpected(frame.line, frame.col, &msg));
        }
        if let Some(scope) = self.current.take() {
            debug!(
                block = %scope.block.name,
                items = scope.block.items.len(),
                frames = scope.block.frames.len(),
                "parsed data block"
            );
            self.blocks.push(scope.block);
        }
        Ok(())
    }

    fn finish(mut self, state: State) -> Result<Document> {
        match state {
            State::InBlock => {}
            State::InLoopTags(lp) if lp.tags.is_empty() => {
                return Err(self.unexpected(
                    lp.line,
                    lp.col,
                    "loop_ must be followed by at least one tag",
                ));
            }
            State::InLoopTags(lp) | State::InLoopRows(lp) => {
                let (line, col) = self.end_position();
                self.close_loop(lp, line, col)?;
            }
        }
        self.close_block()?;

        if self.blocks.is_empty() && !self.options.allow_empty {
            return Err(Error::EmptyInput);
        }
        debug!(blocks = self.blocks.len(), "parsed STAR document");
        Ok(Document {
            blocks: self.blocks,
        })
    }

    /// Position just past the last line, used for errors found at end of input.
    fn end_position(&self) -> (usize, usize) {
        (self.lexer.line(), 1)
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::DataBlock(name) => format!("data_{}", name),
        TokenKind::Global => "global_".to_string(),
        TokenKind::SaveStart(name) => format!("save_{}", name),
        TokenKind::SaveEnd => "save_".to_string(),
        TokenKind::Loop => "loop_".to_string(),
        TokenKind::Stop => "stop_".to_string(),
        TokenKind::Tag(tag) => format!("tag `{}`", tag),
        TokenKind::Value(value) => format!("value `{}`", value),
    }
}
