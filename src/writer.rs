//! STAR/CIF serialization.
//!
//! [`Writer`] walks a [`Document`] and emits text that parses back to an
//! equivalent document. Blocks and items are written in stored order.
//!
//! ## Value forms
//!
//! Each text value gets the lightest form that reads back unchanged:
//!
//! - **bare** when it is non-empty, has no whitespace, does not start with a
//!   reserved character (`_ # $ ' " [ ] ;`), and is not `?`, `.`, or a
//!   reserved word
//! - **single or double quotes** when it fits on one line and no quote of that
//!   kind is followed by whitespace
//! - **a `;` text field** otherwise
//!
//! A value that needs a text field but has a line (other than its first)
//! starting with `;` has no text form, and writing it fails with
//! [`Error::Unwritable`].
//!
//! ## Loop layout
//!
//! ```rust
//! use starcif::{to_string, Block, Document, Loop};
//!
//! let mut lp = Loop::new(["_id", "_name"]).unwrap();
//! lp.push_row(["1", "alpha"]).unwrap();
//! lp.push_row(["22", "two words"]).unwrap();
//! let mut block = Block::new("demo");
//! block.push_loop(lp);
//!
//! let text = to_string(&Document::from(vec![block])).unwrap();
//! assert_eq!(text, "data_demo\n\nloop_\n_id\n_name\n1  alpha\n22 'two words'\n");
//! ```

use crate::document::{first_duplicate, Block, Document, Item, Loop, Pair};
use crate::{Error, Number, QuoteStyle, Result, Value, WriteOptions};
use tracing::debug;

/// A value rendered for output.
enum Rendered {
    /// Fits on the current line.
    Inline(String),
    /// Must be written as a `;` text field holding this content.
    TextField(String),
}

impl Rendered {
    fn inline_width(&self) -> usize {
        match self {
            Rendered::Inline(s) => s.chars().count(),
            Rendered::TextField(_) => 0,
        }
    }
}

/// The STAR/CIF writer.
///
/// Accumulates output in memory; created via [`Writer::new`].
pub struct Writer {
    output: String,
    options: WriteOptions,
}

impl Writer {
    pub fn new(options: WriteOptions) -> Self {
        Writer {
            output: String::with_capacity(4096),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes the header comment and every block of `doc`.
    pub fn write_document(&mut self, doc: &Document) -> Result<()> {
        if let Some(comment) = &self.options.header_comment {
            for line in comment.lines() {
                self.output.push_str("# ");
                self.output.push_str(line);
                self.output.push('\n');
            }
        }
        for block in &doc.blocks {
            if !self.output.is_empty() {
                self.output.push('\n');
            }
            self.write_block(block, "data_")?;
        }
        debug!(
            blocks = doc.blocks.len(),
            bytes = self.output.len(),
            "wrote STAR document"
        );
        Ok(())
    }

    fn write_block(&mut self, block: &Block, marker: &str) -> Result<()> {
        if block.name.bytes().any(|b| b.is_ascii_whitespace()) {
            return Err(Error::unwritable(format!(
                "block name `{}` contains whitespace",
                block.name
            )));
        }
        check_block_tags(block)?;

        self.output.push_str(marker);
        self.output.push_str(&block.name);
        self.output.push('\n');

        let tag_width = if self.options.align_columns {
            block.pairs().map(|p| p.tag.chars().count()).max().unwrap_or(0)
        } else {
            0
        };

        let mut previous: Option<&Item> = None;
        for (idx, item) in block.items.iter().enumerate() {
            if matches!(item, Item::Loop(_)) || !matches!(previous, Some(Item::Pair(_))) {
                self.output.push('\n');
            }
            match item {
                Item::Pair(pair) => self.write_pair(pair, tag_width)?,
                Item::Loop(lp) => {
                    self.write_loop(lp)?;
                    // Only a pair's tag could be mistaken for another column.
                    let next_is_pair = matches!(block.items.get(idx + 1), Some(Item::Pair(_)));
                    if lp.is_empty() && next_is_pair {
                        self.output.push_str("stop_\n");
                    }
                }
            }
            previous = Some(item);
        }

        for frame in &block.frames {
            if frame.name.is_empty() {
                return Err(Error::unwritable(format!(
                    "save frame in block `{}` has an empty name",
                    block.name
                )));
            }
            if !frame.frames.is_empty() {
                return Err(Error::unwritable(format!(
                    "save frame `{}` contains save frames, which cannot nest",
                    frame.name
                )));
            }
            self.output.push('\n');
            self.write_block(frame, "save_")?;
            self.output.push_str("\nsave_\n");
        }
        Ok(())
    }

    fn write_pair(&mut self, pair: &Pair, tag_width: usize) -> Result<()> {
        check_tag(&pair.tag)?;
        self.output.push_str(&pair.tag);
        match self.render(&pair.value)? {
            Rendered::Inline(text) => {
                let pad = tag_width.saturating_sub(pair.tag.chars().count()) + 1;
                self.push_spaces(pad);
                self.output.push_str(&text);
                self.output.push('\n');
            }
            Rendered::TextField(content) => {
                self.output.push('\n');
                self.write_text_field(&content);
            }
        }
        Ok(())
    }

    fn write_loop(&mut self, lp: &Loop) -> Result<()> {
        self.output.push_str("loop_\n");
        for tag in lp.tags() {
            check_tag(tag)?;
            self.output.push_str(tag);
            self.output.push('\n');
        }

        let width = lp.width();
        let rendered = lp
            .values()
            .iter()
            .map(|v| self.render(v))
            .collect::<Result<Vec<_>>>()?;

        let mut col_widths = vec![0; width];
        if self.options.align_columns {
            for (i, r) in rendered.iter().enumerate() {
                let col = i % width;
                col_widths[col] = col_widths[col].max(r.inline_width());
            }
        }

        for row in rendered.chunks_exact(width) {
            let mut line_has_content = false;
            for (col, value) in row.iter().enumerate() {
                match value {
                    Rendered::Inline(text) => {
                        if line_has_content {
                            self.output.push(' ');
                        }
                        self.output.push_str(text);
                        line_has_content = true;
                        let next_inline = matches!(row.get(col + 1), Some(Rendered::Inline(_)));
                        if next_inline {
                            self.push_spaces(col_widths[col].saturating_sub(value.inline_width()));
                        }
                    }
                    Rendered::TextField(content) => {
                        if line_has_content {
                            self.output.push('\n');
                        }
                        self.write_text_field(content);
                        line_has_content = false;
                    }
                }
            }
            if line_has_content {
                self.output.push('\n');
            }
        }
        Ok(())
    }

    /// Writes a `;` text field starting at a line start.
    ///
    /// The reader drops one newline right after the opening `;` and one CR
    /// right before the closing newline, so content that starts with `;` goes
    /// on the opening line and content ending in CR gets an extra one.
    fn write_text_field(&mut self, content: &str) {
        self.output.push(';');
        if !content.starts_with(';') {
            self.output.push('\n');
        }
        self.output.push_str(content);
        if content.ends_with('\r') {
            self.output.push('\r');
        }
        self.output.push_str("\n;\n");
    }

    fn push_spaces(&mut self, n: usize) {
        self.output.extend(std::iter::repeat(' ').take(n));
    }

    fn render(&self, value: &Value) -> Result<Rendered> {
        let (content, style) = match value {
            Value::Unknown => return Ok(Rendered::Inline("?".to_string())),
            Value::Inapplicable => return Ok(Rendered::Inline(".".to_string())),
            Value::Text { content, style } => (content.as_str(), *style),
        };

        if self.options.preserve_quotes {
            if let Some(rendered) = self.render_as(content, style) {
                return Ok(rendered);
            }
        }
        [
            QuoteStyle::Bare,
            QuoteStyle::Single,
            QuoteStyle::Double,
            QuoteStyle::TextField,
        ]
        .into_iter()
        .find_map(|style| self.render_as(content, style))
        .ok_or_else(|| {
            Error::unwritable(format!(
                "value {:?} needs a text field but has a line starting with ';'",
                content
            ))
        })
    }

    /// Renders `content` in `style`, or `None` if that style cannot hold it.
    fn render_as(&self, content: &str, style: QuoteStyle) -> Option<Rendered> {
        match style {
            QuoteStyle::Bare if can_be_bare(content) => {
                let canonical = self
                    .options
                    .canonical_numbers
                    .then(|| Number::parse(content))
                    .flatten();
                Some(Rendered::Inline(match canonical {
                    Some(number) => number.to_string(),
                    None => content.to_string(),
                }))
            }
            QuoteStyle::Single if can_quote(content, '\'') => {
                Some(Rendered::Inline(format!("'{}'", content)))
            }
            QuoteStyle::Double if can_quote(content, '"') => {
                Some(Rendered::Inline(format!("\"{}\"", content)))
            }
            QuoteStyle::TextField if can_be_text_field(content) => {
                Some(Rendered::TextField(content.to_string()))
            }
            _ => None,
        }
    }
}

const RESERVED_START: &[char] = &['_', '#', '$', '\'', '"', '[', ']', ';'];

fn is_reserved_word(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.starts_with("data_")
        || lower.starts_with("save_")
        || lower == "loop_"
        || lower == "stop_"
        || lower == "global_"
}

fn can_be_bare(s: &str) -> bool {
    match s.chars().next() {
        None => false,
        Some(first) => {
            !RESERVED_START.contains(&first)
                && !s.bytes().any(|b| b.is_ascii_whitespace())
                && s != "?"
                && s != "."
                && !is_reserved_word(s)
        }
    }
}

fn can_quote(s: &str, quote: char) -> bool {
    if s.contains('\n') {
        return false;
    }
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == quote && chars.peek().is_some_and(|n| n.is_ascii_whitespace()) {
            return false;
        }
    }
    true
}

fn can_be_text_field(s: &str) -> bool {
    !s.contains("\n;")
}

fn check_tag(tag: &str) -> Result<()> {
    let valid = tag.starts_with('_') && !tag.bytes().any(|b| b.is_ascii_whitespace());
    if valid {
        Ok(())
    } else {
        Err(Error::unwritable(format!("`{}` is not a valid tag", tag)))
    }
}

/// Tags must be unique across a block's pairs and loop columns.
fn check_block_tags(block: &Block) -> Result<()> {
    let tags: Vec<&str> = block
        .items
        .iter()
        .flat_map(|item| match item {
            Item::Pair(pair) => vec![pair.tag.as_str()],
            Item::Loop(lp) => lp.tags().iter().map(String::as_str).collect(),
        })
        .collect();
    match first_duplicate(&tags) {
        Some(dup) => Err(Error::unwritable(format!(
            "tag `{}` appears more than once in block `{}`",
            dup, block.name
        ))),
        None => Ok(()),
    }
}
