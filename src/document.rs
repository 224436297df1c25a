//! The in-memory STAR/CIF document model.
//!
//! A [`Document`] owns an ordered list of [`Block`]s; each block owns an
//! ordered list of [`Item`]s, where an item is exactly one [`Pair`] or one
//! [`Loop`]. Item order is the order of appearance in the source and is what
//! the writer reproduces.
//!
//! Tag lookups are ASCII case-insensitive, as tags are in CIF.
//!
//! ```rust
//! use starcif::{Block, Document, Loop, Value};
//!
//! let mut atoms = Loop::new(["_atom.id", "_atom.x"]).unwrap();
//! atoms.push_row([Value::from(1), Value::from(0.5)]).unwrap();
//!
//! let mut block = Block::new("model");
//! block.push_pair("_model.name", "apo");
//! block.push_loop(atoms);
//!
//! let doc = Document::from(vec![block]);
//! let model = doc.find_block("model").unwrap();
//! assert_eq!(model.find_loop("_ATOM.X").unwrap().nrows(), 1);
//! ```

use crate::{Error, Result, Value};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::slice::ChunksExact;

/// A parsed STAR/CIF document containing one or more data blocks.
///
/// Block names need not be unique; [`Document::find_block`] returns the first match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

/// A data block (`data_NAME`), or a save frame (`save_NAME`) nested in one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub name: String,
    pub items: Vec<Item>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub frames: Vec<Block>,
}

/// One record in a block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Pair(Pair),
    Loop(Loop),
}

/// A single tag/value association.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    pub tag: String,
    pub value: Value,
}

/// A looped data table: named columns with row-major values.
///
/// The tag list is never empty and never repeats a tag (ignoring ASCII
/// case), and every row is exactly as wide as the tag list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LoopData", into = "LoopData")]
pub struct Loop {
    tags: Vec<String>,
    /// Row-major flat array of values. Length = `tags.len() * nrows()`.
    values: Vec<Value>,
}

#[derive(Serialize, Deserialize)]
struct LoopData {
    tags: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl TryFrom<LoopData> for Loop {
    type Error = Error;

    fn try_from(data: LoopData) -> Result<Self> {
        let mut lp = Loop::new(data.tags)?;
        for row in data.rows {
            lp.push_row(row)?;
        }
        Ok(lp)
    }
}

impl From<Loop> for LoopData {
    fn from(lp: Loop) -> Self {
        let rows = lp.rows().map(<[Value]>::to_vec).collect();
        LoopData {
            tags: lp.tags,
            rows,
        }
    }
}

/// Returns the first tag that repeats an earlier one, ignoring ASCII case.
pub(crate) fn first_duplicate<S: AsRef<str>>(tags: &[S]) -> Option<&str> {
    let mut seen = HashSet::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.as_ref();
        if !seen.insert(tag.to_ascii_lowercase()) {
            return Some(tag);
        }
    }
    None
}

impl Loop {
    /// Creates a loop with the given columns and no rows.
    ///
    /// # Errors
    ///
    /// Fails if `tags` is empty or names the same tag twice.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use starcif::Loop;
    ///
    /// assert!(Loop::new(["_a", "_b"]).is_ok());
    /// assert!(Loop::new(["_a", "_A"]).is_err());
    /// ```
    pub fn new<I, S>(tags: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<String> = tags.into_iter().map(Into::into).collect();
        if tags.is_empty() {
            return Err(Error::custom("a loop needs at least one tag"));
        }
        if let Some(dup) = first_duplicate(&tags) {
            return Err(Error::custom(format!("duplicate tag `{}` in loop", dup)));
        }
        Ok(Loop {
            tags,
            values: Vec::new(),
        })
    }

    /// Builds a loop from already-validated parts.
    pub(crate) fn from_parts(tags: Vec<String>, values: Vec<Value>) -> Self {
        debug_assert!(!tags.is_empty() && values.len() % tags.len() == 0);
        Loop { tags, values }
    }

    /// Appends one row.
    ///
    /// # Errors
    ///
    /// Fails if the row is not exactly as wide as the tag list.
    pub fn push_row<I, V>(&mut self, row: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let before = self.values.len();
        self.values.extend(row.into_iter().map(Into::into));
        let added = self.values.len() - before;
        if added != self.tags.len() {
            self.values.truncate(before);
            return Err(Error::custom(format!(
                "row has {} values but the loop has {} tags",
                added,
                self.tags.len()
            )));
        }
        Ok(())
    }

    /// Column names, in order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.tags.len()
    }

    /// Number of rows in this loop.
    pub fn nrows(&self) -> usize {
        self.values.len() / self.tags.len()
    }

    /// Returns `true` if the loop declares tags but holds no rows.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All values, row-major.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> ChunksExact<'_, Value> {
        self.values.chunks_exact(self.tags.len())
    }

    pub fn row(&self, index: usize) -> Option<&[Value]> {
        let width = self.tags.len();
        let start = index.checked_mul(width)?;
        self.values.get(start..start.checked_add(width)?)
    }

    /// Find the column index for a tag (case-insensitive).
    pub fn column_index(&self, tag: &str) -> Option<usize> {
        self.tags.iter().position(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Iterate over a single column's values.
    pub fn column(&self, tag: &str) -> Option<ColumnIter<'_>> {
        let col_idx = self.column_index(tag)?;
        Some(ColumnIter {
            lp: self,
            col_idx,
            row: 0,
        })
    }

    /// The value at `row` in the column named `tag`.
    pub fn get(&self, row: usize, tag: &str) -> Option<&Value> {
        let col = self.column_index(tag)?;
        self.row(row).map(|r| &r[col])
    }
}

/// Iterator over a single column's values.
pub struct ColumnIter<'a> {
    lp: &'a Loop,
    col_idx: usize,
    row: usize,
}

impl<'a> Iterator for ColumnIter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        if self.row >= self.lp.nrows() {
            return None;
        }
        let idx = self.row * self.lp.width() + self.col_idx;
        self.row += 1;
        Some(&self.lp.values[idx])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.lp.nrows() - self.row;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ColumnIter<'_> {}

impl Item {
    pub fn as_pair(&self) -> Option<&Pair> {
        match self {
            Item::Pair(pair) => Some(pair),
            Item::Loop(_) => None,
        }
    }

    pub fn as_loop(&self) -> Option<&Loop> {
        match self {
            Item::Loop(lp) => Some(lp),
            Item::Pair(_) => None,
        }
    }

    /// Returns `true` if this item defines `tag`, either as a pair or as a loop column.
    pub fn defines(&self, tag: &str) -> bool {
        match self {
            Item::Pair(pair) => pair.tag.eq_ignore_ascii_case(tag),
            Item::Loop(lp) => lp.column_index(tag).is_some(),
        }
    }
}

impl Pair {
    pub fn new(tag: impl Into<String>, value: impl Into<Value>) -> Self {
        Pair {
            tag: tag.into(),
            value: value.into(),
        }
    }
}

impl Block {
    pub fn new(name: impl Into<String>) -> Self {
        Block {
            name: name.into(),
            items: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Appends a pair after the existing items.
    pub fn push_pair(&mut self, tag: impl Into<String>, value: impl Into<Value>) {
        self.items.push(Item::Pair(Pair::new(tag, value)));
    }

    /// Appends a loop after the existing items.
    pub fn push_loop(&mut self, lp: Loop) {
        self.items.push(Item::Loop(lp));
    }

    /// Replaces the value of an existing pair in place, or appends a new pair.
    ///
    /// Returns the previous value, if there was one.
    pub fn set_pair(&mut self, tag: &str, value: impl Into<Value>) -> Option<Value> {
        let value = value.into();
        let existing = self.items.iter_mut().find_map(|item| match item {
            Item::Pair(pair) if pair.tag.eq_ignore_ascii_case(tag) => Some(pair),
            _ => None,
        });
        match existing {
            Some(pair) => Some(std::mem::replace(&mut pair.value, value)),
            None => {
                self.items.push(Item::Pair(Pair::new(tag, value)));
                None
            }
        }
    }

    /// Pairs in order of appearance.
    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.items.iter().filter_map(Item::as_pair)
    }

    /// Loops in order of appearance.
    pub fn loops(&self) -> impl Iterator<Item = &Loop> {
        self.items.iter().filter_map(Item::as_loop)
    }

    /// Get a single pair's value by tag name (case-insensitive).
    pub fn find_pair(&self, tag: &str) -> Option<&Value> {
        self.pairs()
            .find(|pair| pair.tag.eq_ignore_ascii_case(tag))
            .map(|pair| &pair.value)
    }

    /// Find the loop containing a given tag (case-insensitive).
    pub fn find_loop(&self, tag: &str) -> Option<&Loop> {
        self.loops().find(|lp| lp.column_index(tag).is_some())
    }

    /// All values recorded under `tag`: the single value of a pair, or a
    /// loop's whole column.
    pub fn find_values(&self, tag: &str) -> Option<Vec<&Value>> {
        self.items.iter().find(|item| item.defines(tag)).map(|item| match item {
            Item::Pair(pair) => vec![&pair.value],
            Item::Loop(lp) => lp
                .column(tag)
                .map(|col| col.collect::<Vec<_>>())
                .unwrap_or_default(),
        })
    }

    /// Find a save frame by name (case-insensitive).
    pub fn find_frame(&self, name: &str) -> Option<&Block> {
        self.frames.iter().find(|f| f.name.eq_ignore_ascii_case(name))
    }
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// First block whose name matches (case-insensitive).
    pub fn find_block(&self, name: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.name.eq_ignore_ascii_case(name))
    }

    pub fn find_block_mut(&mut self, name: &str) -> Option<&mut Block> {
        self.blocks
            .iter_mut()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }
}

impl From<Vec<Block>> for Document {
    fn from(blocks: Vec<Block>) -> Self {
        Document { blocks }
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_loop() -> Loop {
        let mut lp = Loop::new(["_x", "_y", "_z"]).unwrap();
        lp.push_row(["1", "2", "3"]).unwrap();
        lp.push_row(["4", "5", "6"]).unwrap();
        lp
    }

    #[test]
    fn test_loop_rejects_duplicate_and_missing_tags() {
        assert!(Loop::new(Vec::<String>::new()).is_err());
        let err = Loop::new(["_a", "_b", "_a"]).unwrap_err();
        assert!(err.to_string().contains("_a"));
    }

    #[test]
    fn test_push_row_checks_width() {
        let mut lp = sample_loop();
        assert!(lp.push_row(["7", "8"]).is_err());
        assert!(lp.push_row(["7", "8", "9", "10"]).is_err());
        assert_eq!(lp.nrows(), 2);
        assert_eq!(lp.values().len(), 6);
    }

    #[test]
    fn test_rows_and_columns() {
        let lp = sample_loop();
        let rows: Vec<_> = lp.rows().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], Value::from("4"));
        let col: Vec<_> = lp.column("_Y").unwrap().collect();
        assert_eq!(col, vec![&Value::from("2"), &Value::from("5")]);
        assert_eq!(lp.get(1, "_z"), Some(&Value::from("6")));
        assert!(lp.row(2).is_none());
        assert!(lp.column("_w").is_none());
    }

    #[test]
    fn test_row_index_past_end_does_not_overflow() {
        let lp = sample_loop();
        assert!(lp.row(usize::MAX).is_none());
        assert!(lp.row(usize::MAX / 3 + 1).is_none());
        assert_eq!(lp.get(usize::MAX, "_x"), None);
    }

    #[test]
    fn test_find_values_pair_and_column() {
        let mut block = Block::new("b");
        block.push_pair("_name", "abc");
        block.push_loop(sample_loop());
        assert_eq!(block.find_values("_name"), Some(vec![&Value::from("abc")]));
        assert_eq!(block.find_values("_z").map(|v| v.len()), Some(2));
        assert!(block.find_values("_missing").is_none());
    }

    #[test]
    fn test_set_pair_replaces_in_place() {
        let mut block = Block::new("b");
        block.push_pair("_a", "1");
        block.push_loop(sample_loop());
        assert_eq!(block.set_pair("_A", "2"), Some(Value::from("1")));
        assert_eq!(block.set_pair("_b", "3"), None);
        assert!(matches!(block.items[0], Item::Pair(ref p) if p.value == Value::from("2")));
        assert!(matches!(block.items[2], Item::Pair(ref p) if p.tag == "_b"));
    }

    #[test]
    fn test_find_block_returns_first_match() {
        let mut first = Block::new("dup");
        first.push_pair("_which", "first");
        let mut second = Block::new("dup");
        second.push_pair("_which", "second");
        let doc = Document::from(vec![first, second]);
        assert_eq!(
            doc.find_block("DUP").unwrap().find_pair("_which"),
            Some(&Value::from("first"))
        );
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_find_block_mut_edits_first_match() {
        let doc_blocks = vec![Block::new("dup"), Block::new("dup")];
        let mut doc = Document::from(doc_blocks);
        doc.find_block_mut("Dup").unwrap().push_pair("_edited", "yes");
        assert_eq!(doc.blocks[0].find_pair("_edited"), Some(&Value::from("yes")));
        assert_eq!(doc.blocks[1].find_pair("_edited"), None);
        assert!(doc.find_block_mut("missing").is_none());
    }

    #[test]
    fn test_serde_loop_validates_rows() {
        let lp = sample_loop();
        let json = serde_json::to_string(&lp).unwrap();
        let back: Loop = serde_json::from_str(&json).unwrap();
        assert_eq!(back, lp);

        let ragged = r#"{"tags":["_a","_b"],"rows":[[{"Text":{"content":"1"}}]]}"#;
        assert!(serde_json::from_str::<Loop>(ragged).is_err());
    }
}
