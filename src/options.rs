//! Configuration options for reading and writing STAR/CIF text.
//!
//! - [`ParseOptions`]: strictness knobs for the reader
//! - [`WriteOptions`]: layout and fidelity knobs for the writer
//!
//! ## Examples
//!
//! ```rust
//! use starcif::{from_str, to_string_with_options, WriteOptions};
//!
//! let doc = from_str("data_x\n_a 1.500\n_b 'hello'\n").unwrap();
//!
//! // Default: numbers canonicalized, minimal quoting
//! let text = to_string_with_options(&doc, &WriteOptions::new()).unwrap();
//! assert!(text.contains("_a 1.5\n"));
//!
//! // Verbatim: numbers and quote styles kept as read
//! let text = to_string_with_options(&doc, &WriteOptions::verbatim()).unwrap();
//! assert!(text.contains("_a 1.500\n"));
//! assert!(text.contains("_b 'hello'\n"));
//! ```

/// Options controlling how strictly STAR/CIF text is parsed.
///
/// # Examples
///
/// ```rust
/// use starcif::{from_str_with_options, ParseOptions};
///
/// let options = ParseOptions::new().with_allow_empty(true);
/// let doc = from_str_with_options("# nothing here\n", &options).unwrap();
/// assert!(doc.is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ParseOptions {
    /// Reject a tag that already appeared in the same block (as a pair or a
    /// loop column). Duplicates inside a single loop are always rejected.
    pub check_duplicate_tags: bool,
    /// Return an empty [`Document`](crate::Document) instead of
    /// [`Error::EmptyInput`](crate::Error::EmptyInput).
    pub allow_empty: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            check_duplicate_tags: true,
            allow_empty: false,
        }
    }
}

impl ParseOptions {
    /// Creates default options (duplicate tags rejected, empty input rejected).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_check_duplicate_tags(mut self, check: bool) -> Self {
        self.check_duplicate_tags = check;
        self
    }

    #[must_use]
    pub fn with_allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = allow;
        self
    }
}

/// Options controlling the text produced by the writer.
///
/// None of these affect what a re-parse yields beyond numeric spelling:
/// every combination round-trips to an equivalent document.
///
/// # Examples
///
/// ```rust
/// use starcif::WriteOptions;
///
/// let options = WriteOptions::new()
///     .with_align_columns(false)
///     .with_header_comment("version 30001");
/// assert!(!options.align_columns);
/// assert!(options.canonical_numbers);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct WriteOptions {
    /// Pad loop values so each column lines up.
    pub align_columns: bool,
    /// Reuse each value's recorded quote style when it is still valid for
    /// the content, instead of the minimal quoting the writer would pick.
    pub preserve_quotes: bool,
    /// Re-emit bare numeric values in their minimal decimal form
    /// (`1.500` becomes `1.5`, `+007` becomes `7`).
    pub canonical_numbers: bool,
    /// A comment line written before the first block, without the leading `#`.
    pub header_comment: Option<String>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        WriteOptions {
            align_columns: true,
            preserve_quotes: false,
            canonical_numbers: true,
            header_comment: None,
        }
    }
}

impl WriteOptions {
    /// Creates default options (aligned loops, minimal quoting, canonical numbers).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options that reproduce values as they were read: original numeric
    /// spelling and original quote styles where still valid.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use starcif::WriteOptions;
    ///
    /// let options = WriteOptions::verbatim();
    /// assert!(options.preserve_quotes);
    /// assert!(!options.canonical_numbers);
    /// ```
    #[must_use]
    pub fn verbatim() -> Self {
        WriteOptions {
            preserve_quotes: true,
            canonical_numbers: false,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_align_columns(mut self, align: bool) -> Self {
        self.align_columns = align;
        self
    }

    #[must_use]
    pub fn with_preserve_quotes(mut self, preserve: bool) -> Self {
        self.preserve_quotes = preserve;
        self
    }

    #[must_use]
    pub fn with_canonical_numbers(mut self, canonical: bool) -> Self {
        self.canonical_numbers = canonical;
        self
    }

    /// Sets the comment written above the first block.
    ///
    /// Multi-line comments are written one `#` line per input line.
    #[must_use]
    pub fn with_header_comment(mut self, comment: impl Into<String>) -> Self {
        self.header_comment = Some(comment.into());
        self
    }
}
