//! # starcif
//!
//! A reader and writer for STAR/CIF structured text: the block-organized
//! format used for crystallographic CIF/mmCIF files and for RELION `.star`
//! metadata.
//!
//! ## What is STAR/CIF?
//!
//! A STAR file is a sequence of data blocks (`data_NAME`). Each block holds
//! scalar pairs (`_tag value`) and tables (`loop_` followed by column tags
//! and then row values), freely interleaved.
//!
//! ## Key Features
//!
//! - **Value-exact round-trips**: `from_str(&to_string(&doc)?)?` is
//!   equivalent to `doc`, with block, item, column, and row order preserved
//! - **Shape-driven loop termination**: one-row loops next to other blocks or
//!   loops read unambiguously, with or without `stop_`
//! - **Sentinels kept distinct**: bare `?` and `.` are [`Value::Unknown`] and
//!   [`Value::Inapplicable`]; quoted `'?'` is ordinary text
//! - **Located errors**: parse failures report line, column, and source line
//! - **Atomic file writes** with an explicit overwrite flag
//!
//! ## Quick Start
//!
//! ```rust
//! use starcif::{from_str, to_string, Value};
//!
//! let text = "\
//! data_optics
//! loop_
//! _rlnOpticsGroup
//! _rlnVoltage
//! 1 300.000000
//!
//! data_particles
//! _rlnImageSize 256
//! loop_
//! _rlnCoordinateX
//! _rlnCoordinateY
//! 1614.0 2050.0
//! 1200.5 980.25
//! ";
//!
//! let doc = from_str(text).unwrap();
//! let particles = doc.find_block("particles").unwrap();
//! assert_eq!(particles.find_pair("_rlnImageSize"), Some(&Value::from("256")));
//! assert_eq!(particles.find_loop("_rlnCoordinateX").unwrap().nrows(), 2);
//!
//! let written = to_string(&doc).unwrap();
//! let again = from_str(&written).unwrap();
//! assert!(starcif::compare::equivalent(&doc, &again));
//! ```
//!
//! ## Modules
//!
//! - [`lexer`]: the tokenizer
//! - [`parser`]: the block parser state machine
//! - [`writer`]: serialization
//! - [`compare`]: value-level document equivalence
//! - [`format`]: the accepted syntax in detail

pub mod compare;
pub mod document;
pub mod error;
pub mod file;
pub mod format;
pub mod lexer;
pub mod options;
pub mod parser;
pub mod value;
pub mod writer;

pub use document::{Block, ColumnIter, Document, Item, Loop, Pair};
pub use error::{Error, Result};
pub use file::{read_file, read_file_with_options, write_file, write_file_with_options};
pub use options::{ParseOptions, WriteOptions};
pub use parser::Parser;
pub use value::{Number, QuoteStyle, Value};
pub use writer::Writer;

use std::io;

/// Parse STAR/CIF text into a [`Document`].
///
/// # Examples
///
/// ```rust
/// use starcif::from_str;
///
/// let doc = from_str("data_test\n_cell.length_a 50.0\n").unwrap();
/// assert_eq!(doc.blocks[0].name, "test");
/// ```
///
/// # Errors
///
/// Returns [`Error::MalformedToken`] for an unterminated quote or text field,
/// [`Error::UnexpectedToken`] for a structural violation, and
/// [`Error::EmptyInput`] if the text has no data blocks.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str(s: &str) -> Result<Document> {
    from_str_with_options(s, &ParseOptions::default())
}

/// Parse STAR/CIF text with custom options.
///
/// # Errors
///
/// See [`from_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_str_with_options(s: &str, options: &ParseOptions) -> Result<Document> {
    Parser::new(s, options.clone()).parse_document()
}

/// Parse STAR/CIF text from bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid UTF-8, or any parse error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_slice(v: &[u8]) -> Result<Document> {
    let s = std::str::from_utf8(v).map_err(|e| Error::custom(e.to_string()))?;
    from_str(s)
}

/// Parse STAR/CIF text from an I/O stream.
///
/// # Examples
///
/// ```rust
/// use starcif::from_reader;
/// use std::io::Cursor;
///
/// let doc = from_reader(Cursor::new(b"data_a\n_x 1\n")).unwrap();
/// assert_eq!(doc.len(), 1);
/// ```
///
/// # Errors
///
/// Returns an error if reading fails, or any parse error.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_reader<R>(mut reader: R) -> Result<Document>
where
    R: io::Read,
{
    let mut string = String::new();
    reader
        .read_to_string(&mut string)
        .map_err(|e| Error::io(&e.to_string()))?;
    from_str(&string)
}

/// Serialize a [`Document`] to STAR/CIF text.
///
/// # Examples
///
/// ```rust
/// use starcif::{to_string, Block, Document};
///
/// let mut block = Block::new("a");
/// block.push_pair("_x", "hello world");
/// let text = to_string(&Document::from(vec![block])).unwrap();
/// assert_eq!(text, "data_a\n\n_x 'hello world'\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::Unwritable`] if some name, tag, or value has no valid text form.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string(doc: &Document) -> Result<String> {
    to_string_with_options(doc, &WriteOptions::default())
}

/// Serialize a [`Document`] with custom options.
///
/// # Errors
///
/// See [`to_string`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_string_with_options(doc: &Document, options: &WriteOptions) -> Result<String> {
    let mut writer = Writer::new(options.clone());
    writer.write_document(doc)?;
    Ok(writer.into_inner())
}

/// Serialize a [`Document`] to an I/O stream.
///
/// The whole document is rendered before anything is written, so a
/// serialization error writes nothing.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer<W>(writer: W, doc: &Document) -> Result<()>
where
    W: io::Write,
{
    to_writer_with_options(writer, doc, &WriteOptions::default())
}

/// Serialize a [`Document`] to an I/O stream with custom options.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_writer_with_options<W>(mut writer: W, doc: &Document, options: &WriteOptions) -> Result<()>
where
    W: io::Write,
{
    let text = to_string_with_options(doc, options)?;
    writer
        .write_all(text.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}
