//! STAR/CIF Syntax Reference
//!
//! This module documents the subset of STAR/CIF syntax accepted by the
//! reader and produced by the writer. It contains no code.
//!
//! # Overview
//!
//! STAR (Self-defining Text Archival and Retrieval) is a line-oriented text
//! format. CIF and mmCIF files in crystallography and RELION `.star` files in
//! cryo-EM are both STAR dialects. A file is a sequence of data blocks; each
//! block is a sequence of items, and every item is either a scalar pair or a
//! looped table.
//!
//! # Tokens
//!
//! Tokens are separated by whitespace (space, tab, CR, LF). The reader
//! recognizes these token kinds:
//!
//! | Token | Syntax | Example |
//! |-------|--------|---------|
//! | Block header | `data_` + name (may be empty) | `data_particles` |
//! | Save frame | `save_` + name, closed by a bare `save_` | `save_atom_site` |
//! | Loop | `loop_` | `loop_` |
//! | Loop end | `stop_` | `stop_` |
//! | Tag | `_` + non-whitespace | `_rlnImageName` |
//! | Unknown | a bare `?` | `?` |
//! | Inapplicable | a bare `.` | `.` |
//! | Value | anything else | `1.5`, `'two words'` |
//!
//! Reserved words match in any letter case: `DATA_x` opens a block.
//! `global_` is recognized and rejected.
//!
//! ## Comments
//!
//! `#` starts a comment only at the start of a token. The comment runs to the
//! end of the line and is discarded.
//!
//! ```text
//! _rlnVoltage 300.0   # kV
//! _note a#b           # `a#b` is the value
//! ```
//!
//! ## Values
//!
//! | Form | Syntax | Notes |
//! |------|--------|-------|
//! | Bare | `abc` | No whitespace; cannot start with `_ # $ ' " [ ] ;` |
//! | Single-quoted | `'a b'` | One line only |
//! | Double-quoted | `"a b"` | One line only |
//! | Text field | `;` at column 1 ... `;` at column 1 | Spans lines |
//!
//! A quote character closes a quoted value only when it is followed by
//! whitespace or the end of input, so embedded quotes need no escaping:
//!
//! ```text
//! _name 'O'Brien'      # reads as O'Brien
//! ```
//!
//! A text field starts with `;` in the first column and ends at the next line
//! that starts with `;`. The newline directly after the opening `;` is not
//! part of the value, nor is the newline (or CRLF) before the closing `;`:
//!
//! ```text
//! _details
//! ;
//! first line
//! second line
//! ;
//! ```
//!
//! holds `first line\nsecond line`.
//!
//! The sentinels `?` (unknown) and `.` (inapplicable) only have their special
//! meaning when bare. `'?'` and `"."` are ordinary one-character strings.
//!
//! # Structure
//!
//! ## Pairs
//!
//! A tag followed by exactly one value:
//!
//! ```text
//! _rlnImageSize 256
//! _cell.length_a 50.0
//! ```
//!
//! ## Loops
//!
//! `loop_`, then one or more tags, then values filling rows in tag order.
//! Rows may wrap across lines; only the value count matters.
//!
//! ```text
//! loop_
//! _rlnCoordinateX #1
//! _rlnCoordinateY #2
//! 1614.0 2050.0
//! 1200.5 980.25
//! ```
//!
//! A loop ends at the first `stop_`, tag, `loop_`, `data_`, `save_`, or the
//! end of input. The value count must then be a whole multiple of the tag
//! count. A loop with tags and no values is legal and has zero rows.
//!
//! ## Blocks and save frames
//!
//! Everything from one `data_` header to the next belongs to that block.
//! Block names need not be unique. Within a block, and within each save
//! frame, a tag may be defined only once, whether as a pair or as a loop
//! column (ASCII case-insensitive).
//!
//! Save frames are named sub-blocks inside a data block. They cannot nest.
//!
//! ```text
//! data_dictionary
//! save_atom_site.id
//! _item.name '_atom_site.id'
//! save_
//! ```
//!
//! # Writer output
//!
//! The writer produces the canonical form below. Re-reading it yields an
//! equivalent document, and writing that again yields the same text.
//!
//! - A blank line between blocks and before each loop and each run of pairs
//! - Pair values aligned after the longest pair tag in the block
//! - Loop columns padded to their widest inline value
//! - Values in the lightest form that holds them: bare, `'single'`,
//!   `"double"`, then a text field
//! - Numbers in canonical spelling (`1.500` becomes `1.5`, `+7` becomes `7`)
//! - `stop_` only after an empty loop that is followed by a pair
//! - Save frames after the block's own items
//!
//! ```text
//! # version 30001
//!
//! data_optics
//!
//! loop_
//! _rlnOpticsGroup
//! _rlnVoltage
//! 1 300.0
//! ```
//!
//! # Limits
//!
//! Some strings have no STAR form and cannot be written:
//!
//! - a value that needs a text field (it has a newline, or both quote kinds
//!   followed by whitespace) and also has a later line starting with `;`
//! - a block or frame name with whitespace, or an empty frame name
//! - a save frame that itself holds save frames
//! - a tag containing whitespace
//!
//! Writing any of these fails with [`Error::Unwritable`](crate::Error::Unwritable).
//! Every document the reader accepts with default options can be written back.
