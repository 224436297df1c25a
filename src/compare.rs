//! Value-level document equivalence.
//!
//! Two documents are equivalent when they have the same blocks in the same
//! order, each with the same name, the same items in the same order, and the
//! same save frames. Pairs must agree on tag and value; loops must agree on
//! tags (in order) and rows (in order).
//!
//! Values are compared by meaning rather than spelling:
//!
//! - `?` and `.` match only themselves, whatever the quoting around other values
//! - two values that both read as numbers compare numerically (`1.50` = `1.5`)
//! - everything else compares by exact content; quote style is ignored
//!
//! ```rust
//! use starcif::compare::equivalent;
//! use starcif::from_str;
//!
//! let a = from_str("data_x\n_v 1.50\n_s 'abc'\n").unwrap();
//! let b = from_str("data_x\n_v 1.5\n_s abc\n").unwrap();
//! assert!(equivalent(&a, &b));
//! ```

use crate::document::{Block, Document, Item, Loop};
use crate::Value;
use std::fmt;

/// The first point at which two documents disagree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Difference {
    /// Where the difference is, e.g. `block 0 (particles) > item 2 > row 5, _rlnX`.
    pub path: String,
    pub detail: String,
}

impl fmt::Display for Difference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.detail)
    }
}

/// Returns `true` if `a` and `b` hold the same data.
#[must_use]
pub fn equivalent(a: &Document, b: &Document) -> bool {
    first_difference(a, b).is_none()
}

/// Finds the first difference between two documents, in document order.
#[must_use]
pub fn first_difference(a: &Document, b: &Document) -> Option<Difference> {
    if a.blocks.len() != b.blocks.len() {
        return Some(Difference {
            path: "document".to_string(),
            detail: format!("{} blocks versus {}", a.blocks.len(), b.blocks.len()),
        });
    }
    a.blocks
        .iter()
        .zip(&b.blocks)
        .enumerate()
        .find_map(|(i, (x, y))| block_difference(&format!("block {} ({})", i, x.name), x, y))
}

/// Value equivalence as used by [`equivalent`].
///
/// # Examples
///
/// ```rust
/// use starcif::compare::values_equivalent;
/// use starcif::{QuoteStyle, Value};
///
/// assert!(values_equivalent(&Value::from("7"), &Value::from("7.0")));
/// assert!(values_equivalent(&Value::from("a b"), &Value::quoted("a b", QuoteStyle::Double)));
/// assert!(!values_equivalent(&Value::Unknown, &Value::from("?")));
/// ```
#[must_use]
pub fn values_equivalent(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Text { content: x, .. }, Value::Text { content: y, .. }) => {
            if x == y {
                return true;
            }
            match (a.as_number(), b.as_number()) {
                (Some(m), Some(n)) => m.numerically_eq(&n),
                _ => false,
            }
        }
        _ => a == b,
    }
}

fn block_difference(path: &str, a: &Block, b: &Block) -> Option<Difference> {
    let diff = |detail: String| {
        Some(Difference {
            path: path.to_string(),
            detail,
        })
    };

    if a.name != b.name {
        return diff(format!("name `{}` versus `{}`", a.name, b.name));
    }
    if a.items.len() != b.items.len() {
        return diff(format!("{} items versus {}", a.items.len(), b.items.len()));
    }
    for (i, (x, y)) in a.items.iter().zip(&b.items).enumerate() {
        let item_path = format!("{} > item {}", path, i);
        if let Some(d) = item_difference(&item_path, x, y) {
            return Some(d);
        }
    }

    if a.frames.len() != b.frames.len() {
        return diff(format!("{} save frames versus {}", a.frames.len(), b.frames.len()));
    }
    a.frames.iter().zip(&b.frames).find_map(|(x, y)| {
        block_difference(&format!("{} > save frame ({})", path, x.name), x, y)
    })
}

fn item_difference(path: &str, a: &Item, b: &Item) -> Option<Difference> {
    let diff = |detail: String| {
        Some(Difference {
            path: path.to_string(),
            detail,
        })
    };

    match (a, b) {
        (Item::Pair(x), Item::Pair(y)) => {
            if x.tag != y.tag {
                diff(format!("tag `{}` versus `{}`", x.tag, y.tag))
            } else if !values_equivalent(&x.value, &y.value) {
                diff(format!("{}: {:?} versus {:?}", x.tag, x.value, y.value))
            } else {
                None
            }
        }
        (Item::Loop(x), Item::Loop(y)) => loop_difference(path, x, y),
        (Item::Pair(_), Item::Loop(_)) => diff("pair versus loop".to_string()),
        (Item::Loop(_), Item::Pair(_)) => diff("loop versus pair".to_string()),
    }
}

fn loop_difference(path: &str, a: &Loop, b: &Loop) -> Option<Difference> {
    let diff = |path: String, detail: String| Some(Difference { path, detail });

    if a.tags() != b.tags() {
        return diff(
            path.to_string(),
            format!("tags {:?} versus {:?}", a.tags(), b.tags()),
        );
    }
    if a.nrows() != b.nrows() {
        return diff(
            path.to_string(),
            format!("{} rows versus {}", a.nrows(), b.nrows()),
        );
    }
    for (r, (x, y)) in a.rows().zip(b.rows()).enumerate() {
        for (c, (u, v)) in x.iter().zip(y).enumerate() {
            if !values_equivalent(u, v) {
                return diff(
                    format!("{} > row {}, {}", path, r, a.tags()[c]),
                    format!("{:?} versus {:?}", u, v),
                );
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::from_str;

    fn doc(text: &str) -> Document {
        from_str(text).unwrap()
    }

    #[test]
    fn test_identical_documents() {
        let text = "data_a\n_x 1\nloop_\n_c\n_d\n1 2\n3 4\n";
        assert!(equivalent(&doc(text), &doc(text)));
    }

    #[test]
    fn test_numeric_spelling_is_ignored() {
        let a = doc("data_a\nloop_\n_c\n300.000000\n1e3\n");
        let b = doc("data_a\nloop_\n_c\n300.0\n1000\n");
        assert!(equivalent(&a, &b));
    }

    #[test]
    fn test_sentinels_compare_by_kind() {
        let a = doc("data_a\n_x ?\n");
        let b = doc("data_a\n_x '?'\n");
        let d = first_difference(&a, &b).unwrap();
        assert!(d.path.contains("item 0"));
        assert!(!equivalent(&doc("data_a\n_x .\n"), &doc("data_a\n_x ?\n")));
    }

    #[test]
    fn test_item_order_matters() {
        let a = doc("data_a\n_x 1\n_y 2\n");
        let b = doc("data_a\n_y 2\n_x 1\n");
        assert!(!equivalent(&a, &b));
    }

    #[test]
    fn test_column_order_matters() {
        let a = doc("data_a\nloop_\n_c\n_d\n1 2\n");
        let b = doc("data_a\nloop_\n_d\n_c\n2 1\n");
        assert!(first_difference(&a, &b).unwrap().detail.contains("tags"));
    }

    #[test]
    fn test_row_difference_is_located() {
        let a = doc("data_p\nloop_\n_c\n_d\n1 2\n3 4\n");
        let b = doc("data_p\nloop_\n_c\n_d\n1 2\n3 5\n");
        let d = first_difference(&a, &b).unwrap();
        assert_eq!(d.path, "block 0 (p) > item 0 > row 1, _d");
    }

    #[test]
    fn test_block_count_and_names() {
        assert!(!equivalent(&doc("data_a\n_x 1\n"), &doc("data_a\n_x 1\ndata_b\n_x 1\n")));
        assert!(!equivalent(&doc("data_a\n_x 1\n"), &doc("data_b\n_x 1\n")));
    }

    #[test]
    fn test_frames_are_compared() {
        let a = doc("data_a\nsave_f\n_x 1\nsave_\n");
        let b = doc("data_a\nsave_f\n_x 2\nsave_\n");
        let d = first_difference(&a, &b).unwrap();
        assert!(d.path.contains("save frame (f)"));
    }
}
