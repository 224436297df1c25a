//! Read a STAR file, write it back, and check the copy is equivalent.
//!
//! Run with: cargo run --example roundtrip -- tests/data/example_with_loops.star

use starcif::compare::first_difference;
use starcif::{read_file, to_string, write_file, Item};
use std::env;
use std::error::Error;
use std::path::PathBuf;

fn main() -> Result<(), Box<dyn Error>> {
    let input = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("tests/data/example_mixed_2.star"));

    let doc = read_file(&input)?;
    for block in &doc {
        println!("data_{}", block.name);
        for item in &block.items {
            match item {
                Item::Pair(pair) => println!("  {} = {}", pair.tag, pair.value),
                Item::Loop(lp) => println!("  loop: {} columns, {} rows", lp.width(), lp.nrows()),
            }
        }
    }

    let output = env::temp_dir().join("starcif_roundtrip.star");
    write_file(&doc, &output, true)?;
    let copy = read_file(&output)?;

    match first_difference(&doc, &copy) {
        None => println!("✓ Round-trip successful ({})", output.display()),
        Some(diff) => {
            println!("{}", to_string(&doc)?);
            return Err(format!("round-trip changed the document at {}", diff).into());
        }
    }
    Ok(())
}
