use starcif::compare::{equivalent, first_difference};
use starcif::{
    from_str, from_str_with_options, read_file, to_string, to_string_with_options, Block,
    Document, Error, Item, Loop, ParseOptions, QuoteStyle, Value, WriteOptions,
};
use std::path::PathBuf;

const FIXTURES: [&str; 8] = [
    "example_with_loops",
    "example_no_loops",
    "example_mixed_1",
    "example_mixed_2",
    "example_nonconsecutive",
    "example_nonconsecutive_2",
    "single_line_end_of_multiblock",
    "single_line_middle_of_multiblock",
];

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(format!("{}.star", name))
}

fn fixture(name: &str) -> Document {
    read_file(fixture_path(name)).unwrap_or_else(|e| panic!("{}: {}", name, e))
}

fn shape(block: &Block) -> Vec<&'static str> {
    block
        .items
        .iter()
        .map(|item| match item {
            Item::Pair(_) => "pair",
            Item::Loop(_) => "loop",
        })
        .collect()
}

#[test]
fn test_fixtures_round_trip() {
    for name in FIXTURES {
        let original = fixture(name);
        let written = to_string(&original).unwrap();
        let reread = from_str(&written).unwrap();
        if let Some(diff) = first_difference(&original, &reread) {
            panic!("{} changed on round-trip at {}\n{}", name, diff, written);
        }
    }
}

#[test]
fn test_fixtures_round_trip_verbatim() {
    for name in FIXTURES {
        let original = fixture(name);
        let written = to_string_with_options(&original, &WriteOptions::verbatim()).unwrap();
        assert_eq!(from_str(&written).unwrap(), original, "{}", name);
    }
}

#[test]
fn test_serialization_is_idempotent() {
    for name in FIXTURES {
        let once = to_string(&fixture(name)).unwrap();
        let twice = to_string(&from_str(&once).unwrap()).unwrap();
        assert_eq!(once, twice, "{}", name);
    }
}

#[test]
fn test_block_order_and_names() {
    let doc = fixture("example_mixed_2");
    let names: Vec<&str> = doc.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["model_general", "model_classes", "model_groups"]);

    let general = &doc.blocks[0];
    assert_eq!(general.items.len(), 22);
    assert_eq!(general.find_pair("_rlnNrClasses").and_then(Value::as_i64), Some(2));
    assert_eq!(
        general.find_pair("_rlnLogLikelihood").and_then(Value::as_f64),
        Some(-2.103477e8)
    );
}

#[test]
fn test_pairs_only_blocks() {
    let doc = fixture("example_no_loops");
    assert_eq!(doc.len(), 2);
    for block in &doc {
        assert_eq!(block.loops().count(), 0);
    }
    let general = doc.find_block("general").unwrap();
    assert_eq!(general.find_pair("_rlnComment"), Some(&Value::from("two words")));
    assert_eq!(general.find_pair("_rlnDefocusComment"), Some(&Value::Unknown));
    assert_eq!(general.find_pair("_rlnPhaseShift"), Some(&Value::Inapplicable));
}

#[test]
fn test_loop_columns_and_tag_comments() {
    let doc = fixture("example_with_loops");
    let particles = doc.find_block("particles").unwrap();
    let lp = particles.find_loop("_rlnImageName").unwrap();
    assert_eq!(lp.width(), 12);
    assert_eq!(lp.nrows(), 5);
    assert_eq!(lp.tags()[0], "_rlnCoordinateX");
    assert_eq!(
        lp.get(3, "_rlnMicrographName").and_then(Value::as_str),
        Some("MotionCorr/job002/Movies/20170629_00022_frameImage.mrc")
    );
    let groups: Vec<i64> = lp
        .column("_rlnOpticsGroup")
        .unwrap()
        .filter_map(Value::as_i64)
        .collect();
    assert_eq!(groups, [1, 1, 1, 2, 2]);
}

#[test]
fn test_single_row_loop_at_end_of_multiblock() {
    let doc = fixture("single_line_end_of_multiblock");
    assert_eq!(doc.len(), 2);
    assert_eq!(doc.blocks[0].find_loop("_rlnOpticsGroup").unwrap().nrows(), 2);
    let particles = doc.blocks[1].find_loop("_rlnCoordinateX").unwrap();
    assert_eq!(particles.nrows(), 1);
    assert_eq!(particles.get(0, "_rlnCoordinateY").and_then(Value::as_f64), Some(2050.0));

    let reread = from_str(&to_string(&doc).unwrap()).unwrap();
    assert_eq!(reread.blocks[1].find_loop("_rlnCoordinateX").unwrap().nrows(), 1);
}

#[test]
fn test_single_row_loop_in_middle_of_multiblock() {
    let doc = fixture("single_line_middle_of_multiblock");
    let optics = doc.find_block("optics").unwrap().find_loop("_rlnVoltage").unwrap();
    assert_eq!(optics.nrows(), 1);
    assert_eq!(optics.row(0).unwrap()[0], Value::from("opticsGroup1"));
    assert_eq!(
        doc.find_block("particles").unwrap().find_loop("_rlnImageName").unwrap().nrows(),
        3
    );

    let reread = from_str(&to_string(&doc).unwrap()).unwrap();
    let optics = reread.find_block("optics").unwrap().find_loop("_rlnVoltage").unwrap();
    assert_eq!(optics.nrows(), 1);
}

#[test]
fn test_nonconsecutive_loops_keep_item_order() {
    let doc = fixture("example_nonconsecutive");
    let block = &doc.blocks[0];
    assert_eq!(shape(block), ["pair", "pair", "loop", "pair", "pair", "loop"]);
    assert_eq!(block.find_pair("_rlnReferenceImage"), Some(&Value::from("ref 01.mrc")));

    let reread = from_str(&to_string(&doc).unwrap()).unwrap();
    assert_eq!(shape(&reread.blocks[0]), shape(block));
}

#[test]
fn test_nonconsecutive_mixed_block() {
    let doc = fixture("example_nonconsecutive_2");
    assert_eq!(doc.blocks[0].find_pair("_rlnHeaderName"), Some(&Value::from("test_header")));

    let tables = doc.find_block("tables").unwrap();
    assert_eq!(shape(tables), ["loop", "pair", "loop", "pair", "pair", "loop"]);
    assert_eq!(tables.find_pair("_rlnSeparator"), Some(&Value::Unknown));
    assert_eq!(tables.find_loop("_rlnOther").unwrap().nrows(), 3);
    assert_eq!(
        tables.find_pair("_rlnNote").and_then(Value::as_str),
        Some("A note that spans\nmore than one line.")
    );
    let last = tables.find_loop("_rlnLastLabel").unwrap();
    assert!(last.is_empty());
    assert_eq!(last.width(), 2);
}

#[test]
fn test_duplicate_tag_in_loop_is_rejected() {
    let text = "data_a\nloop_\n_rlnX\n_rlnY\n_rlnX\n1 2 3\n";
    let err = from_str(text).unwrap_err();
    assert!(matches!(err, Error::UnexpectedToken { line: 5, col: 1, .. }));
    assert!(err.to_string().contains("_rlnX"));

    let relaxed = ParseOptions::new().with_check_duplicate_tags(false);
    assert!(from_str_with_options(text, &relaxed).is_err());
}

#[test]
fn test_sentinels_differ_from_quoted_text() {
    let doc = from_str("data_s\n_a ?\n_b '?'\n_c .\n_d \".\"\n").unwrap();
    let block = &doc.blocks[0];
    assert_eq!(block.find_pair("_a"), Some(&Value::Unknown));
    assert_eq!(block.find_pair("_b"), Some(&Value::from("?")));
    assert_eq!(block.find_pair("_c"), Some(&Value::Inapplicable));
    assert_eq!(block.find_pair("_d"), Some(&Value::from(".")));

    let written = to_string(&doc).unwrap();
    assert!(written.contains("_a ?\n"));
    assert!(written.contains("_b '?'\n"));
    assert_eq!(from_str(&written).unwrap(), doc);
}

#[test]
fn test_awkward_values_survive() {
    let values = [
        "",
        "two words",
        "it's",
        "it' s",
        "say \"hi\" now",
        "both ' and \" here",
        "line one\nline two",
        "\nleading newline",
        "trailing newline\n",
        "_not_a_tag",
        "#not_a_comment",
        "loop_",
        "data_fake",
        "?",
        ".",
        "[bracket",
        "$dollar",
        "a;b",
    ];
    let mut lp = Loop::new(["_id", "_text"]).unwrap();
    let mut block = Block::new("awkward");
    for (i, v) in values.iter().enumerate() {
        lp.push_row([Value::from(i as i64), Value::from(*v)]).unwrap();
        block.push_pair(format!("_pair_{}", i), *v);
    }
    block.push_loop(lp);
    let doc = Document::from(vec![block]);

    let reread = from_str(&to_string(&doc).unwrap()).unwrap();
    assert_eq!(reread, doc);
}

#[test]
fn test_unwritable_value_is_reported() {
    let mut block = Block::new("bad");
    block.push_pair("_text", "first\n;second");
    let err = to_string(&Document::from(vec![block])).unwrap_err();
    assert!(matches!(err, Error::Unwritable(_)));
}

#[test]
fn test_quote_hints_are_ignored_by_equivalence() {
    let a = from_str("data_q\n_v \"abc\"\n_n 1.500\n").unwrap();
    let b = from_str("data_q\n_v abc\n_n 1.5\n").unwrap();
    assert!(equivalent(&a, &b));
    assert_eq!(a.blocks[0].find_pair("_v").and_then(Value::style), Some(QuoteStyle::Double));
}

#[test]
fn test_empty_loop_followed_by_pair() {
    let mut block = Block::new("e");
    block.push_loop(Loop::new(["_col"]).unwrap());
    block.push_pair("_after", "1");
    let doc = Document::from(vec![block]);

    let written = to_string(&doc).unwrap();
    assert!(written.contains("stop_"));
    let reread = from_str(&written).unwrap();
    assert_eq!(shape(&reread.blocks[0]), ["loop", "pair"]);
    assert!(equivalent(&doc, &reread));
}

#[test]
fn test_empty_block_names() {
    let doc = from_str("data_\n_a 1\ndata_\n_a 2\n").unwrap();
    assert_eq!(doc.len(), 2);
    assert!(doc.iter().all(|b| b.name.is_empty()));
    assert_eq!(from_str(&to_string(&doc).unwrap()).unwrap(), doc);
}

#[test]
fn test_header_comment_is_ignored_on_read() {
    let doc = fixture("example_mixed_1");
    let options = WriteOptions::new().with_header_comment("version 30001");
    let written = to_string_with_options(&doc, &options).unwrap();
    assert!(written.starts_with("# version 30001\n"));
    assert!(equivalent(&from_str(&written).unwrap(), &doc));
}

#[test]
fn test_error_position_and_context() {
    let err = from_str("data_a\n_x 'unterminated\n").unwrap_err();
    assert_eq!(err.position(), Some((2, 4)));
    assert!(err.to_string().contains("_x 'unterminated"));
}
