use starcif::compare::equivalent;
use starcif::{
    read_file, read_file_with_options, write_file, write_file_with_options, Block, Document,
    Error, Loop, ParseOptions, Value, WriteOptions,
};
use std::fs;
use tempfile::TempDir;

fn sample() -> Document {
    let mut optics = Block::new("optics");
    let mut lp = Loop::new(["_rlnOpticsGroup", "_rlnVoltage"]).unwrap();
    lp.push_row(["1", "300.000000"]).unwrap();
    optics.push_loop(lp);

    let mut particles = Block::new("particles");
    particles.push_pair("_rlnImageSize", 64);
    let mut lp = Loop::new(["_rlnCoordinateX", "_rlnImageName"]).unwrap();
    lp.push_row([Value::from(1614.0), Value::from("000001@Extract/a.mrcs")])
        .unwrap();
    lp.push_row([Value::from(3418.5), Value::from("000002@Extract/a.mrcs")])
        .unwrap();
    particles.push_loop(lp);

    Document::from(vec![optics, particles])
}

#[test]
fn test_write_then_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run_data.star");
    let doc = sample();

    write_file(&doc, &path, false).unwrap();
    let back = read_file(&path).unwrap();
    assert!(equivalent(&doc, &back));
}

#[test]
fn test_existing_file_needs_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("existing.star");
    fs::write(&path, "data_old\n_a 1\n").unwrap();

    let err = write_file(&sample(), &path, false).unwrap_err();
    assert!(matches!(err, Error::FileExists(ref p) if *p == path));
    assert_eq!(fs::read_to_string(&path).unwrap(), "data_old\n_a 1\n");

    write_file(&sample(), &path, true).unwrap();
    let back = read_file(&path).unwrap();
    assert_eq!(back.len(), 2);
    assert!(back.find_block("old").is_none());
}

#[test]
fn test_no_temporary_files_left_behind() {
    let dir = TempDir::new().unwrap();
    write_file(&sample(), dir.path().join("a.star"), false).unwrap();
    write_file(&sample(), dir.path().join("a.star"), true).unwrap();
    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, ["a.star"]);
}

#[test]
fn test_write_options_apply() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("verbatim.star");
    let options = WriteOptions::verbatim().with_header_comment("version 30001");
    write_file_with_options(&sample(), &path, false, &options).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# version 30001\n"));
    assert!(text.contains("300.000000"));
}

#[test]
fn test_parse_errors_surface_from_files() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.star");
    fs::write(&path, "data_a\nloop_\n_x\n_y\n1 2 3\n").unwrap();
    assert!(matches!(read_file(&path), Err(Error::UnexpectedToken { .. })));

    let empty = dir.path().join("empty.star");
    fs::write(&empty, "# nothing\n").unwrap();
    assert!(matches!(read_file(&empty), Err(Error::EmptyInput)));
    let options = ParseOptions::new().with_allow_empty(true);
    assert!(read_file_with_options(&empty, &options).unwrap().is_empty());
}
