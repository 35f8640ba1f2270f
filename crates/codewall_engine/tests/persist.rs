use std::fs;

use codewall_engine::{ensure_output_dir, AtomicFileWriter};
use image::{Rgba, RgbaImage};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("index.html", b"<p>one</p>").unwrap();
    assert_eq!(first.file_name().unwrap(), "index.html");
    assert_eq!(fs::read_to_string(&first).unwrap(), "<p>one</p>");

    let second = writer.write("index.html", b"<p>two</p>").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "<p>two</p>");
    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 1);
}

#[test]
fn no_partial_file_when_output_dir_is_a_file() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    assert!(writer.write("frame.png", b"data").is_err());
    assert!(!file_path.with_file_name("frame.png").exists());
}

#[test]
fn png_frames_decode_back_to_the_same_size() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    let frame = RgbaImage::from_pixel(12, 7, Rgba([10, 20, 30, 255]));

    let path = writer.write_png("frame.png", &frame).unwrap();
    let bytes = fs::read(path).unwrap();
    assert!(bytes.starts_with(b"\x89PNG"));
    let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
    assert_eq!(decoded, frame);
}
