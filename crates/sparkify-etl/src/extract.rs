//! Line-delimited JSON extraction.

use std::{
  fs::File,
  io::{BufRead, BufReader},
  path::Path,
};

use serde_json::Value;
use sparkify_core::{record::Record, Error, Result};

/// Read every record in `path`, paired with its 1-based line number.
///
/// Blank lines are skipped. Any other line must be a JSON object; the first
/// one that is not fails the whole file.
pub fn read_numbered_records(path: &Path) -> Result<Vec<(usize, Record)>> {
  let file = File::open(path).map_err(|e| Error::io(path, e))?;
  let mut records = Vec::new();

  for (idx, line) in BufReader::new(file).lines().enumerate() {
    let line_no = idx + 1;
    let line = line.map_err(|e| Error::io(path, e))?;
    if line.trim().is_empty() {
      continue;
    }

    match serde_json::from_str::<Value>(&line) {
      Ok(Value::Object(record)) => records.push((line_no, record)),
      Ok(other) => {
        return Err(Error::parse(path, line_no, format!("expected a JSON object, found {other}")));
      }
      Err(e) => return Err(Error::parse(path, line_no, e)),
    }
  }

  Ok(records)
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    let mut file = File::create(&path).unwrap();
    file.write_all(body.as_bytes()).unwrap();
    path
  }

  #[test]
  fn reads_records_in_file_order() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(
      &dir,
      "events.json",
      "{\"n\": 1, \"page\": \"Home\"}\n\n{\"n\": 2.5, \"page\": null}\n{\"n\": \"three\"}\n",
    );

    let (lines, records): (Vec<usize>, Vec<Record>) =
      read_numbered_records(&path).unwrap().into_iter().unzip();
    assert_eq!(lines, vec![1, 3, 4]);
    assert_eq!(records[0]["n"], 1);
    assert_eq!(records[1]["n"], 2.5);
    assert!(records[1]["page"].is_null());
    assert_eq!(records[2]["n"], "three");
  }

  #[test]
  fn malformed_line_reports_its_number() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(&dir, "bad.json", "{\"ok\": true}\n{\"broken\": \n");

    match read_numbered_records(&path) {
      Err(Error::Parse { line, .. }) => assert_eq!(line, 2),
      other => panic!("expected a parse error, got {other:?}"),
    }
  }

  #[test]
  fn non_object_line_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = write(&dir, "array.json", "[1, 2, 3]\n");
    assert!(matches!(read_numbered_records(&path), Err(Error::Parse { line: 1, .. })));
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let result = read_numbered_records(&dir.path().join("nope.json"));
    assert!(matches!(result, Err(Error::Io { .. })));
  }
}
