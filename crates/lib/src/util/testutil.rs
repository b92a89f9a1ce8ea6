//! Test utilities for libbs.
//!
//! Cross-platform helpers for tests that need to run shell commands or build
//! small zip artifacts in memory.

use std::io::{Cursor, Write};

use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Returns the shell command and args to execute a shell script.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("/bin/sh", vec!["-c".to_string(), script.to_string()])
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> (&'static str, Vec<String>) {
  ("cmd.exe", vec!["/C".to_string(), script.to_string()])
}

/// Build an in-memory zip with the given `(name, content)` entries.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
  let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
  for (name, content) in entries {
    writer.start_file(*name, SimpleFileOptions::default()).unwrap();
    writer.write_all(content.as_bytes()).unwrap();
  }
  writer.finish().unwrap().into_inner()
}

/// Build an in-memory jar whose manifest carries the given `Main-Class`.
pub fn jar_bytes(main_class: Option<&str>) -> Vec<u8> {
  let manifest = match main_class {
    Some(class) => format!("Manifest-Version: 1.0\r\nMain-Class: {}\r\n", class),
    None => "Manifest-Version: 1.0\r\n".to_string(),
  };
  zip_bytes(&[("META-INF/MANIFEST.MF", &manifest)])
}
