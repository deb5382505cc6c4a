//! Per-state table of open read handles, keyed by file name

use crate::interpreter::errors::RuntimeError;
use rustc_hash::FxHashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};

#[derive(Debug, Default)]
pub struct FileTable {
    handles: FxHashMap<String, BufReader<File>>,
}

impl FileTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self, name: &str) -> bool {
        self.handles.contains_key(name)
    }

    /// Open `name` for reading and register the handle
    pub fn open(&mut self, name: &str) -> Result<(), RuntimeError> {
        if self.is_open(name) {
            return Err(RuntimeError::FileError {
                file: name.to_string(),
                message: "file is already open".to_string(),
            });
        }
        let file = File::open(name).map_err(|e| RuntimeError::FileError {
            file: name.to_string(),
            message: e.to_string(),
        })?;
        self.handles.insert(name.to_string(), BufReader::new(file));
        Ok(())
    }

    /// Read the next line of `name`.
    ///
    /// Returns `Ok(None)` at end of stream.
    pub fn read_line(&mut self, name: &str) -> Result<Option<String>, RuntimeError> {
        let reader = self
            .handles
            .get_mut(name)
            .ok_or_else(|| RuntimeError::FileError {
                file: name.to_string(),
                message: "file is not open".to_string(),
            })?;
        let mut line = String::new();
        let read = reader
            .read_line(&mut line)
            .map_err(|e| RuntimeError::FileError {
                file: name.to_string(),
                message: e.to_string(),
            })?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    /// Drop the handle for `name`; the entry is gone once this returns
    pub fn close(&mut self, name: &str) -> Result<(), RuntimeError> {
        match self.handles.remove(name) {
            Some(reader) => {
                drop(reader);
                Ok(())
            }
            None => Err(RuntimeError::FileError {
                file: name.to_string(),
                message: "file is not open".to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Names of the open files, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handles.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Display for FileTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in self.names() {
            writeln!(f, "{}", name)?;
        }
        Ok(())
    }
}
