//! Input and output utility.
//!
//! Matrix elements are exchanged as whitespace-separated text records.
//! Readers are deliberately permissive: they stop at the first token that
//! does not parse and keep whatever was read up to that point.
use std::{io, str};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::{self, Path};
use flate2::read::GzDecoder;
use xz2::read::XzDecoder;
use super::utils::cast;

/// Helper function for creating `io::Error` with
/// `io::ErrorKind::InvalidData`.
pub fn invalid_data<E: Into<Box<dyn Error + Send + Sync>>>(error: E)
                                                         -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, error)
}

/// Works just like Python's `os.path.splitext`.  Note that the returned
/// extension includes the dot.  If there is no extension, returns an empty
/// string as the extension.  Only works on UTF-8 strings due to limitations
/// of the `std::path::Path` API.
pub fn split_extension(path: &Path) -> io::Result<(&str, &str)> {
    let path = path.to_str()
        .ok_or_else(|| invalid_data("path is not UTF-8"))?;
    match path.rfind('.') {
        None => Ok((path, "")),
        Some(i) => {
            let ext = &path[i ..];
            if ext.chars().any(|c| path::is_separator(c)) {
                Ok((path, ""))
            } else {
                Ok((&path[.. i], ext))
            }
        }
    }
}

/// Open a compressed file and decode based on the file extension.
/// If the extension does not end in "z", the file is read as-is.
pub fn open_compressed(path: &Path) -> io::Result<Box<dyn Read>> {
    let file = File::open(path)?;
    let (_, ext) = split_extension(path)?;
    let ext = if ext.ends_with('z') { ext } else { "" };
    Ok(match ext {
        "" => Box::new(file),
        ".gz" => Box::new(GzDecoder::new(file)),
        ".xz" => Box::new(XzDecoder::new(file)),
        _ => return Err(invalid_data(
            format!("unrecognized compression format: {}", ext),
        )),
    })
}

/// Read everything into a string.
pub fn read_text<R: Read>(mut r: R) -> io::Result<String> {
    let mut text = String::new();
    r.read_to_string(&mut text)?;
    Ok(text)
}

/// Whitespace-separated fields of a text.
#[derive(Clone, Debug)]
pub struct Fields<'a> {
    tokens: str::SplitWhitespace<'a>,
}

impl<'a> Fields<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { tokens: text.split_whitespace() }
    }

    /// Parse the next field.  Returns `None` at the end of input or if the
    /// field fails to parse.
    pub fn next<T: str::FromStr>(&mut self) -> Option<T> {
        self.tokens.next()?.parse().ok()
    }
}

/// Map a hole orbital of the particle-particle-hole exchange format onto a
/// particle orbital: `(L - c) mod L`, where `L` is the number of spatial
/// orbitals.  This reflection is part of the file format and must not be
/// changed independently of the files' producer.
pub fn reflect_hole(c: i64, num_spatial: usize) -> Option<usize> {
    let l: i64 = cast(num_spatial);
    if c < 0 || c > l {
        return None;
    }
    Some(cast((l - c) % l))
}
