use anyhow::Result;
use std::fs::File;
use std::io::Read;
use std::path::Path;

const SNIFF_LEN: usize = 1024;

/// Guesses whether a file holds text by sniffing its first kilobyte.
///
/// A NUL byte means binary. Otherwise the sample must decode as UTF-8,
/// allowing for a multi-byte character cut off at the end of the sample.
pub fn looks_like_text(path: &Path) -> Result<bool> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; SNIFF_LEN];
    let bytes_read = file.read(&mut buffer)?;
    Ok(sample_is_text(&buffer[..bytes_read]))
}

fn sample_is_text(sample: &[u8]) -> bool {
    if sample.contains(&0) {
        return false;
    }
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        // `error_len() == None` means the input ended mid-character.
        Err(e) => e.error_len().is_none() && sample.len() == SNIFF_LEN,
    }
}

/// Lower-cased base name of a path, or an empty string.
pub fn lower_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
