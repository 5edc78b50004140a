use std::path::Path;

/// Read a file and convert to UTF-8 if needed.
///
/// Strips a UTF-8 BOM when present, then falls back to Windows-1252 for
/// non-UTF-8 bytes (common for Excel-exported CSVs and pasted logs).
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut bytes = std::fs::read(path).map_err(|e| e.to_string())?;

    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        bytes.drain(..3);
    }

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}
