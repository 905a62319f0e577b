use std::fs;
use std::io::{self, Read};

use crate::error::{Error, Result};

/// Reads the whole of `file`, or stdin when no path is given.
pub(crate) fn read_input(file: Option<&str>) -> Result<Vec<u8>> {
    match file {
        Some(path) => Ok(fs::read(path)?),
        None => {
            let mut buffer = Vec::new();
            io::stdin().read_to_end(&mut buffer)?;
            Ok(buffer)
        }
    }
}

/// Like [`read_input`], for inputs that must be text (PEM).
pub(crate) fn read_text(file: Option<&str>) -> Result<String> {
    String::from_utf8(read_input(file)?).map_err(|_| Error::NotText)
}

/// Formats `data` like `xxd`: offset, 16 hex octets split in two halves, ASCII column.
pub(crate) fn format_hex_dump(data: &[u8]) -> String {
    const BYTES_PER_LINE: usize = 16;
    let mut output = String::new();

    for (line, chunk) in data.chunks(BYTES_PER_LINE).enumerate() {
        output.push_str(&format!("{:08x}  ", line * BYTES_PER_LINE));
        for i in 0..BYTES_PER_LINE {
            match chunk.get(i) {
                Some(byte) => output.push_str(&format!("{:02x} ", byte)),
                None => output.push_str("   "),
            }
            if i == 7 {
                output.push(' ');
            }
        }
        let ascii: String = chunk
            .iter()
            .map(|&b| {
                if b.is_ascii_graphic() || b == b' ' {
                    b as char
                } else {
                    '.'
                }
            })
            .collect();
        output.push_str(&format!(" |{ascii}|\n"));
    }

    output
}
