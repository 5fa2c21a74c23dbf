//! Interactive stdin prompts for the config and chat flows.
//!
//! All prompts share one convention: a closed input stream (Ctrl+D) reads
//! as `None`, which callers treat as cancellation of the whole invocation.

use std::io::{self, BufRead, Write};

/// Print `message` and read one trimmed line.
pub fn read_prompt_line(message: &str) -> io::Result<Option<String>> {
    print!("{message} ");
    io::stdout().flush()?;
    read_line_from(&mut io::stdin().lock())
}

/// Print `message`, showing `default` in brackets when present; an empty
/// entry keeps the default.
pub fn read_line_with_default(message: &str, default: Option<&str>) -> io::Result<Option<String>> {
    match default {
        Some(default) if !default.is_empty() => print!("{message} [{default}]: "),
        _ => print!("{message}: "),
    }
    io::stdout().flush()?;

    let entry = read_line_from(&mut io::stdin().lock())?;
    Ok(entry.map(|text| {
        if text.is_empty() {
            default.unwrap_or("").to_string()
        } else {
            text
        }
    }))
}

fn read_line_from<R: BufRead>(reader: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_and_trims_one_line() {
        let mut input = Cursor::new("  hello world  \n");
        let line = read_line_from(&mut input).expect("read failed");
        assert_eq!(line.as_deref(), Some("hello world"));
    }

    #[test]
    fn empty_line_is_not_cancellation() {
        let mut input = Cursor::new("\n");
        let line = read_line_from(&mut input).expect("read failed");
        assert_eq!(line.as_deref(), Some(""));
    }

    #[test]
    fn closed_stream_reads_as_none() {
        let mut input = Cursor::new("");
        let line = read_line_from(&mut input).expect("read failed");
        assert_eq!(line, None);
    }

    #[test]
    fn last_line_without_newline_still_reads() {
        let mut input = Cursor::new("gpt-4o");
        let line = read_line_from(&mut input).expect("read failed");
        assert_eq!(line.as_deref(), Some("gpt-4o"));
    }
}
