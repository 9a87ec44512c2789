use diffview_git::GitRepo;
use tracing::debug;

use crate::error::EngineError;
use crate::types::ChangeRecord;

/// Produces the raw change list for one run
pub trait StatusSource {
    fn changes(&self) -> Result<Vec<ChangeRecord>, EngineError>;
}

/// Change list from `git status --porcelain` of a working copy
pub struct GitStatusSource<'a> {
    repo: &'a GitRepo,
}

impl<'a> GitStatusSource<'a> {
    pub fn new(repo: &'a GitRepo) -> Self {
        Self { repo }
    }
}

impl StatusSource for GitStatusSource<'_> {
    fn changes(&self) -> Result<Vec<ChangeRecord>, EngineError> {
        let output = self.repo.status_porcelain()?;
        let records = parse_status(&output)?;

        debug!(records = records.len(), "Parsed git status");

        Ok(records)
    }
}

/// Parse porcelain status output. Blank lines are ignored; any other
/// unparseable line fails the whole parse.
pub fn parse_status(output: &str) -> Result<Vec<ChangeRecord>, EngineError> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(parse_status_line)
        .collect()
}

/// Parse a single `<code> <path>` or `R <before> -> <after>` line.
pub fn parse_status_line(line: &str) -> Result<ChangeRecord, EngineError> {
    let line = line.trim();
    let malformed = || EngineError::MalformedStatus(line.to_string());

    let (code, rest) = line.split_once(char::is_whitespace).ok_or_else(malformed)?;
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(malformed());
    }

    let record = match code {
        "M" => ChangeRecord::modified(unquote(rest).ok_or_else(malformed)?),
        "A" => ChangeRecord::added(unquote(rest).ok_or_else(malformed)?),
        "D" => ChangeRecord::deleted(unquote(rest).ok_or_else(malformed)?),
        "??" => ChangeRecord::untracked(unquote(rest).ok_or_else(malformed)?),
        "R" => {
            let (before, after) = rest.split_once(" -> ").ok_or_else(malformed)?;
            let (before, after) = (before.trim(), after.trim());
            if before.is_empty() || after.is_empty() {
                return Err(malformed());
            }
            ChangeRecord::renamed(
                unquote(before).ok_or_else(malformed)?,
                unquote(after).ok_or_else(malformed)?,
            )
        }
        _ => return Err(malformed()),
    };

    Ok(record)
}

/// Undo git's C-style quoting of unusual paths (`"a\"b"` -> `a"b`).
/// Unquoted paths are returned as-is. `None` if an escape does not fit in a
/// byte or the unescaped bytes are not UTF-8.
fn unquote(path: &str) -> Option<String> {
    let Some(inner) = path
        .strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
    else {
        return Some(path.to_string());
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut iter = inner.bytes().peekable();
    while let Some(b) = iter.next() {
        if b != b'\\' {
            bytes.push(b);
            continue;
        }
        match iter.next() {
            Some(b'n') => bytes.push(b'\n'),
            Some(b't') => bytes.push(b'\t'),
            Some(b'r') => bytes.push(b'\r'),
            Some(d @ b'0'..=b'7') => {
                // Up to three octal digits encode one raw byte
                let mut value = u32::from(d - b'0');
                for _ in 0..2 {
                    match iter.peek() {
                        Some(&next @ b'0'..=b'7') => {
                            value = value * 8 + u32::from(next - b'0');
                            iter.next();
                        }
                        _ => break,
                    }
                }
                bytes.push(u8::try_from(value).ok()?);
            }
            Some(other) => bytes.push(other),
            None => bytes.push(b'\\'),
        }
    }

    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChangeKind;

    #[test]
    fn test_parse_each_recognized_code() {
        let m = parse_status_line("M src/main.rs").unwrap();
        assert_eq!(m, ChangeRecord::modified("src/main.rs"));

        let a = parse_status_line("A  new.txt").unwrap();
        assert_eq!(a, ChangeRecord::added("new.txt"));

        let d = parse_status_line("D old.txt").unwrap();
        assert_eq!(d, ChangeRecord::deleted("old.txt"));

        let u = parse_status_line("?? notes.md").unwrap();
        assert_eq!(u, ChangeRecord::untracked("notes.md"));
        assert_eq!(u.kind(), ChangeKind::Untracked);
    }

    #[test]
    fn test_parse_rename() {
        let r = parse_status_line("R  old/name.js -> new/name.js").unwrap();
        assert_eq!(r.kind(), ChangeKind::Renamed);
        assert_eq!(r.path_before(), Some("old/name.js"));
        assert_eq!(r.path_after(), Some("new/name.js"));
    }

    #[test]
    fn test_leading_status_column_is_trimmed() {
        // Worktree-only modification: first column is a space
        let m = parse_status_line(" M README.md").unwrap();
        assert_eq!(m, ChangeRecord::modified("README.md"));
    }

    #[test]
    fn test_untracked_directory_left_unexpanded() {
        let u = parse_status_line("?? vendor/").unwrap();
        assert_eq!(u.path_after(), Some("vendor/"));
    }

    #[test]
    fn test_unknown_code_is_error() {
        let err = parse_status_line("UU conflicted.rs").unwrap_err();
        assert!(matches!(err, EngineError::MalformedStatus(ref l) if l == "UU conflicted.rs"));
    }

    #[test]
    fn test_missing_path_is_error() {
        assert!(parse_status_line("M").is_err());
        assert!(parse_status_line("R  only-one-path.js").is_err());
        assert!(parse_status_line("R  -> new.js").is_err());
    }

    #[test]
    fn test_parse_status_drops_blank_lines() {
        let output = "\n M a.txt\n\n?? b/\n   \nR  c.txt -> d.txt\n";
        let records = parse_status(output).unwrap();

        assert_eq!(
            records,
            vec![
                ChangeRecord::modified("a.txt"),
                ChangeRecord::untracked("b/"),
                ChangeRecord::renamed("c.txt", "d.txt"),
            ]
        );
    }

    #[test]
    fn test_parse_status_aborts_on_any_bad_line() {
        let output = "M a.txt\nX b.txt\nA c.txt\n";
        assert!(parse_status(output).is_err());
    }

    #[test]
    fn test_quoted_paths_are_unquoted() {
        let m = parse_status_line(r#"M "with \"quote\".txt""#).unwrap();
        assert_eq!(m.path(), r#"with "quote".txt"#);

        let a = parse_status_line(r#"A "caf\303\251.txt""#).unwrap();
        assert_eq!(a.path(), "café.txt");

        let t = parse_status_line(r#"?? "tab\there""#).unwrap();
        assert_eq!(t.path(), "tab\there");
    }

    #[test]
    fn test_bad_quoted_paths_are_errors() {
        // \777 does not fit in a byte
        let err = parse_status_line(r#"M "a\777.txt""#).unwrap_err();
        assert!(matches!(err, EngineError::MalformedStatus(_)));

        // A lone \377 byte is not UTF-8
        assert!(parse_status_line(r#"?? "bad\377name""#).is_err());
        assert!(parse_status_line(r#"R  "ok.txt" -> "x\400.txt""#).is_err());
    }
}
