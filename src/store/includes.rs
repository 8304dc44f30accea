//! Include document store (`config.kdl`).
//!
//! The document is scanned line by line. A brace/comment/string tracker
//! keeps nesting state across lines so that only top-level `include`
//! directives are reported; everything else in the document is carried
//! through untouched.
use std::io;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use super::{
    ConfigItem, ConfigState, ConfigStore, DISABLED_MARKER, Locator, Unmatched, classify_line,
    directive_body,
};
use crate::error::StoreError;

/// A KDL document whose top-level `include` directives can be toggled.
#[derive(Debug, Clone)]
pub struct IncludeDocumentStore {
    path: PathBuf,
    doc: Option<Document>,
}

/// In-memory copy of the document taken by the last scan.
#[derive(Debug, Clone)]
struct Document {
    lines: Vec<String>,
    digest: String,
    changed: bool,
}

impl IncludeDocumentStore {
    /// Create a store for the document at `path`.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path, doc: None }
    }

    /// The document path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String, StoreError> {
        std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound {
                    path: self.path.clone(),
                }
            } else {
                StoreError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })
    }
}

impl ConfigStore for IncludeDocumentStore {
    fn scan(&mut self) -> Result<Vec<ConfigItem>, StoreError> {
        let content = self.read()?;
        let lines: Vec<String> = content.split('\n').map(str::to_string).collect();

        let mut items = Vec::new();
        let mut nesting = Nesting::default();
        for (index, line) in lines.iter().enumerate() {
            if nesting.at_top_level()
                && let Some(state) = classify_line(line)
                && let Some((name, _)) = directive_body(line).and_then(parse_argument)
            {
                items.push(ConfigItem {
                    name,
                    state,
                    size: None,
                    locator: Locator::Line {
                        index,
                        text: line.trim().to_string(),
                    },
                });
            }
            nesting.advance(line);
        }

        tracing::debug!(
            "parsed {} include directive(s) from {}",
            items.len(),
            self.path.display()
        );
        self.doc = Some(Document {
            lines,
            digest: sha256_hex(content.as_bytes()),
            changed: false,
        });
        Ok(items)
    }

    fn unmatched(&self) -> Unmatched {
        Unmatched::Skip
    }

    fn mutate(&mut self, item: &ConfigItem, to: ConfigState) -> Result<(), StoreError> {
        let foreign = || StoreError::ForeignItem(item.name.clone());
        let Locator::Line { index, text } = &item.locator else {
            return Err(foreign());
        };
        let doc = self.doc.as_mut().ok_or_else(foreign)?;
        let line = doc
            .lines
            .get_mut(*index)
            .filter(|l| l.trim() == text.as_str())
            .ok_or_else(foreign)?;

        *line = match to {
            ConfigState::Excluded => add_marker(line),
            ConfigState::Included => remove_marker(line),
        };
        doc.changed = true;
        Ok(())
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        let Some(doc) = self.doc.as_mut().filter(|d| d.changed) else {
            return Ok(());
        };

        let on_disk = std::fs::read(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        if sha256_hex(&on_disk) != doc.digest {
            return Err(StoreError::Modified {
                path: self.path.clone(),
            });
        }

        let content = doc.lines.join("\n");
        write_atomic(&self.path, content.as_bytes())?;
        tracing::info!("rewrote {}", self.path.display());

        doc.digest = sha256_hex(content.as_bytes());
        doc.changed = false;
        Ok(())
    }
}

/// Split a trailing carriage return off `line`.
fn split_cr(line: &str) -> (&str, &str) {
    line.strip_suffix('\r').map_or((line, ""), |body| (body, "\r"))
}

/// Append the disabled marker, keeping any trailing whitespace so that
/// [`remove_marker`] restores the line exactly.
fn add_marker(line: &str) -> String {
    let (body, cr) = split_cr(line);
    format!("{body} {DISABLED_MARKER}{cr}")
}

/// Byte offset of the disabled marker in `line`, looking only past the
/// directive's argument. `None` when the line has no marker there or the
/// argument does not parse.
pub(crate) fn marker_offset(line: &str) -> Option<usize> {
    let rest = directive_body(line)?;
    let (_, arg_end) = parse_argument(rest)?;
    let from = line.len() - line.trim_start().len() + "include".len() + arg_end;
    line.get(from..)?.find(DISABLED_MARKER).map(|p| from + p)
}

/// Strip the disabled marker from the comment region of `line`.
///
/// A marker ending the line takes exactly one preceding space with it.
/// Text following the marker is kept as an ordinary comment.
fn remove_marker(line: &str) -> String {
    let (body, cr) = split_cr(line);
    let Some(pos) = marker_offset(body) else {
        return line.to_string();
    };

    let before = body.get(..pos).unwrap_or(body);
    let after = body.get(pos + DISABLED_MARKER.len()..).unwrap_or("");
    if after.trim().is_empty() {
        format!("{}{cr}", before.strip_suffix(' ').unwrap_or(before))
    } else {
        format!("{before}//{after}{cr}")
    }
}

/// Parse the first argument of an `include` directive.
///
/// Accepts quoted strings with escapes, raw strings (`r"…"`, `r#"…"#`,
/// `#"…"#`) and bare tokens. Returns the value and the byte offset in
/// `body` just past it, or `None` when nothing parsable follows.
fn parse_argument(body: &str) -> Option<(String, usize)> {
    let s = body.trim_start();
    let lead = body.len() - s.len();

    if s.starts_with('"') {
        let mut out = String::new();
        let mut chars = s.char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => return Some((out, lead + i + 1)),
                '\\' => match chars.next()?.1 {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    's' => out.push(' '),
                    other => out.push(other),
                },
                c => out.push(c),
            }
        }
        return None;
    }

    if let Some((hashes, open)) = raw_string_open(s.as_bytes(), 0) {
        let rest = s.get(open..)?;
        let close = format!("\"{}", "#".repeat(hashes));
        let end = rest.find(&close)?;
        let value = rest.get(..end)?.to_string();
        return Some((value, lead + open + end + close.len()));
    }

    let token: String = s
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != ';')
        .collect();
    if token.is_empty() || token.starts_with(['/', '{', '}']) || token.contains('=') {
        return None;
    }
    let end = lead + token.len();
    Some((token, end))
}

/// Detect a raw string opener at `i`: optional `r`, any number of `#`,
/// then `"`. Returns the hash count and the opener length.
fn raw_string_open(bytes: &[u8], i: usize) -> Option<(usize, usize)> {
    let mut j = i;
    if bytes.get(j) == Some(&b'r') {
        let prev_is_ident = i
            .checked_sub(1)
            .and_then(|p| bytes.get(p))
            .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'-');
        if prev_is_ident {
            return None;
        }
        j += 1;
    }
    let hash_start = j;
    while bytes.get(j) == Some(&b'#') {
        j += 1;
    }
    let hashes = j - hash_start;
    (bytes.get(j) == Some(&b'"') && j > i).then_some((hashes, j + 1 - i))
}

/// Kind of string literal the tracker is inside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringKind {
    Escaped,
    Raw { hashes: usize },
}

/// Lexical nesting carried from one line to the next.
#[derive(Debug, Default, Clone, Copy)]
struct Nesting {
    braces: usize,
    block_comments: usize,
    string: Option<StringKind>,
}

impl Nesting {
    const fn at_top_level(&self) -> bool {
        self.braces == 0 && self.block_comments == 0 && self.string.is_none()
    }

    fn advance(&mut self, line: &str) {
        let bytes = line.as_bytes();
        let at = |i: usize| bytes.get(i).copied();
        let mut i = 0;

        while let Some(b) = at(i) {
            match self.string {
                Some(StringKind::Escaped) => {
                    match b {
                        b'\\' => i += 1,
                        b'"' => self.string = None,
                        _ => {}
                    }
                    i += 1;
                }
                Some(StringKind::Raw { hashes }) => {
                    let closes = b == b'"' && (1..=hashes).all(|k| at(i + k) == Some(b'#'));
                    if closes {
                        self.string = None;
                        i += hashes;
                    }
                    i += 1;
                }
                None if self.block_comments > 0 => {
                    match (b, at(i + 1)) {
                        (b'*', Some(b'/')) => {
                            self.block_comments -= 1;
                            i += 1;
                        }
                        (b'/', Some(b'*')) => {
                            self.block_comments += 1;
                            i += 1;
                        }
                        _ => {}
                    }
                    i += 1;
                }
                None => {
                    if let Some((hashes, len)) = raw_string_open(bytes, i) {
                        self.string = Some(StringKind::Raw { hashes });
                        i += len;
                        continue;
                    }
                    match (b, at(i + 1)) {
                        (b'"', _) => self.string = Some(StringKind::Escaped),
                        (b'/', Some(b'/')) => break,
                        (b'/', Some(b'*')) => {
                            self.block_comments += 1;
                            i += 1;
                        }
                        (b'{', _) => self.braces += 1,
                        (b'}', _) => self.braces = self.braces.saturating_sub(1),
                        _ => {}
                    }
                    i += 1;
                }
            }
        }
    }
}

/// Lowercase hex SHA-256 digest of `bytes`.
fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Replace the file behind `path` by writing a sibling temp file and
/// renaming it into place. Symlinks are resolved first so a linked
/// document stays linked.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let target = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let tmp = {
        let mut name = target.file_name().unwrap_or_default().to_owned();
        name.push(".niri-mcp-tmp");
        target.with_file_name(name)
    };
    let io_err = |source: io::Error| StoreError::Io {
        path: target.clone(),
        source,
    };
    let cleanup = || {
        let _ = std::fs::remove_file(&tmp);
    };

    std::fs::write(&tmp, bytes).map_err(io_err)?;
    if let Ok(meta) = std::fs::metadata(&target)
        && let Err(e) = std::fs::set_permissions(&tmp, meta.permissions())
    {
        cleanup();
        return Err(io_err(e));
    }
    if let Err(e) = std::fs::rename(&tmp, &target) {
        cleanup();
        return Err(io_err(e));
    }
    Ok(())
}
