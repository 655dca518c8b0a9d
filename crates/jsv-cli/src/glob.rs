//! # Path-Pattern Enumeration
//!
//! Expands the `files` patterns into the files to validate.
//!
//! - One pattern per line; lines starting with `#` are comments.
//! - A leading `!` negates the pattern. Patterns apply in order, so a later
//!   pattern overrides an earlier one for the same path.
//! - `*` and `?` match within one path segment, `[...]` is a character class
//!   (`[!...]` or `[^...]` negated), and a `**` segment matches any number of
//!   segments.
//! - Relative patterns are anchored at the base directory.
//! - A pattern that matches a directory matches every file beneath it.
//!
//! Each pattern is walked from its search root, the longest leading run of
//! literal segments. Directory entries are visited sorted by file name, so
//! the order files are yielded in is the same on every platform. Only regular
//! files are yielded, each at most once.

use std::collections::{HashSet, VecDeque};
use std::path::{Component, Path, PathBuf};

/// Errors in the pattern list itself.
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("invalid pattern {pattern:?}: {reason}")]
    Invalid { pattern: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `**`
    AnyDepth,
    /// A single segment, possibly with wildcards.
    Glob(Vec<char>),
}

#[derive(Debug, Clone)]
struct Pattern {
    negate: bool,
    directories_only: bool,
    root: PathBuf,
    /// Segments below `root`.
    segments: Vec<Segment>,
}

impl Pattern {
    fn parse(line: &str, base_dir: &Path) -> Result<Option<Self>, PatternError> {
        let mut text = line.trim();
        if text.is_empty() || text.starts_with('#') {
            return Ok(None);
        }

        let mut negate = false;
        while let Some(rest) = text.strip_prefix('!') {
            negate = !negate;
            text = rest.trim_start();
        }
        if text.is_empty() {
            return Err(PatternError::Invalid {
                pattern: line.to_string(),
                reason: "negation without a pattern".into(),
            });
        }

        let directories_only = text.ends_with('/') || text.ends_with(std::path::MAIN_SEPARATOR);
        let full = base_dir.join(text);

        let mut root = PathBuf::new();
        let mut segments = Vec::new();
        for component in full.components() {
            match component {
                Component::Prefix(_) | Component::RootDir if segments.is_empty() => {
                    root.push(component.as_os_str());
                }
                Component::CurDir => {}
                Component::ParentDir if segments.is_empty() => {
                    root.pop();
                }
                Component::ParentDir => {
                    return Err(PatternError::Invalid {
                        pattern: line.to_string(),
                        reason: "`..` after a wildcard".into(),
                    });
                }
                Component::Normal(os) => {
                    let seg = os.to_string_lossy();
                    if segments.is_empty() && !has_wildcard(&seg) {
                        root.push(os);
                    } else if seg == "**" {
                        segments.push(Segment::AnyDepth);
                    } else {
                        segments.push(Segment::Glob(seg.chars().collect()));
                    }
                }
                Component::Prefix(_) | Component::RootDir => {}
            }
        }

        Ok(Some(Self {
            negate,
            directories_only,
            root,
            segments,
        }))
    }

    /// Whether `path` (a file) is matched directly or through an ancestor
    /// directory.
    fn matches_file(&self, path: &Path) -> bool {
        let Ok(rel) = path.strip_prefix(&self.root) else {
            return false;
        };
        let names: Vec<String> = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();

        // Prefixes of length < len are ancestor directories; len is the file.
        let upper = if self.directories_only {
            names.len()
        } else {
            names.len() + 1
        };
        (0..upper).any(|n| match_segments(&self.segments, &names[..n]))
    }
}

fn has_wildcard(segment: &str) -> bool {
    segment.contains(['*', '?', '['])
}

fn match_segments(pattern: &[Segment], names: &[String]) -> bool {
    match pattern.split_first() {
        None => names.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=names.len()).any(|skip| match_segments(rest, &names[skip..]))
        }
        Some((Segment::Glob(glob), rest)) => match names.split_first() {
            Some((name, tail)) => {
                let name: Vec<char> = name.chars().collect();
                match_glob(glob, &name) && match_segments(rest, tail)
            }
            None => false,
        },
    }
}

/// Match one path segment against a glob.
fn match_glob(glob: &[char], name: &[char]) -> bool {
    match glob.split_first() {
        None => name.is_empty(),
        Some(('*', rest)) => (0..=name.len()).any(|skip| match_glob(rest, &name[skip..])),
        Some(('?', rest)) => !name.is_empty() && match_glob(rest, &name[1..]),
        Some(('[', rest)) => match (parse_class(rest), name.split_first()) {
            (Some((class, after)), Some((c, tail))) => {
                class.matches(*c) && match_glob(after, tail)
            }
            // Unclosed `[` is a literal.
            (None, Some(('[', tail))) => match_glob(rest, tail),
            _ => false,
        },
        Some((lit, rest)) => {
            name.first() == Some(lit) && match_glob(rest, &name[1..])
        }
    }
}

struct CharClass {
    negated: bool,
    ranges: Vec<(char, char)>,
}

impl CharClass {
    fn matches(&self, c: char) -> bool {
        self.ranges.iter().any(|&(lo, hi)| lo <= c && c <= hi) != self.negated
    }
}

/// Parse the body of `[...]` (after the `[`). Returns the class and the
/// glob remaining after the closing `]`.
fn parse_class(glob: &[char]) -> Option<(CharClass, &[char])> {
    let mut i = 0;
    let negated = matches!(glob.first(), Some('!') | Some('^'));
    if negated {
        i += 1;
    }
    let mut ranges = Vec::new();
    let start = i;
    while i < glob.len() {
        let c = glob[i];
        if c == ']' && i > start {
            return Some((CharClass { negated, ranges }, &glob[i + 1..]));
        }
        if glob.get(i + 1) == Some(&'-') && glob.get(i + 2).is_some_and(|&h| h != ']') {
            ranges.push((c, glob[i + 2]));
            i += 3;
        } else {
            ranges.push((c, c));
            i += 1;
        }
    }
    None
}

/// Compiled pattern list.
#[derive(Debug, Clone)]
pub struct FileMatcher {
    patterns: Vec<Pattern>,
}

impl FileMatcher {
    /// Parse `lines`, anchoring relative patterns at `base_dir`.
    pub fn new<S: AsRef<str>>(lines: &[S], base_dir: &Path) -> Result<Self, PatternError> {
        let mut patterns = Vec::new();
        for line in lines {
            for l in line.as_ref().lines() {
                if let Some(p) = Pattern::parse(l, base_dir)? {
                    patterns.push(p);
                }
            }
        }
        Ok(Self { patterns })
    }

    /// Whether `path` is selected by the pattern list.
    pub fn is_match(&self, path: &Path) -> bool {
        let mut included = false;
        for p in &self.patterns {
            if p.negate {
                if included && p.matches_file(path) {
                    included = false;
                }
            } else if !included && p.matches_file(path) {
                included = true;
            }
        }
        included
    }

    /// Search roots of the positive patterns, minus any nested in another.
    fn roots(&self) -> Vec<PathBuf> {
        let mut roots: Vec<PathBuf> = Vec::new();
        for p in self.patterns.iter().filter(|p| !p.negate) {
            if roots.iter().any(|r| p.root.starts_with(r)) {
                continue;
            }
            roots.retain(|r| !r.starts_with(&p.root));
            roots.push(p.root.clone());
        }
        roots
    }

    /// Lazily enumerate matching files.
    pub fn files(&self) -> Files<'_> {
        Files {
            matcher: self,
            roots: self.roots().into(),
            walk: None,
            seen: HashSet::new(),
        }
    }
}

/// Lazy iterator over matching files.
pub struct Files<'a> {
    matcher: &'a FileMatcher,
    roots: VecDeque<PathBuf>,
    walk: Option<walkdir::IntoIter>,
    seen: HashSet<PathBuf>,
}

impl Iterator for Files<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let Some(walk) = self.walk.as_mut() else {
                let root = self.roots.pop_front()?;
                if !root.exists() {
                    tracing::debug!(root = %root.display(), "search root does not exist");
                    continue;
                }
                self.walk = Some(
                    walkdir::WalkDir::new(root)
                        .follow_links(true)
                        .sort_by_file_name()
                        .into_iter(),
                );
                continue;
            };

            match walk.next() {
                None => self.walk = None,
                Some(Err(e)) => {
                    tracing::warn!("skipping unreadable path: {e}");
                }
                Some(Ok(entry)) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    let path = entry.into_path();
                    if self.matcher.is_match(&path) && self.seen.insert(path.clone()) {
                        return Some(path);
                    }
                }
            }
        }
    }
}
