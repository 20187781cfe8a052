//! User-path redaction passes.
//!
//! Windows and Linux home paths are not simple token substitutions: the
//! drive letter and username segments are rewritten to placeholders while
//! every path segment from the fourth onward is reassembled verbatim.
//! These passes run after the regex rules, on whitespace-stripped text.
//!
//! License: MIT OR Apache-2.0

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

/// Drive letter, a literal `Users` segment, then backslash-delimited
/// segments to the end of the span.
static WINDOWS_USER_PATH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z]:\\Users\\[^\\]+(?:\\[^\\]+)*").expect("windows user path pattern")
});

/// `/home/<user>` then slash-delimited segments to the end of the span.
static LINUX_HOME_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/home/[^/]+(?:/[^/]+)*").expect("linux home path pattern"));

/// Rewrites Windows-style user-home paths to `<d>:\Users\<u>\...`.
///
/// Segments 0-2 of each match (drive, the `Users` literal, the username)
/// are discarded in favor of the placeholders; segments from the fourth
/// onward are appended unchanged. Spans whose drive letter was already
/// rewritten to the `<d>` placeholder are left alone, which makes the
/// pass idempotent.
pub fn scrub_windows_user_paths(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    let mut hits = 0usize;

    for m in WINDOWS_USER_PATH.find_iter(text) {
        if text[..m.start()].ends_with('<') {
            continue;
        }
        out.push_str(&text[last..m.start()]);
        out.push_str(&rewrite_windows_span(m.as_str()));
        last = m.end();
        hits += 1;
    }
    out.push_str(&text[last..]);

    if hits > 0 {
        debug!("Rewrote {} Windows user path span(s)", hits);
    }
    out
}

fn rewrite_windows_span(span: &str) -> String {
    let mut replacement = String::from(r"<d>:\Users\<u>");
    for segment in span.split('\\').skip(3) {
        replacement.push('\\');
        replacement.push_str(segment);
    }
    replacement
}

/// Rewrites Linux-style home paths to `/home/<u>/...`, keeping every
/// slash-delimited segment from the fourth onward.
pub fn scrub_linux_home_paths(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0usize;
    let mut hits = 0usize;

    for m in LINUX_HOME_PATH.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        out.push_str(&rewrite_linux_span(m.as_str()));
        last = m.end();
        hits += 1;
    }
    out.push_str(&text[last..]);

    if hits > 0 {
        debug!("Rewrote {} Linux home path span(s)", hits);
    }
    out
}

fn rewrite_linux_span(span: &str) -> String {
    let mut replacement = String::from("/home/<u>");
    for segment in span.split('/').skip(3) {
        replacement.push('/');
        replacement.push_str(segment);
    }
    replacement
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_path_keeps_suffix_segments() {
        let input = r"C:\Users\alice\Documents\f.txt";
        assert_eq!(
            scrub_windows_user_paths(input),
            r"<d>:\Users\<u>\Documents\f.txt"
        );
    }

    #[test]
    fn windows_path_without_suffix() {
        assert_eq!(scrub_windows_user_paths(r"D:\Users\bob"), r"<d>:\Users\<u>");
    }

    #[test]
    fn windows_rewrite_is_idempotent() {
        let once = scrub_windows_user_paths(r"C:\Users\alice\Documents\f.txt");
        assert_eq!(scrub_windows_user_paths(&once), once);
    }

    #[test]
    fn linux_path_keeps_suffix_segments() {
        assert_eq!(
            scrub_linux_home_paths("/home/alice/docs/f.txt"),
            "/home/<u>/docs/f.txt"
        );
    }

    #[test]
    fn linux_path_without_suffix() {
        assert_eq!(scrub_linux_home_paths("/home/alice"), "/home/<u>");
    }

    #[test]
    fn linux_rewrite_is_idempotent() {
        let once = scrub_linux_home_paths("/home/alice/docs/f.txt");
        assert_eq!(scrub_linux_home_paths(&once), once);
    }

    #[test]
    fn non_user_paths_are_untouched() {
        assert_eq!(scrub_windows_user_paths(r"C:\Windows\System32"), r"C:\Windows\System32");
        assert_eq!(scrub_linux_home_paths("/var/log/syslog"), "/var/log/syslog");
    }
}
