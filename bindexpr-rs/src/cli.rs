//! Command-line argument parsing.
//!
//! Usage:
//!   bindexpr [-f[<file>]] [-v<name>=<value>]... [-td] [--] [<source>...]
//!
//! With no sources, one source per line is read from stdin. `-f` takes the
//! next argument as its file unless that argument starts with `-`; put `-f`
//! last (or use `-f<file>`) when sources follow.

use std::path::PathBuf;

/// Environment variable naming the default context file.
pub const CONTEXT_ENV: &str = "BINDEXPR_CONTEXT";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Where the evaluation context comes from.
    pub context: ContextFile,
    /// `name=value` bindings (`-v`), applied after the context file.
    pub bindings: Vec<String>,
    /// Treat sources as `${…}` templates (`-t`).
    pub template: bool,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Expressions or templates to evaluate.
    pub sources: Vec<String>,
}

/// How to choose the context file.
#[derive(Debug, Default, PartialEq, Eq)]
pub enum ContextFile {
    /// Use `$BINDEXPR_CONTEXT` if set (default).
    #[default]
    Search,
    /// `-f` with no file argument: no context file.
    Skip,
    /// `-f<file>`: load this specific file.
    Explicit(PathBuf),
}

impl ContextFile {
    /// The file to load, if any.
    pub fn resolve(&self) -> Option<PathBuf> {
        match self {
            ContextFile::Explicit(path) => Some(path.clone()),
            ContextFile::Skip => None,
            ContextFile::Search => std::env::var_os(CONTEXT_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Parse `std::env::args()` and return [`CliArgs`] or an error message.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse a slice of argument strings (exposed for testing).
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // `--` ends flag processing.
        if arg == "--" {
            args.sources.extend(argv[i + 1..].iter().cloned());
            break;
        }

        // Anything not shaped like `-<letter>…` is a source, so `-x + 1`
        // and `-(a)` can be passed without `--`.
        if !is_flag(arg) {
            args.sources.push(arg.to_owned());
            i += 1;
            continue;
        }

        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                't' => args.template = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.context = ContextFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else if i + 1 < argv.len() && !argv[i + 1].starts_with('-') {
                        i += 1;
                        args.context = ContextFile::Explicit(PathBuf::from(&argv[i]));
                    } else {
                        args.context = ContextFile::Skip;
                    }
                }

                // -v<name>=<value>
                'v' => {
                    let binding = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err("-v requires a <name>=<value> argument".to_owned());
                    };
                    args.bindings.push(binding);
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    Ok(args)
}

fn is_flag(arg: &str) -> bool {
    let mut chars = arg.chars();
    chars.next() == Some('-') && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|&s| s.to_owned()).collect()
    }

    #[test]
    fn empty_args() {
        let a = parse_argv(&argv(&[])).unwrap();
        assert!(a.sources.is_empty());
        assert_eq!(a.context, ContextFile::Search);
        assert!(!a.template && !a.debug);
    }

    #[test]
    fn sources_positional() {
        let a = parse_argv(&argv(&["1 + 2", "a.b"])).unwrap();
        assert_eq!(a.sources, vec!["1 + 2", "a.b"]);
    }

    #[test]
    fn negative_sources_are_not_flags() {
        let a = parse_argv(&argv(&["-1 + 2", "-(a)", "-"])).unwrap();
        assert_eq!(a.sources, vec!["-1 + 2", "-(a)", "-"]);
    }

    #[test]
    fn double_dash_ends_flags() {
        let a = parse_argv(&argv(&["-t", "--", "-x", "y"])).unwrap();
        assert!(a.template);
        assert_eq!(a.sources, vec!["-x", "y"]);
    }

    #[test]
    fn combined_bool_flags() {
        let a = parse_argv(&argv(&["-td"])).unwrap();
        assert!(a.template && a.debug);
    }

    #[test]
    fn context_skip() {
        let a = parse_argv(&argv(&["-f"])).unwrap();
        assert_eq!(a.context, ContextFile::Skip);
        assert_eq!(a.context.resolve(), None);
    }

    #[test]
    fn context_explicit_embedded() {
        let a = parse_argv(&argv(&["-fctx.json"])).unwrap();
        assert_eq!(a.context, ContextFile::Explicit(PathBuf::from("ctx.json")));
        assert_eq!(a.context.resolve(), Some(PathBuf::from("ctx.json")));
    }

    #[test]
    fn context_explicit_separate() {
        let a = parse_argv(&argv(&["-f", "ctx.json", "x"])).unwrap();
        assert_eq!(a.context, ContextFile::Explicit(PathBuf::from("ctx.json")));
        assert_eq!(a.sources, vec!["x"]);
    }

    #[test]
    fn bindings() {
        let a = parse_argv(&argv(&["-vx=1", "-v", "name=\"Ada\""])).unwrap();
        assert_eq!(a.bindings, vec!["x=1", "name=\"Ada\""]);
    }

    #[test]
    fn binding_requires_argument() {
        assert!(parse_argv(&argv(&["-v"])).is_err());
    }

    #[test]
    fn unknown_flag() {
        assert!(parse_argv(&argv(&["-z"])).is_err());
    }
}
