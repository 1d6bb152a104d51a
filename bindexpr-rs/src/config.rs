//! Evaluation context loading for the command-line tool.
//!
//! A context file is a JSON object; each top-level key becomes a name.
//! `-v name=value` bindings are layered on top: `value` is read as JSON when
//! it parses as JSON and as plain text otherwise, so `-v n=3` binds a number
//! and `-v who=Ada` binds a string.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::CliArgs;
use crate::context::Context;
use crate::expr::value::Value;

/// A fatal error while assembling the evaluation context.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("{}: context file must hold a JSON object", .path.display())]
    NotAnObject { path: PathBuf },

    #[error("invalid binding {0:?}: expected <name>=<value>")]
    Binding(String),
}

/// Turn a JSON document into a context. Only objects qualify.
pub fn context_from_json(json: serde_json::Value) -> Option<Context> {
    match json {
        serde_json::Value::Object(map) => Some(
            map.into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        ),
        _ => None,
    }
}

/// Read and parse a context file from disk.
pub fn load_context_file(path: &Path) -> Result<Context, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_owned(),
        source,
    })?;
    let json: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| ConfigError::Json {
            path: path.to_owned(),
            source,
        })?;
    let ctx = context_from_json(json).ok_or_else(|| ConfigError::NotAnObject {
        path: path.to_owned(),
    })?;
    debug!(path = %path.display(), names = ctx.len(), "loaded context file");
    Ok(ctx)
}

/// Split `name=value` into a name and its value.
pub fn parse_binding(binding: &str) -> Result<(String, Value), ConfigError> {
    let Some((name, raw)) = binding.split_once('=') else {
        return Err(ConfigError::Binding(binding.to_owned()));
    };
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::Binding(binding.to_owned()));
    }
    let value = serde_json::from_str::<serde_json::Value>(raw)
        .map(Value::from)
        .unwrap_or_else(|_| Value::Str(raw.to_owned()));
    Ok((name.to_owned(), value))
}

/// Build the context described by the command line: the context file (if
/// any) overlaid with every `-v` binding in order.
pub fn build_context(args: &CliArgs) -> Result<Context, ConfigError> {
    let mut ctx = match args.context.resolve() {
        Some(path) => load_context_file(&path)?,
        None => Context::new(),
    };
    for binding in &args.bindings {
        let (name, value) = parse_binding(binding)?;
        ctx.set(name, value);
    }
    Ok(ctx)
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::ContextFile;
    use crate::context::Scope;
    use std::io::Write;

    #[test]
    fn json_object_becomes_context() {
        let ctx = context_from_json(serde_json::json!({"a": 1, "b": {"c": "x"}})).unwrap();
        assert_eq!(ctx.lookup("a"), Some(Value::from(1)));
        assert_eq!(
            ctx.lookup("b").map(|b| b.get_member("c")),
            Some(Value::from("x"))
        );
    }

    #[test]
    fn json_non_object_rejected() {
        assert!(context_from_json(serde_json::json!([1, 2])).is_none());
    }

    #[test]
    fn bindings_parse_json_or_text() {
        assert_eq!(parse_binding("n=3").unwrap(), ("n".into(), Value::from(3)));
        assert_eq!(parse_binding("ok=true").unwrap(), ("ok".into(), Value::Bool(true)));
        assert_eq!(parse_binding("who=Ada").unwrap(), ("who".into(), Value::from("Ada")));
        assert_eq!(
            parse_binding("q=\"a=b\"").unwrap(),
            ("q".into(), Value::from("a=b"))
        );
        assert_eq!(parse_binding("e=").unwrap(), ("e".into(), Value::from("")));
    }

    #[test]
    fn bad_bindings() {
        assert!(matches!(parse_binding("novalue"), Err(ConfigError::Binding(_))));
        assert!(matches!(parse_binding("=1"), Err(ConfigError::Binding(_))));
    }

    #[test]
    fn load_file_and_overlay_bindings() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"x": 1, "name": "file"}}"#).unwrap();

        let args = CliArgs {
            context: ContextFile::Explicit(file.path().to_owned()),
            bindings: vec!["name=cli".into(), "y=2".into()],
            ..CliArgs::default()
        };
        let ctx = build_context(&args).unwrap();
        assert_eq!(ctx.lookup("x"), Some(Value::from(1)));
        assert_eq!(ctx.lookup("y"), Some(Value::from(2)));
        assert_eq!(ctx.lookup("name"), Some(Value::from("cli")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_context_file(Path::new("/nonexistent/ctx.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().starts_with("cannot read /nonexistent/ctx.json"));
    }

    #[test]
    fn malformed_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{not json").unwrap();
        assert!(matches!(
            load_context_file(file.path()),
            Err(ConfigError::Json { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1]").unwrap();
        assert!(matches!(
            load_context_file(file.path()),
            Err(ConfigError::NotAnObject { .. })
        ));
    }
}
