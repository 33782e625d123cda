//! Flavorfile parser
//!
//! A flavorfile declares dependencies one per line:
//!
//! ```text
//! # comment
//! flavor 'kana/vim-smartinput'
//! flavor 'kana/vim-textobj-user', '~> 0.3'
//! flavor 'thinca/vim-themis', '>= 1.5', :group => :development
//! flavor 'file:///src/my-plugin', name: 'my-plugin'
//! group :development do
//!   flavor 'kana/vim-vspec', '~> 1.5'
//! end
//! ```
//!
//! Options may be written `:key => value` or `key: value`. Recognised keys
//! are `group`/`groups` (a symbol, a string or a list of them) and `name`.
//! A `group` option on a line inside a `group ... do` block overrides the
//! block's groups.

use std::path::Path;

use flavor_fs::NormalizedPath;

use crate::spec::{DependencySpec, SpecSet};
use crate::version::VersionConstraint;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Str(String),
    Symbol(String),
    Word(String),
    /// `key:` in new-style hash syntax
    Key(String),
    Arrow,
    Comma,
    LBracket,
    RBracket,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Str(String),
    Symbol(String),
    List(Vec<Value>),
}

impl Value {
    fn describe(&self) -> &'static str {
        match self {
            Self::Str(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::List(_) => "list",
        }
    }
}

enum Arg {
    Positional(Value),
    Option(String, Value),
}

/// Parse flavorfile text into declared dependencies.
pub fn parse(text: &str) -> Result<SpecSet> {
    let mut specs = SpecSet::new();
    // Groups of the open `group ... do` block and the line it started on
    let mut block: Option<(Vec<String>, usize)> = None;

    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let fail = |message: String| Error::FlavorfileParse {
            line: line_no,
            message,
        };

        let tokens = tokenize(line).map_err(fail)?;
        let Some((head, rest)) = tokens.split_first() else {
            continue;
        };

        match head {
            Token::Word(word) if word == "flavor" => {
                let block_groups = block.as_ref().map(|(groups, _)| groups.as_slice());
                let spec = parse_flavor(rest, block_groups).map_err(fail)?;
                tracing::debug!(name = %spec.name, location = %spec.location, "Declared flavor");
                specs.insert(spec);
            }
            Token::Word(word) if word == "group" => {
                if let Some((_, opened)) = &block {
                    return Err(fail(format!(
                        "group blocks cannot nest (block opened on line {opened})"
                    )));
                }
                let groups = parse_group_header(rest).map_err(fail)?;
                block = Some((groups, line_no));
            }
            Token::Word(word) if word == "end" => {
                if !rest.is_empty() {
                    return Err(fail("unexpected text after 'end'".to_string()));
                }
                if block.take().is_none() {
                    return Err(fail("'end' without an open group block".to_string()));
                }
            }
            other => {
                return Err(fail(format!("unexpected {}", describe_token(other))));
            }
        }
    }

    if let Some((_, opened)) = block {
        return Err(Error::FlavorfileParse {
            line: opened,
            message: "group block is never closed with 'end'".to_string(),
        });
    }

    Ok(specs)
}

/// Read and parse the flavorfile at `path`; `None` when it does not exist.
pub fn load_if_exists(path: &Path) -> Result<Option<SpecSet>> {
    match flavor_fs::io::read_text_if_exists(&NormalizedPath::new(path))? {
        Some(text) => parse(&text).map(Some),
        None => Ok(None),
    }
}

fn parse_flavor(
    tokens: &[Token],
    block_groups: Option<&[String]>,
) -> std::result::Result<DependencySpec, String> {
    let mut positional = Vec::new();
    let mut name = None;
    let mut groups = None;

    for arg in parse_args(tokens)? {
        match arg {
            Arg::Positional(value) => positional.push(value),
            Arg::Option(key, value) => match key.as_str() {
                "name" => match value {
                    Value::Str(s) | Value::Symbol(s) => name = Some(s),
                    other => return Err(format!("name must be a string, not a {}", other.describe())),
                },
                "group" | "groups" => groups = Some(group_names(value)?),
                other => return Err(format!("unknown option '{other}'")),
            },
        }
    }

    let mut positional = positional.into_iter();
    let declared = match positional.next() {
        Some(Value::Str(s)) if !s.trim().is_empty() => s,
        Some(other) => {
            return Err(format!(
                "expected a repository string, found a {}",
                other.describe()
            ));
        }
        None => return Err("flavor needs a repository".to_string()),
    };
    let constraint = match positional.next() {
        Some(Value::Str(s)) => VersionConstraint::parse(&s).map_err(|e| e.to_string())?,
        Some(other) => {
            return Err(format!(
                "expected a version constraint string, found a {}",
                other.describe()
            ));
        }
        None => VersionConstraint::any(),
    };
    if positional.next().is_some() {
        return Err("too many arguments to flavor".to_string());
    }

    let mut spec = DependencySpec::new(&declared).with_constraint(constraint);
    if let Some(name) = name {
        spec = spec.with_name(name);
    }
    if let Some(groups) = groups.or_else(|| block_groups.map(<[String]>::to_vec)) {
        spec = spec.with_groups(groups);
    }
    Ok(spec)
}

fn parse_group_header(tokens: &[Token]) -> std::result::Result<Vec<String>, String> {
    let Some((Token::Word(last), names)) = tokens.split_last() else {
        return Err("group header must end with 'do'".to_string());
    };
    if last != "do" {
        return Err("group header must end with 'do'".to_string());
    }

    let mut groups = Vec::new();
    for arg in parse_args(names)? {
        match arg {
            Arg::Positional(value) => groups.extend(group_names(value)?),
            Arg::Option(key, _) => return Err(format!("unexpected option '{key}' in group header")),
        }
    }
    if groups.is_empty() {
        return Err("group needs at least one name".to_string());
    }
    Ok(groups)
}

fn group_names(value: Value) -> std::result::Result<Vec<String>, String> {
    match value {
        Value::Str(s) | Value::Symbol(s) => Ok(vec![s]),
        Value::List(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Str(s) | Value::Symbol(s) => Ok(s),
                Value::List(_) => Err("group lists cannot nest".to_string()),
            })
            .collect(),
    }
}

/// Split a comma-separated argument list into positional values and options.
fn parse_args(tokens: &[Token]) -> std::result::Result<Vec<Arg>, String> {
    let mut args = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        let arg = match (&tokens[pos], tokens.get(pos + 1)) {
            (Token::Key(key), _) => {
                let (value, next) = parse_value(tokens, pos + 1)?;
                pos = next;
                Arg::Option(key.clone(), value)
            }
            (Token::Symbol(key) | Token::Str(key), Some(Token::Arrow)) => {
                let (value, next) = parse_value(tokens, pos + 2)?;
                pos = next;
                Arg::Option(key.clone(), value)
            }
            _ => {
                let (value, next) = parse_value(tokens, pos)?;
                pos = next;
                Arg::Positional(value)
            }
        };
        args.push(arg);

        match tokens.get(pos) {
            None => {}
            Some(Token::Comma) if pos + 1 < tokens.len() => pos += 1,
            Some(Token::Comma) => return Err("trailing comma".to_string()),
            Some(other) => return Err(format!("expected ',' before {}", describe_token(other))),
        }
    }

    Ok(args)
}

fn parse_value(tokens: &[Token], pos: usize) -> std::result::Result<(Value, usize), String> {
    match tokens.get(pos) {
        Some(Token::Str(s)) => Ok((Value::Str(s.clone()), pos + 1)),
        Some(Token::Symbol(s)) => Ok((Value::Symbol(s.clone()), pos + 1)),
        Some(Token::LBracket) => {
            let mut items = Vec::new();
            let mut pos = pos + 1;
            loop {
                if let Some(Token::RBracket) = tokens.get(pos) {
                    return Ok((Value::List(items), pos + 1));
                }
                let (item, next) = parse_value(tokens, pos)?;
                items.push(item);
                pos = next;
                match tokens.get(pos) {
                    Some(Token::Comma) => pos += 1,
                    Some(Token::RBracket) => {}
                    _ => return Err("unterminated list".to_string()),
                }
            }
        }
        Some(other) => Err(format!("expected a value, found {}", describe_token(other))),
        None => Err("expected a value at end of line".to_string()),
    }
}

fn tokenize(line: &str) -> std::result::Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '#' => break,
            '\'' | '"' => {
                chars.next();
                let mut text = String::new();
                let mut closed = false;
                while let Some(ch) = chars.next() {
                    match ch {
                        '\\' => match chars.next() {
                            Some(escaped) => text.push(escaped),
                            None => break,
                        },
                        ch if ch == c => {
                            closed = true;
                            break;
                        }
                        ch => text.push(ch),
                    }
                }
                if !closed {
                    return Err("unterminated string".to_string());
                }
                tokens.push(Token::Str(text));
            }
            ':' => {
                chars.next();
                let ident = take_ident(&mut chars);
                if ident.is_empty() {
                    return Err("expected a symbol name after ':'".to_string());
                }
                tokens.push(Token::Symbol(ident));
            }
            '=' => {
                chars.next();
                if chars.next() != Some('>') {
                    return Err("expected '=>'".to_string());
                }
                tokens.push(Token::Arrow);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '[' => {
                chars.next();
                tokens.push(Token::LBracket);
            }
            ']' => {
                chars.next();
                tokens.push(Token::RBracket);
            }
            c if is_ident_char(c) => {
                let ident = take_ident(&mut chars);
                if chars.peek() == Some(&':') {
                    chars.next();
                    tokens.push(Token::Key(ident));
                } else {
                    tokens.push(Token::Word(ident));
                }
            }
            other => return Err(format!("unexpected character '{other}'")),
        }
    }

    Ok(tokens)
}

fn take_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    ident
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn describe_token(token: &Token) -> String {
    match token {
        Token::Str(s) => format!("string '{s}'"),
        Token::Symbol(s) => format!("symbol ':{s}'"),
        Token::Word(w) => format!("'{w}'"),
        Token::Key(k) => format!("'{k}:'"),
        Token::Arrow => "'=>'".to_string(),
        Token::Comma => "','".to_string(),
        Token::LBracket => "'['".to_string(),
        Token::RBracket => "']'".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeSet;

    fn groups(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn parse_err_line(text: &str) -> usize {
        match parse(text) {
            Err(Error::FlavorfileParse { line, .. }) => line,
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_minimal_declaration() {
        let specs = parse("flavor 'kana/vim-smartinput'\n").unwrap();
        let spec = specs.iter().next().unwrap();

        assert_eq!(spec.name, "kana/vim-smartinput");
        assert_eq!(spec.location, "https://github.com/kana/vim-smartinput.git");
        assert_eq!(spec.groups, groups(&["default"]));
        assert_eq!(spec.constraint.to_string(), ">= 0");
    }

    #[test]
    fn test_full_example() {
        let text = r#"
# comment
flavor 'kana/vim-smartinput'
flavor "kana/vim-textobj-user", '~> 0.3'
flavor 'thinca/vim-themis', '>= 1.5', :group => :development
flavor 'file:///src/my-plugin', name: 'my-plugin'
group :development do
  flavor 'kana/vim-vspec', '~> 1.5'  # trailing comment
end
"#;
        let specs = parse(text).unwrap();
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "kana/vim-smartinput",
                "kana/vim-textobj-user",
                "thinca/vim-themis",
                "my-plugin",
                "kana/vim-vspec",
            ]
        );

        let themis = specs.get("https://github.com/thinca/vim-themis.git").unwrap();
        assert_eq!(themis.groups, groups(&["development"]));
        assert_eq!(themis.constraint.to_string(), ">= 1.5");

        let local = specs.get("file:///src/my-plugin").unwrap();
        assert_eq!(local.groups, groups(&["default"]));

        let vspec = specs.get("https://github.com/kana/vim-vspec.git").unwrap();
        assert_eq!(vspec.groups, groups(&["development"]));
        assert_eq!(vspec.constraint.to_string(), "~> 1.5");
    }

    #[test]
    fn test_group_list_option() {
        let specs = parse("flavor 'a/b', groups: [:default, 'ci']\n").unwrap();
        assert_eq!(specs.iter().next().unwrap().groups, groups(&["ci", "default"]));
    }

    #[test]
    fn test_explicit_group_overrides_block() {
        let text = "group :development do\nflavor 'a/b', group: :ci\nend\n";
        let specs = parse(text).unwrap();
        assert_eq!(specs.iter().next().unwrap().groups, groups(&["ci"]));
    }

    #[test]
    fn test_redeclaration_replaces_in_place() {
        let text = "flavor 'a/one'\nflavor 'b/two'\nflavor 'a/one', '~> 2.0'\n";
        let specs = parse(text).unwrap();

        let declared: Vec<(&str, String)> = specs
            .iter()
            .map(|s| (s.name.as_str(), s.constraint.to_string()))
            .collect();
        assert_eq!(
            declared,
            vec![("a/one", "~> 2.0".to_string()), ("b/two", ">= 0".to_string())]
        );
    }

    #[test]
    fn test_empty_file() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("\n# only a comment\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_errors_report_line_numbers() {
        assert_eq!(parse_err_line("flavor 'a/b'\nflavor\n"), 2);
        assert_eq!(parse_err_line("flavor 'a/b', 'not a version'\n"), 1);
        assert_eq!(parse_err_line("\n\nflavor 'a/b\n"), 3);
        assert_eq!(parse_err_line("flavor 'a/b', colour: 'red'\n"), 1);
        assert_eq!(parse_err_line("plugin 'a/b'\n"), 1);
    }

    #[test]
    fn test_block_errors() {
        assert_eq!(parse_err_line("end\n"), 1);
        assert_eq!(parse_err_line("flavor 'a/b'\ngroup :dev do\nflavor 'c/d'\n"), 2);
        assert_eq!(
            parse_err_line("group :dev do\ngroup :ci do\nend\nend\n"),
            2
        );
        assert_eq!(parse_err_line("group :dev\n"), 1);
    }

    #[test]
    fn test_load_if_exists_missing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_if_exists(&dir.path().join("VimFlavor")).unwrap().is_none());
    }

    #[test]
    fn test_load_if_exists_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("VimFlavor");
        std::fs::write(&path, "flavor 'a/b', '== 1.0'\n").unwrap();

        let specs = load_if_exists(&path).unwrap().unwrap();
        assert_eq!(specs.len(), 1);
    }
}
