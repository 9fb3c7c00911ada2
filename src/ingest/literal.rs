//! Total parser for the list literals found in the `citations` and
//! `authors_parsed` columns, e.g. `['0704.0001', "hep-th/9901001"]` or
//! `[["Smith", "John", ""], ["Doe", "J.", ""]]`.
//!
//! Only quoted strings and (nested) lists are accepted. Anything else is a
//! [`LiteralError`]; nothing is ever evaluated.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Str(String),
    List(Vec<Literal>),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LiteralError {
    #[error("unexpected end of input")]
    UnexpectedEnd,

    #[error("unexpected character {found:?} at position {pos}")]
    UnexpectedChar { pos: usize, found: char },

    #[error("trailing input at position {pos}")]
    TrailingInput { pos: usize },

    #[error("expected a list of strings")]
    NotAStringList,

    #[error("lists nested deeper than {max} levels")]
    TooDeep { max: usize },
}

/// Deepest list nesting accepted; stored columns need at most two levels
pub const MAX_DEPTH: usize = 8;

struct Parser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.pos < self.chars.len() && self.chars[self.pos].is_whitespace() {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn value(&mut self) -> Result<Literal, LiteralError> {
        self.skip_whitespace();
        match self.peek() {
            Some('[') => self.list(),
            Some('\'') | Some('"') => self.string().map(Literal::Str),
            Some(found) => Err(LiteralError::UnexpectedChar { pos: self.pos, found }),
            None => Err(LiteralError::UnexpectedEnd),
        }
    }

    fn list(&mut self) -> Result<Literal, LiteralError> {
        if self.depth >= MAX_DEPTH {
            return Err(LiteralError::TooDeep { max: MAX_DEPTH });
        }
        self.depth += 1;
        let list = self.list_items();
        self.depth -= 1;
        list
    }

    fn list_items(&mut self) -> Result<Literal, LiteralError> {
        // Consume '['
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(']') => {
                    self.pos += 1;
                    return Ok(Literal::List(items));
                }
                None => return Err(LiteralError::UnexpectedEnd),
                _ => {}
            }

            items.push(self.value()?);

            self.skip_whitespace();
            match self.peek() {
                Some(',') => self.pos += 1,
                Some(']') => {}
                Some(found) => return Err(LiteralError::UnexpectedChar { pos: self.pos, found }),
                None => return Err(LiteralError::UnexpectedEnd),
            }
        }
    }

    fn string(&mut self) -> Result<String, LiteralError> {
        let quote = self.chars[self.pos];
        self.pos += 1;
        let mut out = String::new();

        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == quote {
                return Ok(out);
            }
            if c == '\\' {
                let escaped = self.peek().ok_or(LiteralError::UnexpectedEnd)?;
                self.pos += 1;
                match escaped {
                    'n' => out.push('\n'),
                    't' => out.push('\t'),
                    'r' => out.push('\r'),
                    other => out.push(other),
                }
            } else {
                out.push(c);
            }
        }

        Err(LiteralError::UnexpectedEnd)
    }
}

/// Parse a complete literal; the whole input must be consumed
pub fn parse_literal(text: &str) -> Result<Literal, LiteralError> {
    let mut parser = Parser::new(text);
    let value = parser.value()?;
    parser.skip_whitespace();
    if parser.pos < parser.chars.len() {
        return Err(LiteralError::TrailingInput { pos: parser.pos });
    }
    Ok(value)
}

/// Parse a flat list of strings. Blank input is an empty list.
pub fn parse_string_list(text: &str) -> Result<Vec<String>, LiteralError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    match parse_literal(text)? {
        Literal::List(items) => items
            .into_iter()
            .map(|item| match item {
                Literal::Str(s) => Ok(s),
                Literal::List(_) => Err(LiteralError::NotAStringList),
            })
            .collect(),
        Literal::Str(_) => Err(LiteralError::NotAStringList),
    }
}

/// Parse a list of string lists (the `authors_parsed` shape)
pub fn parse_nested_string_list(text: &str) -> Result<Vec<Vec<String>>, LiteralError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    match parse_literal(text)? {
        Literal::List(items) => items
            .into_iter()
            .map(|item| match item {
                Literal::List(parts) => parts
                    .into_iter()
                    .map(|part| match part {
                        Literal::Str(s) => Ok(s),
                        Literal::List(_) => Err(LiteralError::NotAStringList),
                    })
                    .collect(),
                Literal::Str(_) => Err(LiteralError::NotAStringList),
            })
            .collect(),
        Literal::Str(_) => Err(LiteralError::NotAStringList),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_quoted_list() {
        assert_eq!(
            parse_string_list("['0704.0001', 'hep-th/9901001']").unwrap(),
            vec!["0704.0001", "hep-th/9901001"]
        );
    }

    #[test]
    fn test_parse_json_style_list() {
        assert_eq!(
            parse_string_list(r#"["a", "b",]"#).unwrap(),
            vec!["a", "b"]
        );
    }

    #[test]
    fn test_parse_empty_inputs() {
        assert!(parse_string_list("").unwrap().is_empty());
        assert!(parse_string_list("   ").unwrap().is_empty());
        assert!(parse_string_list("[]").unwrap().is_empty());
    }

    #[test]
    fn test_parse_escapes() {
        assert_eq!(
            parse_string_list(r"['O\'Brien', 'tab\there']").unwrap(),
            vec!["O'Brien", "tab\there"]
        );
    }

    #[test]
    fn test_rejects_code() {
        assert!(parse_string_list("__import__('os').system('ls')").is_err());
        assert!(parse_string_list("[1, 2]").is_err());
        assert!(parse_string_list("['a'] + ['b']").is_err());
        assert_eq!(
            parse_string_list("'just a string'"),
            Err(LiteralError::NotAStringList)
        );
    }

    #[test]
    fn test_rejects_truncated() {
        assert_eq!(parse_string_list("['a', 'b'"), Err(LiteralError::UnexpectedEnd));
        assert_eq!(parse_string_list("['a"), Err(LiteralError::UnexpectedEnd));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let hostile = "[".repeat(200_000);
        assert_eq!(
            parse_string_list(&hostile),
            Err(LiteralError::TooDeep { max: MAX_DEPTH })
        );

        let nested = format!("{}'x'{}", "[".repeat(MAX_DEPTH), "]".repeat(MAX_DEPTH));
        assert!(parse_literal(&nested).is_ok());
        let deeper = format!("[{}]", nested);
        assert!(matches!(parse_literal(&deeper), Err(LiteralError::TooDeep { .. })));
    }

    #[test]
    fn test_parse_nested_list() {
        let parsed =
            parse_nested_string_list(r#"[["Smith", "John", ""], ['Doe', 'J.', 'Jr']]"#).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0], vec!["Smith", "John", ""]);
        assert_eq!(parsed[1], vec!["Doe", "J.", "Jr"]);
        assert!(parse_nested_string_list("['flat']").is_err());
    }
}
