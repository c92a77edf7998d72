use std::fs;
use std::path::Path;

use log::debug;
#[cfg(test)]
use serde::{Deserialize, Serialize};
use snafu::{ensure, ResultExt};

use crate::error::{CompileResult, MissingFileSnafu, ReadFileSnafu};

#[cfg_attr(test, derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub lexeme: String,
    pub line: usize,
}

impl Token {
    pub fn new(lexeme: impl Into<String>, line: usize) -> Self {
        Self {
            lexeme: lexeme.into(),
            line,
        }
    }

    pub fn is(&self, s: &str) -> bool {
        self.lexeme == s
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tokenizer {
    pub source: Vec<char>,
    pub index: usize,
    pub line: usize,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            index: 0,
            line: 1,
        }
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = vec![];
        while let Some(c) = self.peek() {
            match c {
                '"' => match self.string() {
                    Some(token) => tokens.push(token),
                    // unterminated quote, drop it like any other stray character
                    None => self.advance(),
                },
                '(' | ')' | '=' => {
                    tokens.push(Token::new(c, self.line));
                    self.advance();
                }
                '\n' => self.newline(),
                // a lone \r ends a line too; \r\n is counted at the \n
                '\r' if self.peek_next() != Some('\n') => self.newline(),
                c if is_word(c) => tokens.push(self.word()),
                _ => self.advance(),
            }
        }
        tokens
    }

    fn word(&mut self) -> Token {
        let start = self.index;
        while let Some(c) = self.peek() {
            if is_word(c) {
                self.advance();
            } else {
                break;
            }
        }
        Token::new(self.slice(start, self.index), self.line)
    }

    // "..." closed on the same line, quotes included in the lexeme
    fn string(&mut self) -> Option<Token> {
        let start = self.index;
        let mut end = start + 1;
        loop {
            match self.source.get(end) {
                Some('"') => break,
                Some('\n' | '\r') | None => return None,
                Some(_) => end += 1,
            }
        }
        self.index = end + 1;
        Some(Token::new(self.slice(start, self.index), self.line))
    }

    fn slice(&self, start: usize, end: usize) -> String {
        self.source[start..end].iter().collect()
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.index).copied()
    }

    fn peek_next(&self) -> Option<char> {
        self.source.get(self.index + 1).copied()
    }

    fn newline(&mut self) {
        self.advance();
        self.line += 1;
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn tokenize(source: &str) -> Vec<Token> {
    Tokenizer::new(source).tokenize()
}

/// Reads a whole source file and tokenizes it.
pub fn tokenize_file(path: &Path) -> CompileResult<Vec<Token>> {
    ensure!(path.exists(), MissingFileSnafu { path });
    let source = fs::read_to_string(path).context(ReadFileSnafu { path })?;
    let tokens = tokenize(&source);
    debug!("{}: {} tokens", path.display(), tokens.len());
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_yaml_snapshot;

    fn lexemes(source: &str) -> Vec<String> {
        tokenize(source).into_iter().map(|t| t.lexeme).collect()
    }

    #[test]
    fn nothing() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("\n\n  \n").is_empty());
    }

    #[test]
    fn declaration() {
        let mut tokenizer = Tokenizer::new("x = 5");
        assert_yaml_snapshot!(tokenizer.tokenize());
    }

    #[test]
    fn print_string() {
        let mut tokenizer = Tokenizer::new("print(\"hi\")");
        assert_yaml_snapshot!(tokenizer.tokenize());
    }

    #[test]
    fn lines_are_counted() {
        let mut tokenizer = Tokenizer::new("x = 5\n\nprint(x)\n");
        assert_yaml_snapshot!(tokenizer.tokenize());
    }

    #[test]
    fn string_keeps_any_char() {
        assert_eq!(
            lexemes("print(\"a, b; (c) = d!\")"),
            ["print", "(", "\"a, b; (c) = d!\"", ")"]
        );
    }

    #[test]
    fn empty_string() {
        assert_eq!(lexemes("print(\"\")"), ["print", "(", "\"\"", ")"]);
    }

    #[test]
    fn other_punctuation_is_dropped() {
        assert_eq!(
            lexemes("x = 5; y = 6, print(x + y)."),
            ["x", "=", "5", "y", "=", "6", "print", "(", "x", "y", ")"]
        );
    }

    #[test]
    fn words_include_digits_and_underscores() {
        assert_eq!(lexemes("my_var2 = 042"), ["my_var2", "=", "042"]);
        assert_eq!(lexemes("héllo"), ["héllo"]);
    }

    #[test]
    fn unterminated_quote_is_dropped() {
        let tokens = tokenize("print(\"oops)\nx = 1");
        let got: Vec<(&str, usize)> = tokens.iter().map(|t| (t.lexeme.as_str(), t.line)).collect();
        assert_eq!(
            got,
            [
                ("print", 1),
                ("(", 1),
                ("oops", 1),
                (")", 1),
                ("x", 2),
                ("=", 2),
                ("1", 2)
            ]
        );
    }

    #[test]
    fn quotes_do_not_span_lines() {
        let tokens = tokenize("\"a\nb\"");
        assert_eq!(tokens, [Token::new("a", 1), Token::new("b", 2)]);
    }

    #[test]
    fn crlf_line_endings() {
        let tokens = tokenize("x = 1\r\nprint(x)\r\n");
        assert_eq!(tokens.last(), Some(&Token::new(")", 2)));
        assert_eq!(tokens.len(), 7);
    }

    #[test]
    fn carriage_return_ends_a_line() {
        let tokens = tokenize("x = 1\rprint(y)\r\rz");
        assert_eq!(tokens[3], Token::new("print", 2));
        assert_eq!(tokens.last(), Some(&Token::new("z", 4)));
        // a string cannot run past a lone \r either
        assert_eq!(tokenize("\"a\rb\""), [Token::new("a", 1), Token::new("b", 2)]);
    }

    #[test]
    fn missing_file() {
        let err = tokenize_file(Path::new("definitely/not/here.pulang")).unwrap_err();
        assert!(matches!(err, crate::CompileError::MissingFile { .. }));
    }
}
