use log::warn;
use snafu::{ensure, OptionExt};

use crate::codegen::{Codegen, Instruction, Program};
use crate::error::{
    CompileResult, Diagnostic, MissingCloseParenSnafu, MissingOpenParenSnafu, NoTokensSnafu,
};
use crate::symbols::SymbolTable;
use crate::Token;

/// Everything one compilation produces.
#[derive(Debug)]
pub struct Compilation {
    pub program: Program,
    pub diagnostics: Vec<Diagnostic>,
    pub symbols: SymbolTable,
}

/// Walks the token array once, front to back, and routes each statement to
/// the code generator.
#[derive(Debug, Default)]
pub struct Parser {
    pub tokens: Vec<Token>,
    pub index: usize,
    pub codegen: Codegen,
    pub program: Vec<Instruction>,
    pub diagnostics: Vec<Diagnostic>,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            ..Default::default()
        }
    }

    // program = stmt*
    // stmt    = "print" "(" arg? ")"
    //         | ident "=" value
    pub fn parse(mut self) -> CompileResult<Compilation> {
        while let Some(tok) = self.peek() {
            let line = tok.line;
            if tok.is("print") {
                let args = self.arguments(1)?;
                if let Some(arg) = args.first() {
                    let instrs = self.codegen.print(arg, line)?;
                    self.program.extend(instrs);
                }
            } else if self.remaining() >= 3 && self.nth(1).is_some_and(|t| t.is("=")) {
                let name = self.next_lexeme();
                self.advance();
                let value = self.next_lexeme();
                let instrs = self.codegen.declare(&name, &value, line)?;
                self.program.extend(instrs);
            } else {
                let diagnostic = Diagnostic::UnrecognizedToken {
                    lexeme: tok.lexeme.clone(),
                    line,
                };
                warn!("{}", diagnostic);
                self.diagnostics.push(diagnostic);
                self.advance();
            }
        }

        self.program.push(Instruction::Hlt);
        Ok(Compilation {
            program: Program {
                instructions: self.program,
            },
            diagnostics: self.diagnostics,
            symbols: self.codegen.symbols,
        })
    }

    // call = name "(" arg{0,n} ")"
    // Stops collecting after n arguments; anything left before ")" is an error.
    pub fn arguments(&mut self, n: usize) -> CompileResult<Vec<String>> {
        let name = self.peek().context(NoTokensSnafu)?;
        let function = name.lexeme.clone();
        let line = name.line;

        ensure!(
            self.nth(1).is_some_and(|t| t.is("(")),
            MissingOpenParenSnafu {
                function: function.as_str(),
                line
            }
        );
        self.advance();
        self.advance();

        let mut args = vec![];
        while let Some(tok) = self.peek() {
            if tok.is(")") {
                break;
            }
            args.push(tok.lexeme.clone());
            self.advance();
            if args.len() == n {
                break;
            }
        }

        ensure!(
            self.peek().is_some_and(|t| t.is(")")),
            MissingCloseParenSnafu { function, line }
        );
        self.advance();
        Ok(args)
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index)
    }

    fn nth(&self, n: usize) -> Option<&Token> {
        self.tokens.get(self.index + n)
    }

    fn remaining(&self) -> usize {
        self.tokens.len().saturating_sub(self.index)
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn next_lexeme(&mut self) -> String {
        let lexeme = self.peek().map(|t| t.lexeme.clone()).unwrap_or_default();
        self.advance();
        lexeme
    }
}
