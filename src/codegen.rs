use std::fmt;

use log::{debug, info};
use snafu::{ensure, OptionExt};

use crate::error::{
    AlreadyDeclaredSnafu, CompileResult, InvalidPrintArgumentSnafu, MemoryLimitSnafu,
    NonNumericSnafu,
};
use crate::symbols::{SymbolTable, DISPLAY_ADDRESS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register(u8);

impl Register {
    /// Hardwired to zero.
    pub const ZERO: Register = Register(0);
    pub const VALUE: Register = Register(14);
    pub const ADDRESS: Register = Register(15);
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// Character I/O ports, resolved to addresses by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    ClearCharsBuffer,
    WriteChar,
    BufferChars,
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Port::ClearCharsBuffer => "clear_chars_buffer",
            Port::WriteChar => "write_char",
            Port::BufferChars => "buffer_chars",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Decimal literal, kept exactly as written in the source.
    Literal(String),
    Address(u8),
    Char(char),
    Port(Port),
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(digits) => f.write_str(digits),
            Operand::Address(address) => write!(f, "{}", address),
            Operand::Char(c) => write!(f, "\"{}\"", c),
            Operand::Port(port) => write!(f, "{}", port),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    /// reg <- operand
    Ldi(Register, Operand),
    /// mem[addr] <- value
    Str { addr: Register, value: Register },
    /// dest <- mem[addr]
    Lod { addr: Register, dest: Register },
    Hlt,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Ldi(reg, operand) => write!(f, "LDI {} {}", reg, operand),
            Instruction::Str { addr, value } => write!(f, "STR {} {}", addr, value),
            Instruction::Lod { addr, dest } => write!(f, "LOD {} {}", addr, dest),
            Instruction::Hlt => f.write_str("HLT"),
        }
    }
}

/// A finished instruction sequence, in execution order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Program {
    pub instructions: Vec<Instruction>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, instr) in self.instructions.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", instr)?;
        }
        Ok(())
    }
}

fn ldi(reg: Register, operand: Operand) -> Instruction {
    Instruction::Ldi(reg, operand)
}

fn store(addr: Register, value: Register) -> Instruction {
    Instruction::Str { addr, value }
}

fn is_number(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit())
}

fn string_literal(s: &str) -> Option<&str> {
    if s.len() >= 2 {
        s.strip_prefix('"')?.strip_suffix('"')
    } else {
        None
    }
}

#[derive(Debug, Default)]
pub struct Codegen {
    pub symbols: SymbolTable,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print(&self, argument: &str, line: usize) -> CompileResult<Vec<Instruction>> {
        if let Some(text) = string_literal(argument) {
            return Ok(self.print_string(text));
        }
        if is_number(argument) {
            return Ok(vec![
                ldi(Register::VALUE, Operand::Literal(argument.to_string())),
                ldi(Register::ADDRESS, Operand::Address(DISPLAY_ADDRESS)),
                store(Register::ADDRESS, Register::VALUE),
            ]);
        }
        if let Some(address) = self.symbols.get(argument) {
            info!("printing variable '{}' with address {}", argument, address);
            return Ok(vec![
                ldi(Register::ADDRESS, Operand::Address(address)),
                Instruction::Lod {
                    addr: Register::ADDRESS,
                    dest: Register::VALUE,
                },
                ldi(Register::ADDRESS, Operand::Address(DISPLAY_ADDRESS)),
                store(Register::ADDRESS, Register::VALUE),
            ]);
        }
        InvalidPrintArgumentSnafu { argument, line }.fail()
    }

    fn print_string(&self, text: &str) -> Vec<Instruction> {
        let mut instrs = vec![
            ldi(Register::ADDRESS, Operand::Port(Port::ClearCharsBuffer)),
            store(Register::ADDRESS, Register::ZERO),
            ldi(Register::ADDRESS, Operand::Port(Port::WriteChar)),
        ];
        for c in text.chars() {
            instrs.push(ldi(Register::VALUE, Operand::Char(c)));
            instrs.push(store(Register::ADDRESS, Register::VALUE));
        }
        instrs.push(ldi(Register::ADDRESS, Operand::Port(Port::BufferChars)));
        instrs.push(store(Register::ADDRESS, Register::ZERO));
        instrs
    }

    pub fn declare(
        &mut self,
        name: &str,
        value: &str,
        line: usize,
    ) -> CompileResult<Vec<Instruction>> {
        ensure!(
            !self.symbols.contains(name),
            AlreadyDeclaredSnafu { name, line }
        );
        let address = self
            .symbols
            .next_address()
            .context(MemoryLimitSnafu { name, line })?;
        ensure!(is_number(value), NonNumericSnafu { name, value, line });

        let allocated = self.symbols.allocate(name);
        debug_assert_eq!(allocated, Some(address));
        debug!("'{}' allocated at {}", name, address);

        Ok(vec![
            ldi(Register::VALUE, Operand::Literal(value.to_string())),
            ldi(Register::ADDRESS, Operand::Address(address)),
            store(Register::ADDRESS, Register::VALUE),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::MEMORY_SIZE;
    use crate::CompileError;
    use insta::assert_snapshot;

    fn render(instrs: &[Instruction]) -> String {
        Program {
            instructions: instrs.to_vec(),
        }
        .to_string()
    }

    #[test]
    fn print_string() {
        let codegen = Codegen::new();
        let instrs = codegen.print("\"hi\"", 1).unwrap();
        assert_snapshot!(render(&instrs));
    }

    #[test]
    fn print_string_counts() {
        let codegen = Codegen::new();
        for text in ["", "a", "hello", "hello, world!"] {
            let instrs = codegen.print(&format!("\"{}\"", text), 1).unwrap();
            assert_eq!(instrs.len(), 3 + 2 * text.chars().count() + 2);
        }
    }

    #[test]
    fn print_number() {
        let codegen = Codegen::new();
        let instrs = codegen.print("42", 1).unwrap();
        assert_eq!(render(&instrs), "LDI r14 42\nLDI r15 250\nSTR r15 r14");
    }

    #[test]
    fn print_variable() {
        let mut codegen = Codegen::new();
        codegen.declare("a", "1", 1).unwrap();
        codegen.declare("b", "2", 2).unwrap();
        let instrs = codegen.print("b", 3).unwrap();
        assert_snapshot!(render(&instrs));
    }

    #[test]
    fn print_number_wins_over_variable() {
        let mut codegen = Codegen::new();
        codegen.declare("x", "1", 1).unwrap();
        assert_eq!(codegen.print("7", 2).unwrap().len(), 3);
    }

    #[test]
    fn print_invalid() {
        let codegen = Codegen::new();
        let err = codegen.print("nope", 7).unwrap_err();
        assert!(matches!(err, CompileError::InvalidPrintArgument { line: 7, .. }));
        assert_eq!(err.line(), Some(7));
    }

    #[test]
    fn declare() {
        let mut codegen = Codegen::new();
        let instrs = codegen.declare("x", "5", 1).unwrap();
        assert_eq!(render(&instrs), "LDI r14 5\nLDI r15 0\nSTR r15 r14");
        let instrs = codegen.declare("a_much_longer_name", "1234567890", 2).unwrap();
        assert_eq!(instrs.len(), 3);
        assert_eq!(codegen.symbols.get("a_much_longer_name"), Some(1));
    }

    #[test]
    fn declare_twice() {
        let mut codegen = Codegen::new();
        codegen.declare("x", "5", 1).unwrap();
        for value in ["5", "6", "abc"] {
            let err = codegen.declare("x", value, 2).unwrap_err();
            assert!(matches!(err, CompileError::AlreadyDeclared { line: 2, .. }));
        }
        assert_eq!(codegen.symbols.len(), 1);
    }

    #[test]
    fn declare_non_numeric() {
        let mut codegen = Codegen::new();
        let err = codegen.declare("x", "five", 3).unwrap_err();
        assert!(matches!(err, CompileError::NonNumeric { line: 3, .. }));
        assert!(codegen.symbols.is_empty());
    }

    #[test]
    fn memory_limit_checked_before_value() {
        let mut codegen = Codegen::new();
        for i in 0..MEMORY_SIZE {
            codegen.declare(&format!("v{}", i), "0", i + 1).unwrap();
        }
        let err = codegen.declare("late", "not_a_number", 241).unwrap_err();
        assert!(matches!(err, CompileError::MemoryLimit { line: 241, .. }));
        // duplicates are still reported as duplicates
        let err = codegen.declare("v0", "1", 242).unwrap_err();
        assert!(matches!(err, CompileError::AlreadyDeclared { .. }));
    }

    #[test]
    fn register_names() {
        assert_eq!(Register::ZERO.to_string(), "r0");
        assert_eq!(Register::VALUE.to_string(), "r14");
        assert_eq!(Register::ADDRESS.to_string(), "r15");
    }
}
