//! # Hiss Assembler
//!
//! This module translates textual Hiss assembly into a binary module that
//! [`crate::module::Module::load`] can decode. Assembly is a single forward
//! pass over whitespace-separated tokens with back-patching for forward label
//! references.
//!
//! ## Source shape
//! ```text
//! # comment lines start with '#'
//! .constants {
//!     hfunc 0 $main        # entry function, arity 0, offset patched later
//!     hint 0x2a
//! }
//! .code {
//! main:
//!     pushc 1
//!     print
//!     halt
//! }
//! ```
//!
//! ## Token classification
//! Classification is positional, not keyworded: `{`/`}` are block
//! delimiters, a leading `.` marks a section header, a trailing `:` a label
//! definition, a leading `$` a label reference. Anything parseable as an
//! integer literal (decimal, `0x` hex, `0b` binary, `0o` octal, optional
//! leading `-`) is an integer. The remainder must name a type (`hint`,
//! `hfunc`) or an opcode mnemonic; anything else is an [`AsmError::InvalidToken`].
//!
//! ## Label resolution
//! Labels are defined inside `.code` and resolve to the byte offset of the
//! next emitted instruction, measured from the start of the code segment.
//! A reference emitted before its definition writes eight `0xFF` placeholder
//! bytes and records a patch entry; defining the label walks the patch list
//! and overwrites every pending site. Redefinition is
//! [`AsmError::DuplicateLabel`]; a patch entry still unresolved at end of
//! input is [`AsmError::UnresolvedReference`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use tracing::debug;

use crate::error::AsmError;
use crate::module::{HType, Op, MAGIC};

/// Mnemonic lookup table for code-section tokens.
static MNEMONICS: Lazy<HashMap<&'static str, Op>> = Lazy::new(|| {
    HashMap::from([
        ("noop", Op::Noop),
        ("pushc", Op::Pushc),
        ("pop", Op::Pop),
        ("loadv", Op::Loadv),
        ("storev", Op::Storev),
        ("halt", Op::Halt),
        ("call", Op::Call),
        ("ret", Op::Ret),
        ("br", Op::Br),
        ("jmp", Op::Jmp),
        ("iadd", Op::Iadd),
        ("isub", Op::Isub),
        ("imul", Op::Imul),
        ("idiv", Op::Idiv),
        ("iand", Op::Iand),
        ("ior", Op::Ior),
        ("icmp", Op::Icmp),
        ("print", Op::Print),
    ])
});

/// One lexical token of Hiss assembly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Token {
    LBrace,
    RBrace,
    /// Section header, e.g. `.constants`.
    Section(String),
    /// Label definition, e.g. `main:`.
    LabelDef(String),
    /// Label reference, e.g. `$main`.
    LabelRef(String),
    /// Integer literal in any supported base.
    Int(i64),
    /// Constant type name, `hint` or `hfunc`.
    Type(HType),
    /// Opcode mnemonic.
    Instr(Op),
    /// End of input; returned on every read past the last token.
    Eof,
}

/// Parse a base-agnostic integer literal.
///
/// Accepts an optional leading `-`, then `0x`/`0b`/`0o` prefixes or plain
/// decimal. Returns `None` if the word is not an integer literal.
fn parse_int(word: &str) -> Option<i64> {
    let (neg, digits) = match word.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, word),
    };
    let (radix, digits) = if let Some(d) = digits.strip_prefix("0x") {
        (16, d)
    } else if let Some(d) = digits.strip_prefix("0b") {
        (2, d)
    } else if let Some(d) = digits.strip_prefix("0o") {
        (8, d)
    } else {
        (10, digits)
    };
    if digits.starts_with(['+', '-']) {
        return None;
    }
    let v = i64::from_str_radix(digits, radix).ok()?;
    Some(if neg { v.wrapping_neg() } else { v })
}

/// Classify one whitespace-separated word.
fn classify(word: &str) -> Result<Token, AsmError> {
    match word {
        "{" => return Ok(Token::LBrace),
        "}" => return Ok(Token::RBrace),
        _ => {}
    }
    if let Some(rest) = word.strip_prefix('.') {
        let name = rest.strip_suffix(':').unwrap_or(rest);
        return Ok(Token::Section(name.to_string()));
    }
    if let Some(name) = word.strip_suffix(':') {
        return Ok(Token::LabelDef(name.to_string()));
    }
    if let Some(name) = word.strip_prefix('$') {
        return Ok(Token::LabelRef(name.to_string()));
    }
    if let Some(v) = parse_int(word) {
        return Ok(Token::Int(v));
    }
    match word {
        "hint" => return Ok(Token::Type(HType::Int)),
        "hfunc" => return Ok(Token::Type(HType::Func)),
        _ => {}
    }
    if let Some(&op) = MNEMONICS.get(word) {
        return Ok(Token::Instr(op));
    }
    Err(AsmError::InvalidToken(word.to_string()))
}

/// Tokeniser over Hiss assembly source.
///
/// Comment lines are dropped before word-splitting; everything else is
/// separated on ASCII whitespace. Reading past the end yields [`Token::Eof`]
/// forever.
pub struct Lexer<'s> {
    words: Vec<&'s str>,
    pos: usize,
}

impl<'s> Lexer<'s> {
    pub fn new(source: &'s str) -> Self {
        let words = source
            .lines()
            .filter(|line| !line.trim_start().starts_with('#'))
            .flat_map(str::split_whitespace)
            .collect();
        Lexer { words, pos: 0 }
    }

    /// Classify and return the next token.
    pub fn next_token(&mut self) -> Result<Token, AsmError> {
        match self.words.get(self.pos) {
            Some(word) => {
                self.pos += 1;
                classify(word)
            }
            None => Ok(Token::Eof),
        }
    }
}

/// A pending forward reference: eight placeholder bytes at `at`, waiting for
/// `label` to be defined.
struct Patch {
    at: usize,
    label: String,
    resolved: bool,
}

/// Single-pass assembler with back-patching.
pub struct Assembler<'s> {
    lexer: Lexer<'s>,
    buf: Vec<u8>,
    labels: HashMap<String, u64>,
    patches: Vec<Patch>,
    /// Byte position where the code segment begins; label offsets are
    /// measured from here.
    code_start: usize,
}

/// Assemble Hiss source into a binary module.
pub fn assemble(source: &str) -> Result<Vec<u8>, AsmError> {
    Assembler::new(source).assemble()
}

impl<'s> Assembler<'s> {
    pub fn new(source: &'s str) -> Self {
        Assembler {
            lexer: Lexer::new(source),
            buf: Vec::new(),
            labels: HashMap::new(),
            patches: Vec::new(),
            code_start: 0,
        }
    }

    /// Run the assembler to completion, producing the module bytes.
    pub fn assemble(mut self) -> Result<Vec<u8>, AsmError> {
        self.buf.extend_from_slice(&MAGIC);
        // Constant count, backpatched once the section is closed.
        let count_at = self.buf.len();
        self.buf.push(0);

        self.expect_section("constants")?;
        self.expect(Token::LBrace)?;
        let count = self.constants()?;
        self.buf[count_at] =
            u8::try_from(count).map_err(|_| AsmError::OutOfRange(count as i64))?;

        self.expect_section("code")?;
        self.expect(Token::LBrace)?;
        self.code_start = self.buf.len();
        self.code()?;

        match self.lexer.next_token()? {
            Token::Eof => {}
            tok => return Err(unexpected(&tok)),
        }
        if let Some(patch) = self.patches.iter().find(|p| !p.resolved) {
            return Err(AsmError::UnresolvedReference(patch.label.clone()));
        }
        Ok(self.buf)
    }

    /// Parse the body of `.constants`, emitting tag + payload per entry.
    /// Returns the number of constants emitted.
    fn constants(&mut self) -> Result<usize, AsmError> {
        let mut count = 0usize;
        loop {
            match self.lexer.next_token()? {
                Token::RBrace => return Ok(count),
                Token::Type(HType::Int) => {
                    let v = self.expect_int()?;
                    self.buf.push(HType::Int as u8);
                    self.buf.extend_from_slice(&v.to_be_bytes());
                }
                Token::Type(HType::Func) => {
                    let arity = self.expect_int()?;
                    let arity = u8::try_from(arity).map_err(|_| AsmError::OutOfRange(arity))?;
                    self.buf.push(HType::Func as u8);
                    self.buf.push(arity);
                    match self.lexer.next_token()? {
                        Token::Int(offset) => self.buf.extend_from_slice(&offset.to_be_bytes()),
                        Token::LabelRef(name) => self.label_ref(name),
                        tok => return Err(unexpected(&tok)),
                    }
                }
                tok => return Err(unexpected(&tok)),
            }
            count += 1;
        }
    }

    /// Parse the body of `.code`: label definitions, mnemonics, and raw
    /// immediate bytes, in source order.
    fn code(&mut self) -> Result<(), AsmError> {
        loop {
            match self.lexer.next_token()? {
                Token::RBrace => return Ok(()),
                Token::LabelDef(name) => self.define_label(name)?,
                Token::Instr(op) => self.buf.push(op as u8),
                Token::Int(v) => {
                    let b = u8::try_from(v).map_err(|_| AsmError::OutOfRange(v))?;
                    self.buf.push(b);
                }
                tok => return Err(unexpected(&tok)),
            }
        }
    }

    /// Emit an 8-byte code offset for a label reference, either resolved
    /// immediately or as a recorded placeholder.
    fn label_ref(&mut self, name: String) {
        if let Some(&offset) = self.labels.get(&name) {
            self.buf.extend_from_slice(&(offset as i64).to_be_bytes());
        } else {
            self.patches.push(Patch {
                at: self.buf.len(),
                label: name,
                resolved: false,
            });
            self.buf.extend_from_slice(&[0xFF; 8]);
        }
    }

    /// Bind `name` to the current code offset and walk the patch list.
    fn define_label(&mut self, name: String) -> Result<(), AsmError> {
        let offset = (self.buf.len() - self.code_start) as u64;
        if self.labels.insert(name.clone(), offset).is_some() {
            return Err(AsmError::DuplicateLabel(name));
        }
        debug!(label = %name, offset, "resolved label");
        for patch in self.patches.iter_mut().filter(|p| p.label == name) {
            self.buf[patch.at..patch.at + 8].copy_from_slice(&(offset as i64).to_be_bytes());
            patch.resolved = true;
        }
        Ok(())
    }

    fn expect(&mut self, want: Token) -> Result<(), AsmError> {
        let tok = self.lexer.next_token()?;
        if tok == want {
            Ok(())
        } else {
            Err(unexpected(&tok))
        }
    }

    fn expect_section(&mut self, name: &str) -> Result<(), AsmError> {
        match self.lexer.next_token()? {
            Token::Section(s) if s == name => Ok(()),
            tok => Err(unexpected(&tok)),
        }
    }

    fn expect_int(&mut self) -> Result<i64, AsmError> {
        match self.lexer.next_token()? {
            Token::Int(v) => Ok(v),
            tok => Err(unexpected(&tok)),
        }
    }
}

fn unexpected(tok: &Token) -> AsmError {
    AsmError::UnexpectedToken(format!("{:?}", tok))
}

#[cfg(test)]
mod tests;
