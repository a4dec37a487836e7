//! Reader and writer for the subset of the HOA v1 format used by Büchi tools:
//! explicit edge labels, a single initial state and transition or state
//! based acceptance marks.

use crate::automaton::{Acceptance, Automaton, State};
use crate::error::{HoaError, HoaResult};
use crate::guard::{Alphabet, Guard};
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Tok {
    /// `name:` at the start of a header item or `State:` in the body.
    Header(String),
    Ident(String),
    Int(u32),
    Str(String),
    Punct(char),
    Body,
    End,
    Abort,
}

impl std::fmt::Display for Tok {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Header(h) => write!(f, "`{h}:`"),
            Tok::Ident(s) => write!(f, "`{s}`"),
            Tok::Int(i) => write!(f, "`{i}`"),
            Tok::Str(s) => write!(f, "\"{s}\""),
            Tok::Punct(c) => write!(f, "`{c}`"),
            Tok::Body => write!(f, "`--BODY--`"),
            Tok::End => write!(f, "`--END--`"),
            Tok::Abort => write!(f, "`--ABORT--`"),
        }
    }
}

fn tokenize(text: &str) -> HoaResult<Vec<(Tok, usize)>> {
    let chars: Vec<char> = text.chars().collect();
    let mut toks = Vec::new();
    let mut line = 1;
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c == '\n' {
            line += 1;
            i += 1;
        } else if c.is_whitespace() {
            i += 1;
        } else if c == '/' && chars.get(i + 1) == Some(&'*') {
            i += 2;
            while i < chars.len() && !(chars[i] == '*' && chars.get(i + 1) == Some(&'/')) {
                if chars[i] == '\n' {
                    line += 1;
                }
                i += 1;
            }
            i += 2;
        } else if c == '"' {
            let start = line;
            let mut s = String::new();
            i += 1;
            loop {
                match chars.get(i) {
                    None => return Err(HoaError::UnterminatedString { line: start }),
                    Some('"') => break,
                    Some('\\') => {
                        if let Some(&next) = chars.get(i + 1) {
                            s.push(next);
                        }
                        i += 2;
                    }
                    Some(&ch) => {
                        if ch == '\n' {
                            line += 1;
                        }
                        s.push(ch);
                        i += 1;
                    }
                }
            }
            i += 1;
            toks.push((Tok::Str(s), start));
        } else if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            let digits: String = chars[start..i].iter().collect();
            let value = digits.parse().map_err(|_| HoaError::UnexpectedToken {
                line,
                expected: "a 32-bit integer".into(),
                found: digits.clone(),
            })?;
            toks.push((Tok::Int(value), line));
        } else if c == '-' && chars.get(i + 1) == Some(&'-') {
            let start = i;
            i += 2;
            while i < chars.len() && chars[i] != '-' {
                i += 1;
            }
            i += 2;
            let word: String = chars[start..i.min(chars.len())].iter().collect();
            let tok = match word.as_str() {
                "--BODY--" => Tok::Body,
                "--END--" => Tok::End,
                "--ABORT--" => Tok::Abort,
                _ => {
                    return Err(HoaError::UnexpectedToken {
                        line,
                        expected: "`--BODY--` or `--END--`".into(),
                        found: word,
                    })
                }
            };
            toks.push((tok, line));
        } else if c.is_ascii_alphabetic() || c == '_' || c == '@' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_alphanumeric() || chars[i] == '_' || chars[i] == '-') {
                i += 1;
            }
            let word: String = chars[start..i].iter().collect();
            if chars.get(i) == Some(&':') {
                i += 1;
                toks.push((Tok::Header(word), line));
            } else {
                toks.push((Tok::Ident(word), line));
            }
        } else {
            toks.push((Tok::Punct(c), line));
            i += 1;
        }
    }
    Ok(toks)
}

struct Parser {
    toks: Vec<(Tok, usize)>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.toks.get(self.pos).map(|(t, _)| t)
    }

    fn line(&self) -> usize {
        self.toks
            .get(self.pos)
            .or_else(|| self.toks.last())
            .map_or(1, |&(_, l)| l)
    }

    fn next(&mut self) -> Option<Tok> {
        let t = self.toks.get(self.pos).map(|(t, _)| t.clone());
        self.pos += 1;
        t
    }

    fn unexpected<T>(&self, expected: &str) -> HoaResult<T> {
        Err(HoaError::UnexpectedToken {
            line: self.line(),
            expected: expected.into(),
            found: self.peek().map_or("end of input".into(), |t| t.to_string()),
        })
    }

    fn expect_punct(&mut self, c: char) -> HoaResult<()> {
        if self.peek() == Some(&Tok::Punct(c)) {
            self.pos += 1;
            Ok(())
        } else {
            self.unexpected(&format!("`{c}`"))
        }
    }

    fn expect_int(&mut self) -> HoaResult<u32> {
        match self.peek() {
            Some(&Tok::Int(i)) => {
                self.pos += 1;
                Ok(i)
            }
            _ => self.unexpected("an integer"),
        }
    }

    /// Tokens up to the next header item or `--BODY--`.
    fn header_values(&mut self) -> Vec<Tok> {
        let mut values = Vec::new();
        while let Some(t) = self.peek() {
            if matches!(t, Tok::Header(_) | Tok::Body | Tok::End | Tok::Abort) {
                break;
            }
            values.extend(self.next());
        }
        values
    }

    fn automaton(&mut self) -> HoaResult<Automaton> {
        match self.next() {
            Some(Tok::Header(h)) if h == "HOA" => {}
            _ => {
                self.pos -= 1;
                return self.unexpected("`HOA:`");
            }
        }
        match self.next() {
            Some(Tok::Ident(v)) if v == "v1" => {}
            _ => {
                self.pos -= 1;
                return self.unexpected("`v1`");
            }
        }

        let mut name = None;
        let mut num_states = None;
        let mut starts: Vec<State> = Vec::new();
        let mut aps: Vec<String> = Vec::new();
        let mut acceptance = None;

        loop {
            let line = self.line();
            match self.next() {
                Some(Tok::Body) => break,
                Some(Tok::Header(h)) => match h.as_str() {
                    "name" => match self.next() {
                        Some(Tok::Str(s)) => name = Some(s),
                        _ => {
                            self.pos -= 1;
                            return self.unexpected("a quoted name");
                        }
                    },
                    "States" => num_states = Some(self.expect_int()?),
                    "Start" => {
                        starts.push(self.expect_int()?);
                        if self.peek() == Some(&Tok::Punct('&')) {
                            return Err(HoaError::Unsupported {
                                line,
                                feature: "alternating initial states".into(),
                            });
                        }
                    }
                    "AP" => {
                        let n = self.expect_int()?;
                        for _ in 0..n {
                            match self.next() {
                                Some(Tok::Str(s)) => aps.push(s),
                                _ => {
                                    self.pos -= 1;
                                    return self.unexpected("a quoted proposition name");
                                }
                            }
                        }
                    }
                    "Acceptance" => {
                        let num_sets = self.expect_int()?;
                        let condition = render_condition(&self.header_values());
                        acceptance = Some(match (num_sets, condition.as_str()) {
                            (1, "Inf(0)") => Acceptance::Buchi,
                            (0, "t") => Acceptance::All,
                            _ => Acceptance::Other { num_sets, condition },
                        });
                    }
                    "Alias" => {
                        return Err(HoaError::Unsupported {
                            line,
                            feature: "`Alias:`".into(),
                        })
                    }
                    _ => {
                        self.header_values();
                    }
                },
                _ => {
                    self.pos -= 1;
                    return self.unexpected("a header item or `--BODY--`");
                }
            }
        }

        let num_states = num_states.ok_or(HoaError::MissingHeader { header: "States" })?;
        let acceptance = acceptance.ok_or(HoaError::MissingHeader { header: "Acceptance" })?;
        let init = match starts.as_slice() {
            [] => return Err(HoaError::MissingHeader { header: "Start" }),
            [s] => *s,
            _ => {
                return Err(HoaError::Unsupported {
                    line: self.line(),
                    feature: "multiple initial states".into(),
                })
            }
        };
        let in_range = |line: usize, state: State| {
            if state < num_states {
                Ok(state)
            } else {
                Err(HoaError::StateOutOfRange { line, state, num_states })
            }
        };

        let mut aut = Automaton::new(Alphabet::new(aps), acceptance);
        aut.name = name;
        aut.new_states(num_states);
        aut.set_init(in_range(self.line(), init)?);

        let mut names = vec![String::new(); num_states as usize];
        let mut named = false;
        loop {
            let line = self.line();
            match self.next() {
                Some(Tok::End) => break,
                Some(Tok::Abort) => {
                    return Err(HoaError::Unsupported {
                        line,
                        feature: "`--ABORT--`".into(),
                    })
                }
                Some(Tok::Header(h)) if h == "State" => {
                    if self.peek() == Some(&Tok::Punct('[')) {
                        return Err(HoaError::Unsupported {
                            line,
                            feature: "state labels".into(),
                        });
                    }
                    let src = in_range(line, self.expect_int()?)?;
                    if let Some(Tok::Str(_)) = self.peek() {
                        if let Some(Tok::Str(s)) = self.next() {
                            names[src as usize] = s;
                            named = true;
                        }
                    }
                    let state_acc = self.acc_marks()?;
                    self.edges(&mut aut, src, state_acc)?;
                }
                _ => {
                    self.pos -= 1;
                    return self.unexpected("`State:` or `--END--`");
                }
            }
        }

        if named {
            aut.set_state_names(names);
        }
        Ok(aut)
    }

    fn edges(&mut self, aut: &mut Automaton, src: State, state_acc: bool) -> HoaResult<()> {
        let num_states = aut.num_states();
        loop {
            let line = self.line();
            match self.peek() {
                Some(Tok::Punct('[')) => {
                    self.pos += 1;
                    let guard = self.label_or(aut.alphabet().num_aps())?;
                    self.expect_punct(']')?;
                    let dst = self.expect_int()?;
                    if dst >= num_states {
                        return Err(HoaError::StateOutOfRange { line, state: dst, num_states });
                    }
                    let edge_acc = self.acc_marks()?;
                    aut.new_edge(src, dst, guard, state_acc || edge_acc);
                }
                Some(Tok::Int(_)) => {
                    return Err(HoaError::Unsupported {
                        line,
                        feature: "implicit edge labels".into(),
                    })
                }
                _ => return Ok(()),
            }
        }
    }

    /// Optional `{i j ...}`; true when set 0 is among the marks.
    fn acc_marks(&mut self) -> HoaResult<bool> {
        if self.peek() != Some(&Tok::Punct('{')) {
            return Ok(false);
        }
        self.pos += 1;
        let mut in_zero = false;
        loop {
            match self.next() {
                Some(Tok::Punct('}')) => return Ok(in_zero),
                Some(Tok::Int(i)) => in_zero |= i == 0,
                _ => {
                    self.pos -= 1;
                    return self.unexpected("an acceptance set or `}`");
                }
            }
        }
    }

    fn label_or(&mut self, num_aps: usize) -> HoaResult<Guard> {
        let mut parts = vec![self.label_and(num_aps)?];
        while self.peek() == Some(&Tok::Punct('|')) {
            self.pos += 1;
            parts.push(self.label_and(num_aps)?);
        }
        Ok(Guard::or(parts))
    }

    fn label_and(&mut self, num_aps: usize) -> HoaResult<Guard> {
        let mut parts = vec![self.label_atom(num_aps)?];
        while self.peek() == Some(&Tok::Punct('&')) {
            self.pos += 1;
            parts.push(self.label_atom(num_aps)?);
        }
        Ok(Guard::and(parts))
    }

    fn label_atom(&mut self, num_aps: usize) -> HoaResult<Guard> {
        let line = self.line();
        match self.next() {
            Some(Tok::Punct('!')) => Ok(Guard::not(self.label_atom(num_aps)?)),
            Some(Tok::Punct('(')) => {
                let g = self.label_or(num_aps)?;
                self.expect_punct(')')?;
                Ok(g)
            }
            Some(Tok::Ident(s)) if s == "t" => Ok(Guard::True),
            Some(Tok::Ident(s)) if s == "f" => Ok(Guard::False),
            Some(Tok::Ident(s)) if s.starts_with('@') => Err(HoaError::Unsupported {
                line,
                feature: format!("alias `{s}`"),
            }),
            Some(Tok::Int(ap)) => {
                if (ap as usize) < num_aps {
                    Ok(Guard::Ap(ap))
                } else {
                    Err(HoaError::PropositionOutOfRange { line, ap, num_aps })
                }
            }
            _ => {
                self.pos -= 1;
                self.unexpected("a label")
            }
        }
    }
}

fn render_condition(toks: &[Tok]) -> String {
    let mut out = String::new();
    for t in toks {
        match t {
            Tok::Punct(c @ ('&' | '|')) => {
                let _ = write!(out, " {c} ");
            }
            Tok::Punct(c) => out.push(*c),
            Tok::Ident(s) => out.push_str(s),
            Tok::Int(i) => {
                let _ = write!(out, "{i}");
            }
            other => {
                let _ = write!(out, "{other}");
            }
        }
    }
    out
}

/// Parse every automaton in `text`.
pub fn parse_all(text: &str) -> HoaResult<Vec<Automaton>> {
    let mut parser = Parser {
        toks: tokenize(text)?,
        pos: 0,
    };
    let mut out = Vec::new();
    while parser.peek().is_some() {
        out.push(parser.automaton()?);
    }
    Ok(out)
}

/// Parse a single automaton; trailing automata are an error.
pub fn parse(text: &str) -> HoaResult<Automaton> {
    let mut parser = Parser {
        toks: tokenize(text)?,
        pos: 0,
    };
    let aut = parser.automaton()?;
    if parser.peek().is_some() {
        return parser.unexpected("end of input");
    }
    Ok(aut)
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Render `aut` in HOA v1 with transition-based acceptance.
pub fn to_hoa(aut: &Automaton) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_hoa(&mut out, aut);
    out
}

pub fn write_hoa(out: &mut impl Write, aut: &Automaton) -> std::fmt::Result {
    writeln!(out, "HOA: v1")?;
    if let Some(name) = &aut.name {
        writeln!(out, "name: {}", quote(name))?;
    }
    writeln!(out, "States: {}", aut.num_states())?;
    if aut.num_states() > 0 {
        writeln!(out, "Start: {}", aut.init())?;
    }
    write!(out, "AP: {}", aut.alphabet().num_aps())?;
    for ap in aut.alphabet().names() {
        write!(out, " {}", quote(ap))?;
    }
    writeln!(out)?;
    match aut.acceptance() {
        Acceptance::Buchi => writeln!(out, "acc-name: Buchi")?,
        Acceptance::All => writeln!(out, "acc-name: all")?,
        Acceptance::Other { .. } => {}
    }
    writeln!(out, "Acceptance: {}", aut.acceptance())?;
    writeln!(out, "properties: trans-labels explicit-labels trans-acc")?;
    writeln!(out, "--BODY--")?;
    for s in 0..aut.num_states() {
        write!(out, "State: {s}")?;
        if let Some(name) = aut.state_name(s).filter(|n| !n.is_empty()) {
            write!(out, " {}", quote(name))?;
        }
        writeln!(out)?;
        for e in aut.out(s) {
            write!(out, "[{}] {}", e.guard, e.dst)?;
            if e.accepting {
                write!(out, " {{0}}")?;
            }
            writeln!(out)?;
        }
    }
    writeln!(out, "--END--")
}
