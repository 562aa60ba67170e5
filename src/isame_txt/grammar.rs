// Fixed grammars of divider suffixes and dot decorations
//
// fasila   = "*" ( code | "∅" ) end
// code     = [1-9] [0VHDCTSLO] [{⟨]? [0SOD] [{⟨]? [0-9] [0-9] [}⟩]? ("+" [0-9] [0-9])? ("+" [1-9] [A-Z])?
// awashir  = "x" "+"? [1-9] [HARSLCPFO] ("+" [1-9] [A-Z])? "+Q"? count? end
// khawamis = "v" ... (as awashir without "+Q")
// miaa     = "c" ... (as awashir without "+Q")
// count    = "+" [{⟨]? ( [A-Y]{1,2} | [1-9] ("-" [1-9])? "r" ) [}⟩]? ":" [1-9] [0-9]{0,2}
// end      = [⟩⟧}]? [#/>)]
//
// dots     = V "©"? H? [-≠]? "©"? Vt? "!"{0,2} "©"?   (at most one ©)
//          | "ˀ" [↑↕↓]
// V        = [ᵘᵢᵃaiuʷᴬ]
// H        = "→"{1,2} | "←"{1,2} | "↔"{1,2}
// Vt       = "↑"{1,2} | "↓"{1,2} | "↕"{1,2}

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected} at offset {offset}")]
pub struct GrammarError {
    pub offset: usize,
    pub expected: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DividerKind {
    Fasila,
    Awashir,
    Khawamis,
    Miaa,
}

impl DividerKind {
    pub fn from_marker(c: char) -> Option<Self> {
        match c {
            '*' => Some(Self::Fasila),
            'x' => Some(Self::Awashir),
            'v' => Some(Self::Khawamis),
            'c' => Some(Self::Miaa),
            _ => None,
        }
    }

    pub fn marker(self) -> char {
        match self {
            Self::Fasila => '*',
            Self::Awashir => 'x',
            Self::Khawamis => 'v',
            Self::Miaa => 'c',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Fasila => "fasila",
            Self::Awashir => "awashir",
            Self::Khawamis => "khawamis",
            Self::Miaa => "miaa",
        }
    }
}

struct Cursor<'a> {
    chars: &'a [char],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(chars: &'a [char]) -> Self {
        Self { chars, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn is_end(&self) -> bool {
        self.pos == self.chars.len()
    }

    fn eat(&mut self, accept: impl Fn(char) -> bool) -> bool {
        match self.peek() {
            Some(c) if accept(c) => {
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn expect(
        &mut self,
        accept: impl Fn(char) -> bool,
        expected: &'static str,
    ) -> Result<(), GrammarError> {
        if self.eat(accept) {
            Ok(())
        } else {
            Err(self.error(expected))
        }
    }

    fn error(&self, expected: &'static str) -> GrammarError {
        GrammarError {
            offset: self.pos,
            expected,
        }
    }

    // optional production: the cursor is restored when it does not match
    fn attempt(&mut self, production: impl FnOnce(&mut Self) -> Result<(), GrammarError>) -> bool {
        let saved = self.pos;
        if production(self).is_ok() {
            true
        } else {
            self.pos = saved;
            false
        }
    }

    // c{1,max}, all the same character
    fn repeat(&mut self, c: char, max: usize) -> usize {
        let mut n = 0;
        while n < max && self.eat(|d| d == c) {
            n += 1;
        }
        n
    }
}

fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

fn is_nonzero_digit(c: char) -> bool {
    ('1'..='9').contains(&c)
}

fn is_upper(c: char) -> bool {
    c.is_ascii_uppercase()
}

fn plus_digit_letter(cursor: &mut Cursor) -> Result<(), GrammarError> {
    cursor.expect(|c| c == '+', "+")?;
    cursor.expect(is_nonzero_digit, "[1-9]")?;
    cursor.expect(is_upper, "[A-Z]")
}

fn divider_end(cursor: &mut Cursor) -> Result<(), GrammarError> {
    cursor.eat(|c| matches!(c, '⟩' | '⟧' | '}'));
    cursor.expect(|c| matches!(c, '#' | '/' | '>' | ')'), "one of # / > )")
}

fn fasila_code(cursor: &mut Cursor) -> Result<(), GrammarError> {
    cursor.expect(is_nonzero_digit, "[1-9]")?;
    cursor.expect(|c| "0VHDCTSLO".contains(c), "one of 0VHDCTSLO")?;
    cursor.eat(|c| matches!(c, '{' | '⟨'));
    cursor.expect(|c| "0SOD".contains(c), "one of 0SOD")?;
    cursor.eat(|c| matches!(c, '{' | '⟨'));
    cursor.expect(is_digit, "[0-9]")?;
    cursor.expect(is_digit, "[0-9]")?;
    cursor.eat(|c| matches!(c, '}' | '⟩'));
    cursor.attempt(|cursor| {
        cursor.expect(|c| c == '+', "+")?;
        cursor.expect(is_digit, "[0-9]")?;
        cursor.expect(is_digit, "[0-9]")
    });
    cursor.attempt(plus_digit_letter);
    Ok(())
}

fn divider_count(cursor: &mut Cursor) -> Result<(), GrammarError> {
    cursor.expect(|c| c == '+', "+")?;
    cursor.eat(|c| matches!(c, '{' | '⟨'));
    if cursor.eat(|c| ('A'..='Y').contains(&c)) {
        cursor.eat(|c| ('A'..='Y').contains(&c));
    } else {
        cursor.expect(is_nonzero_digit, "[A-Y] or [1-9]")?;
        cursor.attempt(|cursor| {
            cursor.expect(|c| c == '-', "-")?;
            cursor.expect(is_nonzero_digit, "[1-9]")
        });
        cursor.expect(|c| c == 'r', "r")?;
    }
    cursor.eat(|c| matches!(c, '}' | '⟩'));
    cursor.expect(|c| c == ':', ":")?;
    cursor.expect(is_nonzero_digit, "[1-9]")?;
    cursor.eat(is_digit);
    cursor.eat(is_digit);
    Ok(())
}

// number of chars consumed from the marker up to and including the end symbol
pub fn parse_divider(kind: DividerKind, text: &[char]) -> Result<usize, GrammarError> {
    let mut cursor = Cursor::new(text);
    cursor.expect(|c| c == kind.marker(), "divider marker")?;

    match kind {
        DividerKind::Fasila => {
            if !cursor.eat(|c| c == '∅') {
                fasila_code(&mut cursor)?;
            }
        }
        DividerKind::Awashir | DividerKind::Khawamis | DividerKind::Miaa => {
            cursor.eat(|c| c == '+');
            cursor.expect(is_nonzero_digit, "[1-9]")?;
            cursor.expect(|c| "HARSLCPFO".contains(c), "one of HARSLCPFO")?;
            cursor.attempt(plus_digit_letter);
            if kind == DividerKind::Awashir {
                cursor.attempt(|cursor| {
                    cursor.expect(|c| c == '+', "+")?;
                    cursor.expect(|c| c == 'Q', "Q")
                });
            }
            cursor.attempt(divider_count);
        }
    }

    divider_end(&mut cursor)?;
    Ok(cursor.pos)
}

pub const DOT_BASES: &str = "ᵘᵢᵃaiuʷᴬ";

fn direction(cursor: &mut Cursor, arrows: &str) -> bool {
    match cursor.peek() {
        Some(c) if arrows.contains(c) => cursor.repeat(c, 2) > 0,
        _ => false,
    }
}

pub fn parse_dot_sequence(sequence: &str) -> Result<(), GrammarError> {
    let chars: Vec<char> = sequence.chars().collect();
    let mut cursor = Cursor::new(&chars);

    if cursor.eat(|c| c == 'ˀ') {
        cursor.expect(|c| matches!(c, '↑' | '↕' | '↓'), "one of ↑↕↓")?;
    } else {
        cursor.expect(|c| DOT_BASES.contains(c), "one of ᵘᵢᵃaiuʷᴬ")?;

        let mut copyright = 0;
        let mut copyright_slot = |cursor: &mut Cursor| -> Result<(), GrammarError> {
            if cursor.eat(|c| c == '©') {
                copyright += 1;
                if copyright > 1 {
                    return Err(GrammarError {
                        offset: cursor.pos - 1,
                        expected: "at most one ©",
                    });
                }
            }
            Ok(())
        };

        copyright_slot(&mut cursor)?;
        direction(&mut cursor, "→←↔");
        cursor.eat(|c| matches!(c, '-' | '≠'));
        copyright_slot(&mut cursor)?;
        direction(&mut cursor, "↑↓↕");
        cursor.repeat('!', 2);
        copyright_slot(&mut cursor)?;
    }

    if cursor.is_end() {
        Ok(())
    } else {
        Err(cursor.error("end of dot sequence"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn divider(kind: DividerKind, text: &str) -> Result<usize, GrammarError> {
        let chars: Vec<char> = text.chars().collect();
        parse_divider(kind, &chars)
    }

    #[test]
    fn fasila() {
        assert_eq!(divider(DividerKind::Fasila, "*1CD07#ABG"), Ok(7));
        assert_eq!(divider(DividerKind::Fasila, "*1V{O05}+12+1A#"), Ok(15));
        assert_eq!(divider(DividerKind::Fasila, "*∅⟧#"), Ok(4));
        assert_eq!(divider(DividerKind::Fasila, "*1CD07/"), Ok(7));
        assert_eq!(
            divider(DividerKind::Fasila, "*1XD07#"),
            Err(GrammarError {
                offset: 2,
                expected: "one of 0VHDCTSLO"
            })
        );
        assert_eq!(
            divider(DividerKind::Fasila, "*1CD07B"),
            Err(GrammarError {
                offset: 6,
                expected: "one of # / > )"
            })
        );
    }

    #[test]
    fn awashir_takes_a_quire_mark() {
        assert_eq!(divider(DividerKind::Awashir, "x1H+Q#"), Ok(6));
        assert_eq!(divider(DividerKind::Awashir, "x+2A+1B+Q+{KL}:12#"), Ok(18));
        assert_eq!(divider(DividerKind::Awashir, "x1H+2-3r:5⟩#"), Ok(12));
        assert!(divider(DividerKind::Khawamis, "v1H+Q#").is_err());
        assert_eq!(divider(DividerKind::Miaa, "c1P#"), Ok(4));
    }

    #[test]
    fn dots() {
        assert!(parse_dot_sequence("ᵃ").is_ok());
        assert!(parse_dot_sequence("ᵃ©←←-↑!!").is_ok());
        assert!(parse_dot_sequence("ᵘ→≠©↕").is_ok());
        assert!(parse_dot_sequence("ᵢ↔↓!©").is_ok());
        assert!(parse_dot_sequence("ˀ↑").is_ok());

        assert_eq!(
            parse_dot_sequence("ᵃ©←↑©"),
            Err(GrammarError {
                offset: 4,
                expected: "at most one ©"
            })
        );
        assert_eq!(
            parse_dot_sequence("ᵃ↑←"),
            Err(GrammarError {
                offset: 2,
                expected: "end of dot sequence"
            })
        );
        assert!(parse_dot_sequence("ᵃ←©-").is_err());
    }
}
