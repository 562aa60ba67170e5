use std::fmt;

use crate::document::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanKind {
    Unclear,   // { }
    Lacuna,    // ⟦ ⟧
    Illegible, // ⟨ ⟩
    Variant,   // [ / ]
    Note,      // ( )
}

impl SpanKind {
    pub fn from_opening(c: char) -> Option<Self> {
        match c {
            '{' => Some(Self::Unclear),
            '⟦' => Some(Self::Lacuna),
            '⟨' => Some(Self::Illegible),
            '[' => Some(Self::Variant),
            '(' => Some(Self::Note),
            _ => None,
        }
    }

    pub fn from_closing(c: char) -> Option<Self> {
        match c {
            '}' => Some(Self::Unclear),
            '⟧' => Some(Self::Lacuna),
            '⟩' => Some(Self::Illegible),
            ']' => Some(Self::Variant),
            ')' => Some(Self::Note),
            _ => None,
        }
    }
}

impl fmt::Display for SpanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unclear => "unclear",
            Self::Lacuna => "lacuna",
            Self::Illegible => "illegible",
            Self::Variant => "variant",
            Self::Note => "note",
        };
        f.write_str(name)
    }
}

// (block, char)
pub type Position = (usize, usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanError {
    AlreadyOpen(SpanKind),
    NotOpen(SpanKind),
}

// an opened span; the start is deferred to the first content character after the opening marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Pending {
    start: Option<Position>,
}

#[derive(Debug, Default)]
pub struct SpanTracker {
    unclear: Option<Pending>,
    lacuna: Option<Pending>,
    illegible: Option<Pending>,
    variant: Option<Pending>,
    notes: Vec<Pending>, // LIFO, notes nest
}

impl SpanTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, kind: SpanKind) -> Option<&mut Option<Pending>> {
        match kind {
            SpanKind::Unclear => Some(&mut self.unclear),
            SpanKind::Lacuna => Some(&mut self.lacuna),
            SpanKind::Illegible => Some(&mut self.illegible),
            SpanKind::Variant => Some(&mut self.variant),
            SpanKind::Note => None,
        }
    }

    // an already open span keeps its original start
    pub fn open(&mut self, kind: SpanKind) -> Result<(), SpanError> {
        if kind == SpanKind::Note {
            self.notes.push(Pending::default());
            return Ok(());
        }
        if let Some(slot) = self.slot(kind) {
            if slot.is_some() {
                return Err(SpanError::AlreadyOpen(kind));
            }
            *slot = Some(Pending::default());
        }
        Ok(())
    }

    // called for every content character
    pub fn anchor(&mut self, position: Position) {
        let slots = [
            &mut self.unclear,
            &mut self.lacuna,
            &mut self.illegible,
            &mut self.variant,
        ];
        for pending in slots.into_iter().flatten() {
            pending.start.get_or_insert(position);
        }
        for pending in self.notes.iter_mut().rev() {
            if pending.start.is_some() {
                break;
            }
            pending.start = Some(position);
        }
    }

    // Ok(None): the span was open but enclosed no content
    pub fn close(
        &mut self,
        kind: SpanKind,
        end: Option<Position>,
    ) -> Result<Option<Span>, SpanError> {
        let pending = if kind == SpanKind::Note {
            self.notes.pop()
        } else {
            self.slot(kind).and_then(|slot| slot.take())
        }
        .ok_or(SpanError::NotOpen(kind))?;

        Ok(match (pending.start, end) {
            (Some((inib, inic)), Some((endb, endc))) if (inib, inic) <= (endb, endc) => {
                Some(Span {
                    inib,
                    inic,
                    endb,
                    endc,
                })
            }
            _ => None,
        })
    }

    pub fn discard(&mut self, kind: SpanKind) {
        if kind == SpanKind::Note {
            self.notes.pop();
        } else if let Some(slot) = self.slot(kind) {
            *slot = None;
        }
    }

    // kinds still open, one entry per open note
    pub fn unclosed(&self) -> Vec<SpanKind> {
        let mut kinds = Vec::new();
        for (kind, slot) in [
            (SpanKind::Unclear, &self.unclear),
            (SpanKind::Lacuna, &self.lacuna),
            (SpanKind::Illegible, &self.illegible),
            (SpanKind::Variant, &self.variant),
        ] {
            if slot.is_some() {
                kinds.push(kind);
            }
        }
        kinds.extend(self.notes.iter().map(|_| SpanKind::Note));
        kinds
    }
}
