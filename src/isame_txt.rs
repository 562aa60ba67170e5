// InterSaME transcription files of Qurʾān manuscripts
//
// One record per manuscript page. The body encodes the letter skeleton with
// decorations, word separators (#), verse indices (i:j), dividers and spans
// ({ } unclear, ⟦ ⟧ lacuna, ⟨ ⟩ illegible, [ / ] variant, ( ) note).
//
// Problems are collected for the whole file before giving up:
// - a line number out of sequence does not stop the page
// - an unknown start index or a bad title still lets the page be scanned

mod encoding;
pub mod grammar;
mod note_merger;
pub mod parser;
pub mod record;
mod scanner;
pub mod span_tracker;
mod validator;
