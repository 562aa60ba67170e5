pub mod diagnostics;
pub mod document;
pub mod error;
pub mod isame_txt;
pub mod mapper;
pub mod quran;
pub mod rasm;
pub mod reference;
