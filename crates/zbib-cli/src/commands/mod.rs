pub mod bibtex;
pub mod check;
pub mod common;
pub mod completions;
pub mod pdfs;
pub mod sync;
