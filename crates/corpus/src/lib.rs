//! `dp-corpus` — splits a feed's raw text into entries and splits oversized
//! entries into transport-sized chunks.
//!
//! An entry is the text between two runs of four newlines (three blank
//! lines); its title is its first line.  Entries longer than the transport
//! ceiling are cut on paragraph boundaries (two newlines) into chunks whose
//! concatenation is the original body.
//!
//! ```
//! use dp_corpus::segment;
//!
//! let entries = segment("A\n\n\n\nB\n\n\n\nC").unwrap();
//! let titles: Vec<&str> = entries.iter().map(|e| e.title).collect();
//! assert_eq!(titles, ["A", "B", "C"]);
//! ```

pub mod segment;

pub use segment::{
    chunk, segment, title_of, Entry, CONTINUED_SUFFIX, ENTRY_DELIMITER, MAX_LEN,
    PARAGRAPH_DELIMITER,
};
