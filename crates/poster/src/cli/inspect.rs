use std::fmt::Write as _;
use std::path::Path;

use anyhow::Context;
use dp_corpus::segment;

/// Summary of a corpus: entry count plus every entry that reaches
/// `max_len` and how many chunks it becomes.
pub fn report(corpus: &str, max_len: usize) -> anyhow::Result<String> {
    let entries = segment(corpus)?;
    let mut out = String::new();
    let mut long = 0usize;

    for entry in entries.iter().filter(|e| e.needs_chunking(max_len)) {
        long += 1;
        let chunks = entry.chunks(max_len);
        let widest = chunks.iter().map(|c| c.len()).max().unwrap_or(0);
        writeln!(
            out,
            "{:>5}  {:>6} bytes  {} chunks  (widest {widest})  {}",
            entry.index,
            entry.body.len(),
            chunks.len(),
            entry.title
        )?;
    }
    writeln!(
        out,
        "{} entries, {long} of {max_len}+ bytes",
        entries.len()
    )?;
    Ok(out)
}

pub fn run(path: &Path, max_len: usize) -> anyhow::Result<()> {
    let corpus = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    print!("{}", report(&corpus, max_len)?);
    Ok(())
}
