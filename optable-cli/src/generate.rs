use core::fmt;
use std::{
    error::Error,
    fs::read_to_string,
    io::{self, Write},
    path::Path,
};

use anyhow::anyhow;
use log::{debug, info};
use optable_gen::GenerateError;
use optable_parser::location;

// lets the generator write into an io::Write, keeping the io error that a fmt::Error stands for
struct IoWriter<'w, W: Write> {
    inner: &'w mut W,
    error: Option<io::Error>,
}

impl<W: Write> fmt::Write for IoWriter<'_, W> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.inner.write_all(s.as_bytes()).map_err(|e| {
            self.error = Some(e);
            fmt::Error
        })
    }
}

pub fn generate(path: &Path, out: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let source = read_to_string(path)
        .map_err(|e| anyhow!("failed to read table {}: {}", path.display(), e))?;
    debug!("read {} bytes from {}", source.len(), path.display());

    let mut writer = IoWriter {
        inner: &mut *out,
        error: None,
    };
    let summary = optable_gen::generate(&source, &mut writer).map_err(|e| match e {
        GenerateError::Parse(e) => {
            let (line, column) = location(&source, e.pos);
            anyhow!(
                "parsing failed at line {}, column {}: {}",
                line,
                column,
                e.kind
            )
        }
        GenerateError::Fmt(_) => match writer.error.take() {
            Some(e) => anyhow!("failed to write output: {}", e),
            None => anyhow!("failed to write output"),
        },
    })?;
    out.flush()?;

    info!(
        "generated {} opcode entries and {} groups",
        summary.entries, summary.groups
    );
    Ok(())
}
