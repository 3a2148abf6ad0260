//! Guard against overwriting an existing image by accident.

use std::io::{self, BufRead, Write};

pub const PASSPHRASE: &str = "GOGOGO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Aborted,
}

/// Ask for `PASSPHRASE` on `output` and read one line from `input`.
/// Only an exact match confirms; EOF aborts.
pub fn confirm<R: BufRead, W: Write>(mut input: R, mut output: W) -> io::Result<Confirmation> {
    writeln!(
        output,
        "Enter '{PASSPHRASE}' if you really want to recreate the fs image!"
    )?;
    writeln!(output, "The command will exit directly if the input is wrong.")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    let entered = line
        .strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(&line);

    if entered == PASSPHRASE {
        Ok(Confirmation::Confirmed)
    } else {
        Ok(Confirmation::Aborted)
    }
}
