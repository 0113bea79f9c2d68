//! Transfer progress reporting
//!
//! Progress is operator feedback only. Reporters swallow their own output
//! errors so a closed terminal never interrupts a download.

use clap::ValueEnum;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;

/// Markers per row for [`DotRows`]
pub const DOTS_PER_ROW: usize = 80;

/// Receives one callback per chunk written to disk
pub trait TransferProgress {
    fn begin(&mut self, name: &str, total_bytes: Option<u64>);

    fn advance(&mut self, chunk_len: usize);

    fn finish(&mut self);
}

/// Reporter selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProgressMode {
    /// One dot per chunk, 80 per row
    #[default]
    Dots,
    /// indicatif progress bar
    Bar,
    /// No progress output
    #[value(name = "none")]
    Quiet,
}

impl ProgressMode {
    pub fn reporter(self) -> Box<dyn TransferProgress + Send> {
        match self {
            ProgressMode::Dots => Box::new(DotRows::new(std::io::stderr())),
            ProgressMode::Bar => Box::new(BarProgress::default()),
            ProgressMode::Quiet => Box::new(QuietProgress),
        }
    }
}

/// Prints a `.` per chunk and wraps rows at [`DOTS_PER_ROW`]
pub struct DotRows<W: Write> {
    out: W,
    in_row: usize,
}

impl<W: Write> DotRows<W> {
    pub fn new(out: W) -> Self {
        Self { out, in_row: 0 }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TransferProgress for DotRows<W> {
    fn begin(&mut self, _name: &str, _total_bytes: Option<u64>) {
        self.in_row = 0;
    }

    fn advance(&mut self, _chunk_len: usize) {
        let _ = self.out.write_all(b".");
        self.in_row += 1;
        if self.in_row == DOTS_PER_ROW {
            let _ = self.out.write_all(b"\n");
            self.in_row = 0;
        }
        let _ = self.out.flush();
    }

    fn finish(&mut self) {
        if self.in_row > 0 {
            let _ = self.out.write_all(b"\n");
            self.in_row = 0;
        }
        let _ = self.out.flush();
    }
}

/// Byte-level progress bar, or a spinner when the length is unknown
#[derive(Default)]
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl TransferProgress for BarProgress {
    fn begin(&mut self, name: &str, total_bytes: Option<u64>) {
        let bar = match total_bytes {
            Some(total) => {
                let bar = ProgressBar::new(total);
                if let Ok(style) = ProgressStyle::default_bar().template(
                    "{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {bytes}/{total_bytes} ({eta})",
                ) {
                    bar.set_style(style.progress_chars("#>-"));
                }
                bar
            },
            None => ProgressBar::new_spinner(),
        };
        bar.set_message(format!("Downloading {}", name));
        self.bar = Some(bar);
    }

    fn advance(&mut self, chunk_len: usize) {
        if let Some(bar) = &self.bar {
            bar.inc(chunk_len as u64);
        }
    }

    fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}

pub struct QuietProgress;

impl TransferProgress for QuietProgress {
    fn begin(&mut self, _name: &str, _total_bytes: Option<u64>) {}

    fn advance(&mut self, _chunk_len: usize) {}

    fn finish(&mut self) {}
}
