use chrono::{DateTime, Local};

#[derive(Debug, Clone)]
pub struct LogLine {
    pub timestamp: DateTime<Local>,
    pub frame: u64,
    pub text: String,
}

/// Bounded log of what a replay did, oldest lines dropped first.
#[derive(Debug, Clone)]
pub struct ReplayLog {
    pub lines: Vec<LogLine>,
    dropped: usize,
    max_lines: usize,
}

impl ReplayLog {
    pub fn new(max_lines: usize) -> Self {
        Self {
            lines: Vec::new(),
            dropped: 0,
            max_lines,
        }
    }

    pub fn push(&mut self, frame: u64, text: String) {
        if self.lines.len() >= self.max_lines {
            self.lines.remove(0);
            self.dropped += 1;
        }
        self.lines.push(LogLine {
            timestamp: Local::now(),
            frame,
            text,
        });
    }

    /// Lines that fell off the front.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.dropped > 0 {
            out.push_str(&format!("... {} earlier lines dropped\n", self.dropped));
        }
        for line in &self.lines {
            out.push_str(&format!(
                "{} [frame {:>5}] {}\n",
                line.timestamp.format("%H:%M:%S%.3f"),
                line.frame,
                line.text
            ));
        }
        out
    }
}
