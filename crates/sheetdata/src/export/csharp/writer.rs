//! Indented line writer for generated C#.

/// Accumulates tab-indented lines with brace scopes.
#[derive(Debug, Default)]
pub struct CodeWriter {
    text: String,
    depth: usize,
}

impl CodeWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one indented line.
    pub fn line(&mut self, line: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.text.push('\t');
        }
        self.text.push_str(line.as_ref());
        self.text.push('\n');
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.text.push('\n');
    }

    /// Write `header`, then `body` inside braces one level deeper.
    pub fn scope(&mut self, header: impl AsRef<str>, body: impl FnOnce(&mut Self)) {
        self.line(header);
        self.line("{");
        self.depth += 1;
        body(self);
        self.depth -= 1;
        self.line("}");
    }

    /// Like [`scope`](Self::scope), but writes `body` directly when there is
    /// no header.
    pub fn optional_scope(&mut self, header: Option<String>, body: impl FnOnce(&mut Self)) {
        match header {
            Some(header) => self.scope(header, body),
            None => body(self),
        }
    }

    /// Write a `<summary>` doc comment, one line per text line.
    pub fn summary(&mut self, text: &str) {
        self.line("/// <summary>");
        for line in text.lines() {
            self.line(format!("/// {}", line.trim_end()));
        }
        self.line("/// </summary>");
    }

    /// Write a single-line `<summary>` doc comment for a member.
    pub fn member_summary(&mut self, text: Option<&str>) {
        if let Some(text) = text {
            let text = text.lines().collect::<Vec<_>>().join(" ");
            self.line(format!("/// <summary> {} </summary>", text.trim()));
        }
    }

    pub fn finish(self) -> String {
        self.text
    }
}
