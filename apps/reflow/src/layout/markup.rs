/// Class on the wrapper span around each visual line.
pub const LINE_CLASS: &str = "text-line";

/// Explicit break between lines.
pub const LINE_BREAK: &str = "<br>";

/// Renders packed lines as `<span class="text-line">…</span>` fragments joined by `<br>`.
pub fn render_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(|line| format!("<span class=\"{LINE_CLASS}\">{}</span>", escape_html(line.as_ref())))
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
