//! Text measurement for the builtin Helvetica faces.
//!
//! Job cards are drawn with the PDF base-14 fonts only, so there are no
//! font files to parse. Widths use an average-advance heuristic which is
//! close enough for wrapping and right-alignment.

/// Metrics for one builtin face family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontMetrics {
    /// Average advance per character as a fraction of the font size.
    pub avg_advance: f32,
    /// Same, for the bold face (~10 % wider).
    pub avg_advance_bold: f32,
    /// Line height as a multiple of the font size.
    pub line_height_factor: f32,
}

impl Default for FontMetrics {
    fn default() -> Self {
        Self::HELVETICA
    }
}

impl FontMetrics {
    pub const HELVETICA: FontMetrics = FontMetrics {
        avg_advance: 0.5,
        avg_advance_bold: 0.55,
        line_height_factor: 1.2,
    };

    pub fn measure_text_width(&self, text: &str, font_size: f32, bold: bool) -> f32 {
        let avg = if bold {
            self.avg_advance_bold
        } else {
            self.avg_advance
        };
        text.chars().count() as f32 * font_size * avg
    }

    pub fn line_height(&self, font_size: f32) -> f32 {
        font_size * self.line_height_factor
    }

    /// Height taken by `lines` lines of text.
    pub fn block_height(&self, lines: usize, font_size: f32) -> f32 {
        lines as f32 * self.line_height(font_size)
    }
}

/// Word-wrap text to fit within `max_width` points. Existing newlines are
/// kept as paragraph breaks. Never returns an empty vec.
pub fn wrap_text(
    text: &str,
    font_size: f32,
    bold: bool,
    max_width: f32,
    metrics: &FontMetrics,
) -> Vec<String> {
    if max_width <= 0.0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.lines() {
        let words: Vec<&str> = paragraph.split_whitespace().collect();
        if words.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current_line = String::new();
        for word in &words {
            if metrics.measure_text_width(word, font_size, bold) > max_width {
                // Hard-break words that cannot fit on any line.
                if !current_line.is_empty() {
                    lines.push(std::mem::take(&mut current_line));
                }
                let mut pieces = break_word(word, font_size, bold, max_width, metrics);
                current_line = pieces.pop().unwrap_or_default();
                lines.extend(pieces);
                continue;
            }
            let candidate = if current_line.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current_line, word)
            };
            let w = metrics.measure_text_width(&candidate, font_size, bold);
            if w > max_width && !current_line.is_empty() {
                lines.push(current_line);
                current_line = word.to_string();
            } else {
                current_line = candidate;
            }
        }
        if !current_line.is_empty() {
            lines.push(current_line);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// Split one word into chunks no wider than `max_width`, at least one
/// character each.
fn break_word(word: &str, font_size: f32, bold: bool, max_width: f32, metrics: &FontMetrics) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for c in word.chars() {
        current.push(c);
        if current.chars().count() > 1
            && metrics.measure_text_width(&current, font_size, bold) > max_width
        {
            current.pop();
            pieces.push(std::mem::replace(&mut current, c.to_string()));
        }
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}
