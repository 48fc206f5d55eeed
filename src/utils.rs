use unicode_width::UnicodeWidthStr;

/// Pads `s` with spaces to `field_cells` terminal columns.
pub fn pad_cells(s: &str, field_cells: usize) -> String {
    let w = s.width();
    let pad = field_cells.saturating_sub(w);
    format!("{s}{}", " ".repeat(pad))
}

/// Forces emoji presentation unless the sequence already selects it.
pub fn emoji_presentation(s: &str) -> String {
    if s.chars().any(|c| c == '\u{FE0F}' || c == '\u{200D}') {
        s.to_string()
    } else {
        format!("{s}\u{FE0F}")
    }
}

pub fn format_emoji(emoji: &str, field_cells: usize) -> String {
    pad_cells(&emoji_presentation(emoji), field_cells)
}

pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

/// Renders rows as left-aligned columns sized to their widest cell.
pub fn render_table(header: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.width());
            }
        }
    }

    let render_row = |cells: Vec<&str>| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| pad_cells(cell, w))
            .collect();
        line.join("  ").trim_end().to_string()
    };

    let mut out = render_row(header.to_vec());
    for row in rows {
        out.push('\n');
        out.push_str(&render_row(row.iter().map(String::as_str).collect()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_cells_counts_columns() {
        assert_eq!(pad_cells("d6", 4), "d6  ");
        assert_eq!(pad_cells("d100", 2), "d100");
        // wide glyph takes two columns
        assert_eq!(pad_cells("🎲", 3), "🎲 ");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.125), "12.5%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn test_render_table() {
        let rows = vec![
            vec!["d6".to_string(), "2".to_string()],
            vec!["d20".to_string(), "15".to_string()],
        ];
        let table = render_table(&["Die", "Rolls"], &rows);
        assert_eq!(table, "Die  Rolls\nd6   2\nd20  15");
    }
}
