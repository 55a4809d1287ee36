//! Fixed-width text table rows for the collected summary files.

/// Column width each cell is padded or truncated to.
pub const COL_WIDTH: usize = 10;

const SEP: &str = "  ";

/// Renders a float with one decimal place, ready for [`format_row`].
pub fn float_cell(value: f64) -> String {
    format!("{value:.1}")
}

/// One space-padded table row, newline-terminated. Cells are left-justified
/// and hard-truncated at [`COL_WIDTH`] characters.
pub fn format_row(cells: &[String]) -> String {
    let mut row = String::new();
    for (idx, cell) in cells.iter().enumerate() {
        if idx > 0 {
            row.push_str(SEP);
        }
        let truncated: String = cell.chars().take(COL_WIDTH).collect();
        row.push_str(&format!("{truncated:<width$}", width = COL_WIDTH));
    }
    row.push('\n');
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pads_and_joins() {
        let row = format_row(&cells(&["A2C", "91.0"]));
        assert_eq!(row, "A2C         91.0      \n");
    }

    #[test]
    fn truncates_long_cells() {
        let row = format_row(&cells(&["a_very_long_class_name"]));
        assert_eq!(row, "a_very_lon\n");
    }

    #[test]
    fn one_decimal_floats() {
        assert_eq!(float_cell(91.0), "91.0");
        assert_eq!(float_cell(91.25), "91.2");
        assert_eq!(float_cell(90.96), "91.0");
    }
}
