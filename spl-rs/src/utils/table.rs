//! Table formatting utilities

use prettytable::{Cell, Row, Table, format::consts::FORMAT_NO_LINESEP_WITH_TITLE};

/// Create a table with bold column titles
pub fn create_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers
            .iter()
            .map(|h| Cell::new(h).style_spec("b"))
            .collect(),
    ));
    table
}

/// Append a row of displayable cells
pub fn add_table_row<I, T>(table: &mut Table, cells: I)
where
    I: IntoIterator<Item = T>,
    T: ToString,
{
    table.add_row(Row::new(
        cells
            .into_iter()
            .map(|c| Cell::new(&c.to_string()))
            .collect(),
    ));
}

/// Two-column property/value table
pub fn key_value_table(rows: &[(&str, String)]) -> Table {
    let mut table = create_table(&["Property", "Value"]);
    for (key, value) in rows {
        table.add_row(Row::new(vec![
            Cell::new(key).style_spec("b"),
            Cell::new(value),
        ]));
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_accept_mixed_cells() {
        let mut table = create_table(&["#", "Name"]);
        add_table_row(&mut table, [1.to_string(), "spark".to_string()]);
        add_table_row(&mut table, [2, 3]);
        assert_eq!(table.len(), 2);
        let cell = table.get_row(1).and_then(|row| row.get_cell(1));
        assert_eq!(cell.map(Cell::get_content), Some("3".to_string()));
    }

    #[test]
    fn test_key_value_table() {
        let table = key_value_table(&[("Emissions", "5".to_string())]);
        assert_eq!(table.len(), 1);
    }
}
