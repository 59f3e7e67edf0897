use crate::db::TableData;

fn width(text: &str) -> usize {
    text.chars().count()
}

fn rule(widths: &[usize], left: char, fill: char, join: char, right: char) -> String {
    let mut line = String::new();
    line.push(left);
    for (i, w) in widths.iter().enumerate() {
        if i > 0 {
            line.push(join);
        }
        line.extend(std::iter::repeat(fill).take(w + 2));
    }
    line.push(right);
    line
}

fn cells(values: &[String], widths: &[usize]) -> String {
    let mut line = String::from("│");
    for (i, w) in widths.iter().enumerate() {
        let value = values.get(i).map(String::as_str).unwrap_or("");
        let pad = w - width(value);
        line.push(' ');
        line.push_str(value);
        line.extend(std::iter::repeat(' ').take(pad + 1));
        line.push('│');
    }
    line
}

pub fn render_grid(data: &TableData) -> Vec<String> {
    let column_count = data
        .rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(data.columns.len()))
        .max()
        .unwrap_or(0);
    if column_count == 0 {
        return Vec::new();
    }

    let mut widths = vec![0usize; column_count];
    for row in std::iter::once(&data.columns).chain(data.rows.iter()) {
        for (i, value) in row.iter().enumerate() {
            widths[i] = widths[i].max(width(value));
        }
    }

    let mut lines = vec![rule(&widths, '╒', '═', '╤', '╕')];
    lines.push(cells(&data.columns, &widths));
    lines.push(rule(&widths, '╞', '═', '╪', '╡'));
    for (i, row) in data.rows.iter().enumerate() {
        if i > 0 {
            lines.push(rule(&widths, '├', '─', '┼', '┤'));
        }
        lines.push(cells(row, &widths));
    }
    lines.push(rule(&widths, '╘', '═', '╧', '╛'));
    lines
}
