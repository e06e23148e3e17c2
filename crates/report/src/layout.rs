//! Column layout of report summaries.
//!
//! Each record renders as `input->name->output`, once from the expected
//! side and once from the actual side. Column widths are shared by both
//! sides so that rows which agree render identically.

use pcond_core::{RecordValue, TraceRecord};

const INDENT: &str = "  ";

struct Row {
    input: String,
    name: String,
    output: String,
}

/// Renders the expected-side and actual-side lines for `records`.
/// `markers[i]` is the detail index shown after row `i`'s output.
pub fn render(
    records: &[TraceRecord],
    markers: &[Option<usize>],
    max_len: usize,
) -> (Vec<String>, Vec<String>) {
    let base = records.iter().map(|r| r.nesting_level).min().unwrap_or(0);
    let expected = rows(records, markers, base, max_len, |r| {
        (&r.input_for_expected, &r.output_for_expected)
    });
    let actual = rows(records, markers, base, max_len, |r| {
        (&r.input_for_actual, &r.output_for_actual)
    });

    let input_width = expected
        .iter()
        .chain(&actual)
        .map(|r| r.input.chars().count())
        .max()
        .unwrap_or(0);
    let name_width = expected
        .iter()
        .chain(&actual)
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0);

    (
        lines(&expected, input_width, name_width),
        lines(&actual, input_width, name_width),
    )
}

fn rows<F>(
    records: &[TraceRecord],
    markers: &[Option<usize>],
    base: usize,
    max_len: usize,
    side: F,
) -> Vec<Row>
where
    F: Fn(&TraceRecord) -> (&RecordValue, &RecordValue),
{
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let (input, output) = side(record);
            let mut output = output.summarize(max_len);
            if let Some(Some(index)) = markers.get(i) {
                output.push_str(&format!(" [{}]", index));
            }
            Row {
                input: input.summarize(max_len),
                name: format!(
                    "{}{}",
                    INDENT.repeat(record.nesting_level.saturating_sub(base)),
                    record.form_name
                ),
                output,
            }
        })
        .collect()
}

fn lines(rows: &[Row], input_width: usize, name_width: usize) -> Vec<String> {
    let mut previous_input: Option<&str> = None;
    rows.iter()
        .map(|row| {
            // Repeated inputs are left blank to keep long chains readable.
            let input = if previous_input == Some(row.input.as_str()) {
                ""
            } else {
                row.input.as_str()
            };
            previous_input = Some(row.input.as_str());
            format!(
                "{:<iw$}->{:<nw$}->{}",
                input,
                row.name,
                row.output,
                iw = input_width,
                nw = name_width
            )
            .trim_end()
            .to_string()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pcond_core::{RecordKind, Value};

    fn leaf(name: &str, level: usize, input: i64, expected: bool, actual: bool) -> TraceRecord {
        TraceRecord {
            form_name: name.to_string(),
            nesting_level: level,
            kind: RecordKind::Leaf,
            continued: false,
            input_for_expected: RecordValue::Value(Value::Int(input)),
            input_for_actual: RecordValue::Value(Value::Int(input)),
            output_for_expected: RecordValue::Value(Value::Bool(expected)),
            output_for_actual: RecordValue::Value(Value::Bool(actual)),
            detail_expected: None,
            detail_actual: None,
            requires_explanation: false,
            squashable: false,
            ignored: false,
        }
    }

    #[test]
    fn repeated_inputs_are_blanked() {
        let records = vec![
            leaf("a", 0, 1, true, true),
            leaf("b", 1, 1, true, false),
            leaf("c", 1, 22, true, true),
        ];
        let (expected, actual) = render(&records, &[None, None, None], 80);
        assert_eq!(expected, vec!["1 ->a  ->true", "  ->  b->true", "22->  c->true"]);
        assert_eq!(actual, vec!["1 ->a  ->true", "  ->  b->false", "22->  c->true"]);
    }

    #[test]
    fn indentation_is_relative_to_shallowest_row() {
        let records = vec![leaf("a", 2, 1, true, true), leaf("b", 3, 1, true, true)];
        let (expected, _) = render(&records, &[None, None], 80);
        assert_eq!(expected, vec!["1->a  ->true", " ->  b->true"]);
    }

    #[test]
    fn markers_follow_output() {
        let records = vec![leaf("a", 0, 1, true, false)];
        let (expected, actual) = render(&records, &[Some(0)], 80);
        assert_eq!(expected, vec!["1->a->true [0]"]);
        assert_eq!(actual, vec!["1->a->false [0]"]);
    }
}
