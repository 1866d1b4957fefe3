//! Dataset Parser
//!
//! Turns raw delimited text into a feature matrix and label vector. The
//! rightmost column is always the label, whatever the header calls it, and
//! the header's own width is never consulted.

use csv::{ReaderBuilder, StringRecord, Trim};
use ml_benchmark_domain::{Dataset, FeatureMatrix, ParseError};
use tracing::{debug, instrument};

/// Parses delimited numeric tables.
#[derive(Debug, Clone, Copy)]
pub struct DatasetParser {
    delimiter: u8,
    has_header: bool,
}

impl Default for DatasetParser {
    fn default() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }
}

impl DatasetParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Whether the first row is a header to skip (default `true`).
    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    /// Parse raw bytes into `(X, y)`.
    ///
    /// Pure: the same bytes always produce the same dataset or error.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub fn parse(&self, bytes: &[u8]) -> Result<Dataset, ParseError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_header)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(bytes);

        if self.has_header {
            // Skipped outright; the first data row sets the table width
            let headers = reader.headers().map_err(|e| malformed(&e))?;
            debug!(fields = headers.len(), "Header skipped");
        }

        let mut n_columns: Option<usize> = None;
        let mut features = Vec::new();
        let mut labels = Vec::new();
        let mut record = StringRecord::new();

        loop {
            match reader.read_record(&mut record) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => return Err(malformed(&e)),
            }
            if is_blank(&record) {
                continue;
            }

            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let expected = *n_columns.get_or_insert(record.len());
            if expected < 2 {
                return Err(ParseError::InsufficientColumns { found: expected });
            }
            if record.len() != expected {
                return Err(ParseError::Malformed {
                    line,
                    reason: format!("expected {} fields, found {}", expected, record.len()),
                });
            }

            let label_index = expected - 1;
            for (column, cell) in record.iter().enumerate() {
                let value = parse_cell(cell, line, column + 1)?;
                if column == label_index {
                    labels.push(value);
                } else {
                    features.push(value);
                }
            }
        }

        if labels.is_empty() {
            return Err(ParseError::Empty);
        }

        let n_rows = labels.len();
        let n_features = n_columns.map(|n| n - 1).unwrap_or(0);
        let matrix = FeatureMatrix::new(n_rows, n_features, features).map_err(|e| {
            ParseError::Malformed {
                line: 0,
                reason: e.to_string(),
            }
        })?;
        let dataset = Dataset::new(matrix, labels).map_err(|e| ParseError::Malformed {
            line: 0,
            reason: e.to_string(),
        })?;

        debug!(rows = n_rows, features = n_features, "Dataset parsed");
        Ok(dataset)
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.len() <= 1 && record.iter().all(str::is_empty)
}

/// `column` is 1-based, matching how spreadsheets number columns.
fn parse_cell(cell: &str, line: u64, column: usize) -> Result<f64, ParseError> {
    if cell.is_empty() {
        return Err(ParseError::Malformed {
            line,
            reason: format!("column {column} is empty"),
        });
    }
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        Ok(_) => Err(ParseError::Malformed {
            line,
            reason: format!("column {column} is not a finite number: '{cell}'"),
        }),
        Err(_) => Err(ParseError::Malformed {
            line,
            reason: format!("column {column} is not numeric: '{cell}'"),
        }),
    }
}

fn malformed(err: &csv::Error) -> ParseError {
    let line = err.position().map(|p| p.line()).unwrap_or(0);
    let reason = match err.kind() {
        csv::ErrorKind::Utf8 { .. } => "invalid UTF-8".to_string(),
        _ => err.to_string(),
    };
    ParseError::Malformed { line, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Dataset, ParseError> {
        DatasetParser::new().parse(input.as_bytes())
    }

    #[test]
    fn test_last_column_is_label() {
        let ds = parse("a,b,target\n1,2,0\n3,4,1\n").unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.features.row(1), &[3.0, 4.0]);
        assert_eq!(ds.labels, vec![0.0, 1.0]);
    }

    #[test]
    fn test_header_names_are_ignored() {
        // A column called "label" that is not last is still a feature
        let ds = parse("label,x\n5,1\n").unwrap();
        assert_eq!(ds.features.row(0), &[5.0]);
        assert_eq!(ds.labels, vec![1.0]);
    }

    #[test]
    fn test_single_column_is_insufficient() {
        assert_eq!(
            parse("y\n0\n1\n").unwrap_err(),
            ParseError::InsufficientColumns { found: 1 }
        );
    }

    #[test]
    fn test_header_width_does_not_set_table_width() {
        let ds = parse("y\n1,2\n3,4\n").unwrap();
        assert_eq!(ds.n_features(), 1);
        assert_eq!(ds.labels, vec![2.0, 4.0]);

        let ds = parse("a,b,c,d\n1,0\n").unwrap();
        assert_eq!(ds.n_features(), 1);
    }

    #[test]
    fn test_rows_must_match_first_data_row() {
        let err = parse("y\n1,2\n1,2,3\n").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(parse("").unwrap_err(), ParseError::Empty);
        assert_eq!(parse("x,y\n").unwrap_err(), ParseError::Empty);
        assert_eq!(parse("x,y\n\n\n").unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn test_non_numeric_cell_reports_line() {
        let err = parse("x,y\n1,0\nabc,1\n").unwrap_err();
        match err {
            ParseError::Malformed { line, reason } => {
                assert_eq!(line, 3);
                assert!(reason.contains("abc"), "{reason}");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_non_finite_values_are_malformed() {
        assert!(matches!(parse("x,y\nNaN,0\n"), Err(ParseError::Malformed { .. })));
        assert!(matches!(parse("x,y\n1,inf\n"), Err(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_ragged_row_is_malformed() {
        let err = parse("x1,x2,y\n1,2,0\n1,2\n").unwrap_err();
        assert!(matches!(err, ParseError::Malformed { line: 3, .. }), "{err:?}");
    }

    #[test]
    fn test_empty_cell_is_malformed() {
        assert!(matches!(parse("x,y\n,1\n"), Err(ParseError::Malformed { .. })));
    }

    #[test]
    fn test_whitespace_and_blank_lines_are_tolerated() {
        let ds = parse("x , y\n 1.5 , 0 \n\n-2e3,1\n").unwrap();
        assert_eq!(ds.features.row(0), &[1.5]);
        assert_eq!(ds.features.row(1), &[-2000.0]);
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let bytes = b"x,y\n1,\xff\n";
        assert!(matches!(
            DatasetParser::new().parse(bytes),
            Err(ParseError::Malformed { .. })
        ));
    }

    #[test]
    fn test_custom_delimiter_without_header() {
        let ds = DatasetParser::new()
            .with_delimiter(b';')
            .with_header(false)
            .parse(b"1;2;1\n3;4;0\n")
            .unwrap();
        assert_eq!(ds.n_rows(), 2);
        assert_eq!(ds.labels, vec![1.0, 0.0]);
    }
}
