// Primitives for reading CSV files.

use crate::survey::{io_common::select_question_columns, *};

/// Reads the question columns of a CSV export.
///
/// The first row holds the text of the questions. Every other row is a
/// respondent. Rows shorter than the header are padded with empty cells.
pub fn read_csv_columns(path: &str, source: &SurveySource) -> SurveyResult<Vec<ParsedColumn>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(OpeningCsvSnafu { path })?;

    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvHeaderSnafu { path })?
        .iter()
        .map(|s| {
            if s.trim().is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        })
        .collect();
    debug!("read_csv_columns: header: {:?}", header);

    let columns = select_question_columns(&header, source)?;
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); columns.len()];

    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_columns: lineno: {:?} row: {:?}", lineno, line);
        for (pos, (col_idx, _)) in columns.iter().enumerate() {
            cells[pos].push(line.get(*col_idx).unwrap_or("").to_string());
        }
    }

    Ok(columns
        .into_iter()
        .zip(cells.into_iter())
        .map(|((_, question), cells)| ParsedColumn { question, cells })
        .collect())
}
