// Primitives for reading Excel workbooks.

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::survey::{io_common::select_question_columns, *};

/// Reads the question columns of an Excel export.
///
/// The first row of the worksheet holds the text of the questions.
pub fn read_excel_columns(path: &str, source: &SurveySource) -> SurveyResult<Vec<ParsedColumn>> {
    let wrange = get_range(path, source)?;

    let mut rows = wrange.rows();
    let header_row = rows.next().context(EmptyExcelSnafu {})?;
    let header: Vec<Option<String>> = header_row
        .iter()
        .map(|dt| match dt {
            DataType::String(s) if !s.trim().is_empty() => Some(s.clone()),
            DataType::Int(i) => Some(i.to_string()),
            DataType::Float(f) => Some(f.to_string()),
            _ => None,
        })
        .collect();
    debug!("read_excel_columns: header: {:?}", header);

    let columns = select_question_columns(&header, source)?;
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); columns.len()];

    for (idx, row) in rows.enumerate() {
        // The header is row 1.
        let lineno = idx + 2;
        debug!("read_excel_columns: lineno: {:?} row: {:?}", lineno, row);
        for (pos, (col_idx, _)) in columns.iter().enumerate() {
            let cell = match row.get(*col_idx) {
                Some(dt) => read_cell(dt, lineno)?,
                None => String::new(),
            };
            cells[pos].push(cell);
        }
    }

    Ok(columns
        .into_iter()
        .zip(cells.into_iter())
        .map(|((_, question), cells)| ParsedColumn { question, cells })
        .collect())
}

fn read_cell(cell: &DataType, lineno: usize) -> SurveyResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Empty => Ok(String::new()),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Float(f) => Ok(f.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        DataType::Error(e) => {
            warn!(
                "read_cell: line {}: cell error {:?}, counted as no selection",
                lineno, e
            );
            Ok(String::new())
        }
        _ => ExcelWrongCellTypeSnafu {
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &str, source: &SurveySource) -> SurveyResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &source.excel_worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = source.excel_worksheet_name.as_deref() {
        workbook
            .worksheet_range(worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name,
            })?
            .context(OpeningExcelSnafu { path })
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyExcelSnafu {}.fail(),
            [(worksheet_name, wrange)] => {
                debug!("get_range: using the only worksheet {:?}", worksheet_name);
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu {
                names: all_worksheets
                    .iter()
                    .map(|(name, _)| name.clone())
                    .collect::<Vec<String>>()
                    .join(", "),
            }
            .fail(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_to_strings() {
        assert_eq!(read_cell(&DataType::String("Yes".to_string()), 2).unwrap(), "Yes");
        assert_eq!(read_cell(&DataType::Empty, 2).unwrap(), "");
        assert_eq!(read_cell(&DataType::Int(4), 2).unwrap(), "4");
        assert_eq!(read_cell(&DataType::Float(2.5), 2).unwrap(), "2.5");
        assert_eq!(read_cell(&DataType::Bool(true), 2).unwrap(), "true");
    }

    #[test]
    fn reads_worksheet_columns() {
        let path = format!(
            "{}/tests/data/meetings/meetings.xlsx",
            env!("CARGO_MANIFEST_DIR")
        );
        let source = SurveySource {
            provider: "xlsx".to_string(),
            file_path: path.clone(),
            first_question_column_index: Some(json!(3)),
            questions: None,
            no_selection_labels: None,
            excel_worksheet_name: Some("Responses".to_string()),
        };
        let cols = read_excel_columns(&path, &source).unwrap();
        let questions: Vec<&str> = cols.iter().map(|c| c.question.as_str()).collect();
        assert_eq!(
            questions,
            vec!["Adopt the new bylaws?", "Number of meetings per year"]
        );
        assert_eq!(cols[0].cells, vec!["Yes", "No", "Yes", "", "Yes"]);
        assert_eq!(cols[1].cells, vec!["4", "12", "4", "12", "NA"]);
    }

    #[test]
    fn missing_workbook() {
        let source = SurveySource {
            provider: "xlsx".to_string(),
            file_path: "missing.xlsx".to_string(),
            first_question_column_index: None,
            questions: None,
            no_selection_labels: None,
            excel_worksheet_name: None,
        };
        let res = read_excel_columns("/this/file/does/not/exist.xlsx", &source);
        assert!(matches!(res, Err(SurveyError::OpeningExcel { .. })));
    }
}
