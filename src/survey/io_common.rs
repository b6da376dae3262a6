use std::collections::HashMap;
use std::path::Path;

use crate::survey::*;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

/// A file name derived from the text of a question.
pub fn clean_question_name(question: &str) -> String {
    question
        .replace(':', "_")
        .replace('?', "")
        .replace(' ', "_")
        .chars()
        .take(50)
        .collect()
}

/// Finds the columns that hold questions.
///
/// If the source lists questions, these columns are looked up by name in the
/// header. Otherwise every named column from the first question column on is used.
pub fn select_question_columns(
    header: &[Option<String>],
    source: &SurveySource,
) -> SurveyResult<Vec<(usize, String)>> {
    if let Some(questions) = source.questions.as_deref() {
        return get_col_index_mapping(questions, header);
    }
    let start = source.first_question_column_index()?;
    let res: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .skip(start)
        .filter_map(|(idx, h)| h.as_ref().map(|s| (idx, s.clone())))
        .collect();
    debug!("select_question_columns: start: {:?} columns: {:?}", start, res);
    ensure!(!res.is_empty(), NoQuestionsSnafu { index: start + 1 });
    Ok(res)
}

/// Given the header of a file (names of each of the columns), and the names of the questions,
/// finds the mapping from each question to a column index position.
pub fn get_col_index_mapping(
    req_col_names: &[String],
    header: &[Option<String>],
) -> SurveyResult<Vec<(usize, String)>> {
    let mut col_names: HashMap<String, usize> = HashMap::new();
    for (idx, x) in header.iter().enumerate() {
        if let Some(s) = x {
            // Keep the first column when a name is repeated.
            col_names.entry(s.clone()).or_insert(idx);
        }
    }

    debug!("get_col_index_mapping: col_names: {:?}", col_names);

    let mut col_indexes: Vec<(usize, String)> = Vec::new();
    for cname in req_col_names {
        let idx = col_names
            .get(cname)
            .context(MissingQuestionSnafu { question: cname })?;
        col_indexes.push((*idx, cname.clone()));
    }
    Ok(col_indexes)
}
