use log::{debug, info, warn};

use snafu::{prelude::*, Snafu};
use survey_votes::builder::Builder;
use survey_votes::*;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::survey::config_reader::*;

mod io_common;
mod io_csv;
mod io_excel;

#[derive(Debug, Snafu)]
pub enum SurveyError {
    #[snafu(display("Error opening file {path}"))]
    OpeningCsv { source: csv::Error, path: String },
    #[snafu(display("Error reading the header of {path}"))]
    CsvHeader { source: csv::Error, path: String },
    #[snafu(display("Error reading line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook or the worksheet is empty"))]
    EmptyExcel {},
    #[snafu(display("Cannot find the worksheet {name}"))]
    MissingWorksheet { name: String },
    #[snafu(display(
        "The workbook has several worksheets ({names}), the worksheet name must be provided"
    ))]
    AmbiguousWorksheet { names: String },
    #[snafu(display("Line {lineno}: could not understand cell {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Expected a number, found {content}"))]
    ParsingJsonNumber { content: String },
    #[snafu(display("Cannot find the directory of the configuration file"))]
    MissingParentDir {},
    #[snafu(display("No input file: use --input or --config"))]
    MissingInput {},
    #[snafu(display("Provider not implemented: {provider}"))]
    UnknownProvider { provider: String },
    #[snafu(display("The first question column starts at 1, but it was {index}"))]
    InvalidFirstColumn { index: usize },
    #[snafu(display("Cannot find the question {question:?} in the header"))]
    MissingQuestion { question: String },
    #[snafu(display("No question found from column {index} on"))]
    NoQuestions { index: usize },
    #[snafu(display("Cannot allocate the votes of question {question:?}"))]
    Allocation {
        source: AllocationErrors,
        question: String,
    },
    #[snafu(display("Error writing {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Difference detected between computed summary and reference summary"))]
    ReferenceMismatch {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type SurveyResult<T> = Result<T, SurveyError>;

/// The default position (starting at 1) of the first question. The columns
/// before it describe the respondent.
pub const DEFAULT_FIRST_QUESTION_COLUMN: usize = 4;

pub mod config_reader {
    use crate::survey::*;

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
    pub struct OutputSettings {
        #[serde(rename = "surveyName")]
        pub survey_name: Option<String>,
        #[serde(rename = "outputDirectory")]
        pub output_directory: Option<String>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct OutputConfig {
        pub survey: String,
        #[serde(rename = "totalVotes")]
        pub total_votes: u32,
        #[serde(rename = "tiebreakMode")]
        pub tiebreak_mode: String,
        #[serde(rename = "randomSeed", skip_serializing_if = "Option::is_none")]
        pub random_seed: Option<u32>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct SurveySource {
        pub provider: String,
        #[serde(rename = "filePath")]
        pub file_path: String,
        #[serde(rename = "firstQuestionColumnIndex")]
        pub first_question_column_index: Option<JSValue>,
        pub questions: Option<Vec<String>>,
        #[serde(rename = "noSelectionLabels")]
        pub no_selection_labels: Option<Vec<String>>,
        #[serde(rename = "excelWorksheetName")]
        pub excel_worksheet_name: Option<String>,
    }

    impl SurveySource {
        /// The position of the first question, starting at 0.
        pub fn first_question_column_index(&self) -> SurveyResult<usize> {
            let x = read_js_int(&self.first_question_column_index)?
                .unwrap_or(DEFAULT_FIRST_QUESTION_COLUMN);
            ensure!(x >= 1, InvalidFirstColumnSnafu { index: x });
            Ok(x - 1)
        }
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
    pub struct SurveyRules {
        #[serde(rename = "totalVotes")]
        pub total_votes: Option<u32>,
        #[serde(rename = "tiebreakMode")]
        pub tiebreak_mode: Option<String>,
        #[serde(rename = "randomSeed")]
        pub random_seed: Option<JSValue>,
    }

    #[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
    pub struct SurveyConfig {
        #[serde(rename = "outputSettings", default)]
        pub output_settings: OutputSettings,
        #[serde(rename = "surveySource")]
        pub survey_source: SurveySource,
        #[serde(default)]
        pub rules: SurveyRules,
    }

    /// Reads a configuration file.
    ///
    /// The paths of the configuration are relative to the directory of the file.
    /// They are returned resolved against it.
    pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
        let config_str = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
        let mut config: SurveyConfig =
            serde_json::from_str(&config_str).context(ParsingJsonSnafu {})?;
        debug!("read_config: {:?}", config);

        let root_p = Path::new(path).parent().context(MissingParentDirSnafu {})?;
        config.survey_source.file_path = resolve(root_p, &config.survey_source.file_path);
        config.output_settings.output_directory = config
            .output_settings
            .output_directory
            .map(|d| resolve(root_p, &d));
        Ok(config)
    }

    fn resolve(root: &Path, p: &str) -> String {
        let full: PathBuf = root.join(p);
        full.display().to_string()
    }

    pub fn read_summary(path: String) -> SurveyResult<JSValue> {
        let contents = fs::read_to_string(&path).context(OpeningJsonSnafu { path })?;
        debug!("read_summary: content: {:?}", contents);
        let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
        Ok(js)
    }

    pub fn read_js_int(x: &Option<JSValue>) -> SurveyResult<Option<usize>> {
        match x {
            None | Some(JSValue::Null) => Ok(None),
            Some(JSValue::Number(n)) => n
                .as_u64()
                .map(|x| Some(x as usize))
                .context(ParsingJsonNumberSnafu {
                    content: n.to_string(),
                }),
            Some(JSValue::String(s)) => s
                .trim()
                .parse::<usize>()
                .ok()
                .map(Some)
                .context(ParsingJsonNumberSnafu { content: s }),
            Some(v) => ParsingJsonNumberSnafu {
                content: v.to_string(),
            }
            .fail(),
        }
    }
}

/// The raw content of one question, as read from the input.
/// This is before recognizing the missing values.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedColumn {
    pub question: String,
    pub cells: Vec<String>,
}

/// The outcome for one question.
#[derive(PartialEq, Debug, Clone)]
pub struct QuestionSummary {
    pub question: String,
    pub distribution: Distribution,
    pub allocation: VoteAllocation,
}

fn read_survey_data(source: &SurveySource) -> SurveyResult<Vec<ParsedColumn>> {
    let path = source.file_path.as_str();
    info!("Attempting to read survey file {:?}", path);
    match source.provider.as_str() {
        "csv" => io_csv::read_csv_columns(path, source),
        "xlsx" | "excel" => io_excel::read_excel_columns(path, source),
        x => UnknownProviderSnafu { provider: x }.fail(),
    }
}

fn validate_rules(rules: &SurveyRules) -> SurveyResult<AllocationRules> {
    let total_votes = rules
        .total_votes
        .unwrap_or(AllocationRules::DEFAULT_TOTAL_VOTES);
    if total_votes < 1 {
        whatever!("totalVotes must be at least 1, but it was {}", total_votes)
    }
    let tiebreak_mode = match rules.tiebreak_mode.as_deref() {
        None | Some("firstAppearance") => TieBreakMode::FirstAppearance,
        Some("lexicographic") => TieBreakMode::Lexicographic,
        Some("random") => {
            let seed = match read_js_int(&rules.random_seed)?.map(u32::try_from) {
                Some(Ok(x)) => x,
                x => {
                    whatever!(
                        "The random tiebreak mode needs a randomSeed between 0 and {}, found {:?}",
                        u32::MAX,
                        x
                    )
                }
            };
            TieBreakMode::Random(seed)
        }
        Some(x) => {
            whatever!(
                "Cannot use tiebreak mode {:?} (currently not implemented)",
                x
            )
        }
    };
    Ok(AllocationRules {
        total_votes,
        tiebreak_mode,
    })
}

fn tiebreak_mode_name(mode: TieBreakMode) -> (String, Option<u32>) {
    match mode {
        TieBreakMode::FirstAppearance => ("firstAppearance".to_string(), None),
        TieBreakMode::Lexicographic => ("lexicographic".to_string(), None),
        TieBreakMode::Random(seed) => ("random".to_string(), Some(seed)),
    }
}

fn analyze_question(
    column: &ParsedColumn,
    source: &SurveySource,
    rules: &AllocationRules,
) -> SurveyResult<Option<QuestionSummary>> {
    let question = column.question.as_str();
    let mut builder = Builder::new(rules).context(AllocationSnafu { question })?;
    if let Some(labels) = source.no_selection_labels.as_deref() {
        builder = builder.no_selection_labels(labels);
    }
    for cell in column.cells.iter() {
        builder.add_response(cell);
    }

    let distribution = builder.distribution();
    let allocation = match builder.allocate().context(AllocationSnafu { question })? {
        Some(a) => a,
        None => {
            warn!(
                "analyze_question: no valid responses for {:?} ({} without selection), skipping",
                question, distribution.no_selection
            );
            return Ok(None);
        }
    };
    debug!(
        "analyze_question: {:?}: {:?} {:?}",
        question, distribution, allocation.votes
    );
    Ok(Some(QuestionSummary {
        question: column.question.clone(),
        distribution,
        allocation,
    }))
}

fn format_question_report(s: &QuestionSummary) -> String {
    let mut lines: Vec<String> = vec![
        format!("  Total valid responses: {}", s.distribution.total_present),
        format!("  'No Selection' responses: {}", s.distribution.no_selection),
        "  Response percentages:".to_string(),
    ];
    for (answer, pct) in s.distribution.sorted_percentages() {
        lines.push(format!("    {}: {:.1}%", answer, pct));
    }
    lines.push(format!("  {}-vote allocation:", s.allocation.total_votes));
    for (answer, votes) in s.allocation.sorted_nonzero() {
        lines.push(format!("    {}: {} vote(s)", answer, votes));
    }
    lines.join("\n")
}

fn write_question_report(dir: &Path, s: &QuestionSummary) -> SurveyResult<PathBuf> {
    let p = dir.join(format!("{}.txt", io_common::clean_question_name(&s.question)));
    let contents = format!(
        "{}\n\n{}\n\n{}\n",
        s.question,
        format_question_report(s),
        s.allocation.calculation_text()
    );
    fs::write(&p, contents).context(WritingOutputSnafu {
        path: p.display().to_string(),
    })?;
    Ok(p)
}

fn result_stats_to_json(results: &[QuestionSummary]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for s in results.iter() {
        let tally: Vec<JSValue> = s
            .distribution
            .tally
            .iter()
            .zip(s.distribution.percentages.iter())
            .map(|((answer, count), (_, pct))| {
                json!({"answer": answer, "count": count, "percentage": pct})
            })
            .collect();
        let allocation: Vec<JSValue> = s
            .allocation
            .votes
            .iter()
            .map(|(answer, votes)| json!({"answer": answer, "votes": votes}))
            .collect();
        l.push(json!({
            "question": s.question,
            "totalResponses": s.distribution.total_present,
            "noSelection": s.distribution.no_selection,
            "tally": tally,
            "allocation": allocation
        }));
    }
    l
}

fn build_summary_js(
    config: &SurveyConfig,
    rules: &AllocationRules,
    results: &[QuestionSummary],
) -> JSValue {
    let (tiebreak_mode, random_seed) = tiebreak_mode_name(rules.tiebreak_mode);
    let c = OutputConfig {
        survey: config
            .output_settings
            .survey_name
            .clone()
            .unwrap_or_else(|| io_common::simplify_file_name(&config.survey_source.file_path)),
        total_votes: rules.total_votes,
        tiebreak_mode,
        random_seed,
    };
    json!({
        "config": c,
        "results": result_stats_to_json(results) })
}

/// Builds the configuration from the command line, on top of the configuration file if any.
pub fn build_config(args: &Args) -> SurveyResult<SurveyConfig> {
    let mut config = match args.config.as_deref() {
        Some(config_path) => read_config(config_path)?,
        None => {
            let input = args.input.clone().context(MissingInputSnafu {})?;
            SurveyConfig {
                output_settings: OutputSettings::default(),
                survey_source: SurveySource {
                    provider: "csv".to_string(),
                    file_path: input,
                    first_question_column_index: None,
                    questions: None,
                    no_selection_labels: None,
                    excel_worksheet_name: None,
                },
                rules: SurveyRules::default(),
            }
        }
    };

    if let Some(input) = args.input.clone() {
        config.survey_source.file_path = input;
        if args.input_type.is_none() && args.config.is_none() {
            let is_excel = config.survey_source.file_path.ends_with(".xlsx");
            config.survey_source.provider = if is_excel { "xlsx" } else { "csv" }.to_string();
        }
    }
    if let Some(input_type) = args.input_type.clone() {
        config.survey_source.provider = input_type;
    }
    if let Some(dir) = args.output_dir.clone() {
        config.output_settings.output_directory = Some(dir);
    }
    if let Some(questions) = args.questions.clone() {
        config.survey_source.questions = Some(questions);
    }
    if let Some(col) = args.first_question_column {
        config.survey_source.first_question_column_index = Some(json!(col));
    }
    if let Some(name) = args.excel_worksheet_name.clone() {
        config.survey_source.excel_worksheet_name = Some(name);
    }
    if let Some(total_votes) = args.total_votes {
        config.rules.total_votes = Some(total_votes);
    }
    if let Some(mode) = args.tiebreak_mode.clone() {
        config.rules.tiebreak_mode = Some(mode);
    }
    if let Some(seed) = args.random_seed {
        config.rules.random_seed = Some(json!(seed));
    }
    Ok(config)
}

pub fn run_survey_from_args(args: &Args) -> SurveyResult<Vec<QuestionSummary>> {
    let config = build_config(args)?;
    run_survey(&config, args.reference.clone(), args.out.clone())
}

/// Analyzes every question of the survey.
///
/// Arguments:
/// * `config` the survey to read and the rules to apply
/// * `check_summary_path` a reference summary. If the computed summary differs, the
/// differences are printed and an error is returned.
/// * `out` where to write the summary in JSON: a file path or `stdout`.
pub fn run_survey(
    config: &SurveyConfig,
    check_summary_path: Option<String>,
    out: Option<String>,
) -> SurveyResult<Vec<QuestionSummary>> {
    info!("config: {:?}", config);

    // Validate the rules:
    let rules = validate_rules(&config.rules)?;

    let source = &config.survey_source;
    println!("Processing survey data from: {}", source.file_path);
    let columns = read_survey_data(source)?;

    let output_dir: Option<PathBuf> = config
        .output_settings
        .output_directory
        .as_ref()
        .map(PathBuf::from);
    if let Some(dir) = output_dir.as_ref() {
        println!("Results will be saved to: {}", dir.display());
        fs::create_dir_all(dir).context(WritingOutputSnafu {
            path: dir.display().to_string(),
        })?;
    }

    let mut results: Vec<QuestionSummary> = Vec::new();
    for column in columns.iter() {
        println!("\nAnalyzing question: {}", column.question);
        let summary = match analyze_question(column, source, &rules)? {
            Some(s) => s,
            None => {
                println!("  No valid responses for this question.");
                continue;
            }
        };
        println!("{}", format_question_report(&summary));
        if let Some(dir) = output_dir.as_ref() {
            let p = write_question_report(dir, &summary)?;
            info!("Wrote calculation of {:?} to {:?}", summary.question, p);
        }
        results.push(summary);
    }

    // Assemble the final json
    let result_js = build_summary_js(config, &rules, &results);
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;

    match out.as_deref() {
        Some("stdout") => {
            println!("{}", pretty_js_stats);
        }
        Some(path) => {
            fs::write(path, &pretty_js_stats).context(WritingOutputSnafu { path })?;
            info!("Summary written to {:?}", path);
        }
        None => {
            debug!("summary: {}", pretty_js_stats);
        }
    }

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference string");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            return ReferenceMismatchSnafu {}.fail();
        }
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_path(test_name: &str, file_name: &str) -> String {
        format!(
            "{}/tests/data/{}/{}",
            env!("CARGO_MANIFEST_DIR"),
            test_name,
            file_name
        )
    }

    fn run_survey_test(test_name: &str) -> SurveyResult<Vec<QuestionSummary>> {
        let args = Args {
            config: Some(test_path(test_name, &format!("{}_config.json", test_name))),
            reference: Some(test_path(
                test_name,
                &format!("{}_expected_summary.json", test_name),
            )),
            ..Args::default()
        };
        run_survey_from_args(&args)
    }

    fn rules(tiebreak_mode: Option<&str>, seed: Option<JSValue>) -> SurveyRules {
        SurveyRules {
            total_votes: None,
            tiebreak_mode: tiebreak_mode.map(|s| s.to_string()),
            random_seed: seed,
        }
    }

    #[test]
    fn quarters() {
        let results = run_survey_test("quarters").unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn meetings_excel() {
        let results = run_survey_test("meetings").unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn excel_first_question_column_from_command_line() {
        let args = Args {
            input: Some(test_path("meetings", "meetings.xlsx")),
            excel_worksheet_name: Some("Responses".to_string()),
            first_question_column: Some(4),
            ..Args::default()
        };
        let results = run_survey_from_args(&args).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].question, "Number of meetings per year");
        assert_eq!(results[0].allocation.get("4"), Some(2));
        assert_eq!(results[0].allocation.get("12"), Some(1));
    }

    #[test]
    fn excel_with_several_worksheets_needs_a_name() {
        let args = Args {
            input: Some(test_path("meetings", "meetings.xlsx")),
            ..Args::default()
        };
        match run_survey_from_args(&args) {
            Err(SurveyError::AmbiguousWorksheet { names }) => {
                assert_eq!(names, "Responses, Notes");
            }
            x => panic!("unexpected result: {:?}", x),
        }
    }

    #[test]
    fn excel_unknown_worksheet() {
        let args = Args {
            input: Some(test_path("meetings", "meetings.xlsx")),
            excel_worksheet_name: Some("Summary".to_string()),
            ..Args::default()
        };
        assert!(matches!(
            run_survey_from_args(&args),
            Err(SurveyError::MissingWorksheet { .. })
        ));
    }

    #[test]
    fn reference_mismatch() {
        let args = Args {
            input: Some(test_path("council", "council.csv")),
            reference: Some(test_path("quarters", "quarters_expected_summary.json")),
            ..Args::default()
        };
        assert!(matches!(
            run_survey_from_args(&args),
            Err(SurveyError::ReferenceMismatch {})
        ));
    }

    #[test]
    fn quarters_from_command_line() {
        let args = Args {
            input: Some(test_path("quarters", "quarters.csv")),
            ..Args::default()
        };
        let results = run_survey_from_args(&args).unwrap();
        let q: Vec<&str> = results.iter().map(|s| s.question.as_str()).collect();
        assert_eq!(q, vec!["Adopt the new bylaws?", "Which day works best?"]);

        let bylaws = &results[0];
        assert_eq!(bylaws.distribution.total_present, 4);
        assert_eq!(bylaws.distribution.no_selection, 1);
        assert_eq!(bylaws.allocation.get("Yes"), Some(2));
        assert_eq!(bylaws.allocation.get("No"), Some(1));

        let day = &results[1];
        assert_eq!(day.allocation.get("Monday"), Some(2));
        assert_eq!(day.allocation.get("Tuesday"), Some(1));
    }

    #[test]
    fn council_with_config_and_overrides() {
        let out_dir = std::env::temp_dir().join("surveyvotes_council_reports");
        let summary_path = std::env::temp_dir().join("surveyvotes_council_summary.json");
        let args = Args {
            config: Some(test_path("council", "council_config.json")),
            output_dir: Some(out_dir.display().to_string()),
            out: Some(summary_path.display().to_string()),
            ..Args::default()
        };
        let results = run_survey_from_args(&args).unwrap();
        assert_eq!(results.len(), 2);

        // Tied 50/50 split of 5 votes, resolved in lexicographic order.
        let park = &results[0];
        assert_eq!(park.question, "Should the park be renovated?");
        assert_eq!(park.distribution.total_present, 4);
        assert_eq!(park.distribution.no_selection, 2);
        assert_eq!(park.allocation.get("No"), Some(3));
        assert_eq!(park.allocation.get("Yes"), Some(2));

        // "NA" is an answer: the configuration replaces the default markers.
        let budget = &results[1];
        assert_eq!(
            budget.distribution.tally,
            vec![
                ("Low".to_string(), 3),
                ("High".to_string(), 1),
                ("NA".to_string(), 1)
            ]
        );
        assert_eq!(budget.distribution.no_selection, 1);
        assert_eq!(
            budget.allocation.votes,
            vec![
                ("Low".to_string(), 3),
                ("High".to_string(), 1),
                ("NA".to_string(), 1)
            ]
        );

        let report = fs::read_to_string(out_dir.join("Preferred_budget__low_or_high.txt")).unwrap();
        assert!(report.starts_with("Preferred budget: low or high?"));
        assert!(report.contains("Final 5-vote allocation:"));
        assert!(out_dir.join("Should_the_park_be_renovated.txt").exists());

        let summary = read_summary(summary_path.display().to_string()).unwrap();
        assert_eq!(summary["config"]["survey"], json!("Park council survey"));
        assert_eq!(summary["config"]["tiebreakMode"], json!("lexicographic"));
        assert_eq!(summary["results"].as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn command_line_overrides_rules() {
        let args = Args {
            input: Some(test_path("quarters", "quarters.csv")),
            total_votes: Some(1),
            questions: Some(vec!["Which day works best?".to_string()]),
            tiebreak_mode: Some("lexicographic".to_string()),
            ..Args::default()
        };
        let results = run_survey_from_args(&args).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].allocation.get("Monday"), Some(1));
        assert_eq!(results[0].allocation.get("Tuesday"), Some(0));
    }

    #[test]
    fn missing_input() {
        assert!(matches!(
            run_survey_from_args(&Args::default()),
            Err(SurveyError::MissingInput {})
        ));
    }

    #[test]
    fn unknown_provider() {
        let args = Args {
            input: Some(test_path("quarters", "quarters.csv")),
            input_type: Some("parquet".to_string()),
            ..Args::default()
        };
        assert!(matches!(
            run_survey_from_args(&args),
            Err(SurveyError::UnknownProvider { .. })
        ));
    }

    #[test]
    fn validate_tiebreak_modes() {
        assert_eq!(
            validate_rules(&SurveyRules::default()).unwrap(),
            AllocationRules::DEFAULT_RULES
        );
        assert_eq!(
            validate_rules(&rules(Some("lexicographic"), None))
                .unwrap()
                .tiebreak_mode,
            TieBreakMode::Lexicographic
        );
        assert_eq!(
            validate_rules(&rules(Some("random"), Some(json!("17"))))
                .unwrap()
                .tiebreak_mode,
            TieBreakMode::Random(17)
        );
        assert!(validate_rules(&rules(Some("random"), None)).is_err());
        assert!(validate_rules(&rules(Some("coinFlip"), None)).is_err());

        let zero = SurveyRules {
            total_votes: Some(0),
            ..SurveyRules::default()
        };
        assert!(validate_rules(&zero).is_err());
    }

    #[test]
    fn report_text() {
        let column = ParsedColumn {
            question: "Adopt?".to_string(),
            cells: vec!["Yes", "No", "", "Yes", "Yes"]
                .into_iter()
                .map(|s| s.to_string())
                .collect(),
        };
        let source = SurveySource {
            provider: "csv".to_string(),
            file_path: "survey.csv".to_string(),
            first_question_column_index: None,
            questions: None,
            no_selection_labels: None,
            excel_worksheet_name: None,
        };
        let s = analyze_question(&column, &source, &AllocationRules::DEFAULT_RULES)
            .unwrap()
            .unwrap();
        let expected = "  Total valid responses: 4
  'No Selection' responses: 1
  Response percentages:
    Yes: 75.0%
    No: 25.0%
  3-vote allocation:
    Yes: 2 vote(s)
    No: 1 vote(s)";
        assert_eq!(format_question_report(&s), expected);
    }

    #[test]
    fn empty_question_is_skipped() {
        let column = ParsedColumn {
            question: "Comments".to_string(),
            cells: vec!["".to_string(), "NaN".to_string()],
        };
        let source = SurveySource {
            provider: "csv".to_string(),
            file_path: "survey.csv".to_string(),
            first_question_column_index: None,
            questions: None,
            no_selection_labels: None,
            excel_worksheet_name: None,
        };
        assert_eq!(
            analyze_question(&column, &source, &AllocationRules::DEFAULT_RULES).unwrap(),
            None
        );
    }
}
