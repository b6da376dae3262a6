use clap::Parser;

/// Computes the distribution of the answers of each survey question and splits a
/// fixed number of votes between them with the largest remainder method.
#[derive(Parser, Debug, Clone, Default)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file containing the configuration of the survey in JSON format.
    /// The options below override the values of the configuration file.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the summary of a survey in JSON format. If provided,
    /// surveyvotes will check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the survey will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) The file containing the survey responses. Setting this option overrides
    /// the path that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (directory, optional) If specified, the step-by-step calculation of each question is written
    /// to a text file in this directory.
    #[clap(short = 'd', long, value_parser)]
    pub output_dir: Option<String>,

    /// (column names, optional) If specified, only these questions are processed. It should correspond
    /// to entries in the first row of the input.
    #[clap(long, value_parser)]
    pub questions: Option<Vec<String>>,

    /// (default 4) The column of the first question, starting at 1. The columns before hold metadata.
    #[clap(long, value_parser)]
    pub first_question_column: Option<usize>,

    /// (default 3) The number of votes to split between the answers of each question.
    #[clap(long, value_parser)]
    pub total_votes: Option<u32>,

    /// (default firstAppearance) How to break ties between equal remainders: firstAppearance,
    /// lexicographic or random.
    #[clap(long, value_parser)]
    pub tiebreak_mode: Option<String>,

    /// The seed of the random tiebreak mode.
    #[clap(long, value_parser)]
    pub random_seed: Option<u32>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
