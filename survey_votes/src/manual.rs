/*!

This is the long-form manual for `survey_votes` and `surveyvotes`.

## The method

Each question of a survey is processed on its own.

**Distribution** Every respondent either picked an answer or left the
question blank. Blank cells and the usual missing-value markers
(`NA`, `N/A`, `NaN`, `null`, ...) are counted as "no selection" and
excluded from the percentages. The answers are compared verbatim:
`Yes` and `yes` are two different answers.

**Apportionment** A fixed number of votes (3 unless configured otherwise)
is split between the answers with the largest remainder method:

1. every answer gets a quota `percentage / 100 × votes`,
2. every answer receives the whole part of its quota,
3. the votes left over go one by one to the answers with the largest
   fractional part.

For example, with 40% `Yes`, 35% `No` and 25% `Abstain`:

| answer  | quota | whole votes | remainder | final |
|---------|-------|-------------|-----------|-------|
| Yes     | 1.20  | 1           | 0.20      | 1     |
| No      | 1.05  | 1           | 0.05      | 1     |
| Abstain | 0.75  | 0           | 0.75      | 1     |

The votes always add up to the requested total.

**Ties** Remainders are sorted from the largest. A remainder within `1e-9` of
the largest remainder of its group joins that group, and its members are equal.
The tie is then broken
with the configured mode:
* `firstAppearance` (default): the answer that appears first in the column wins,
* `lexicographic`: the answer that sorts first (byte order) wins,
* `random`: the answers are ordered by a SHA-256 hash of the seed and
  their name. The outcome is hard to guess in advance but identical for a given seed.

With 50% `Yes` (first in the column) and 50% `No`, the default mode gives 2 votes
to `Yes` and 1 to `No`. The lexicographic mode gives 2 votes to `No`.

**Drift** Percentages are used as given, even if they do not add up to 100.
If they are far below 100, the leftover votes go around the ranking again; if
the whole parts already exceed the total, votes are taken back from the
smallest remainders first. A warning is logged in both cases.

## Input formats

### `csv`

A CSV export with one row per respondent and the text of the questions in the
header row.

```text
id,submitted,email,Approve the budget?,Preferred meeting day
1,2024-03-01,a@example.org,Yes,Monday
2,2024-03-01,b@example.org,No,
```

The first columns usually hold metadata about the respondent. By default the
questions start at column 4.

### `xlsx`

The same layout in an Excel workbook. The worksheet is selected with
`excelWorksheetName`; it may be omitted when the workbook holds only one sheet.

## Configuration

`surveyvotes` comes with sensible defaults, and every option can be given on
the command line. The program also accepts a configuration file in JSON:

```json
{
  "outputSettings": {
    "surveyName": "Council survey",
    "outputDirectory": "reports"
  },
  "surveySource": {
    "provider": "csv",
    "filePath": "responses.csv",
    "firstQuestionColumnIndex": 4,
    "questions": ["Approve the budget?"],
    "noSelectionLabels": ["", "No Selection"]
  },
  "rules": {
    "totalVotes": 3,
    "tiebreakMode": "random",
    "randomSeed": 17
  }
}
```

OutputSettings:
 - `surveyName` (string, optional): the name in the summary. Defaults to the name of the input file.
 - `outputDirectory` (string, optional): where to write the step-by-step calculation of each question.

SurveySource:
 - `provider` (`csv` or `xlsx`)
 - `filePath`: relative to the directory of the configuration file.
 - `firstQuestionColumnIndex` (number or string, optional, starts at 1): default 4.
 - `questions` (array of strings, optional): only process these columns.
 - `noSelectionLabels` (array of strings, optional): replaces the default missing-value markers.
 - `excelWorksheetName` (string, optional).

Rules:
 - `totalVotes` (number, optional): default 3.
 - `tiebreakMode` (`firstAppearance`, `lexicographic` or `random`, optional).
 - `randomSeed` (number, required with `random`).

 */
