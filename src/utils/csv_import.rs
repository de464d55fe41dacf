/// Pure parsing of task import spreadsheets (Discord-agnostic)
///
/// The first non-empty line is a header naming the columns. Fields may be
/// quoted with `"` and a doubled quote inside a quoted field is a literal
/// quote. Quoted fields cannot span lines.
use crate::constants::{DEFAULT_TASK_WEIGHT, TASK_ID_MAX_LEN};
use crate::models::{Task, TaskCategory, TierAmounts};

/// Result of reading an import file
#[derive(Debug, Default)]
pub struct CsvImport {
    pub tasks: Vec<Task>,
    /// One human readable line per row that could not be read
    pub malformed: Vec<String>,
}

#[derive(Debug, Default)]
struct Columns {
    id: Option<usize>,
    name: Option<usize>,
    category: Option<usize>,
    kind: Option<usize>,
    bronze: Option<usize>,
    silver: Option<usize>,
    gold: Option<usize>,
    skill: Option<usize>,
    weight: Option<usize>,
}

impl Columns {
    fn from_header(header: &[String]) -> Result<Self, String> {
        let mut columns = Columns::default();
        for (index, raw) in header.iter().enumerate() {
            let key: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_ascii_lowercase();
            let slot = match key.as_str() {
                "id" | "taskid" => &mut columns.id,
                "taskname" | "name" => &mut columns.name,
                "category" => &mut columns.category,
                "type" | "verificationtype" => &mut columns.kind,
                "amtbronze" | "bronze" => &mut columns.bronze,
                "amtsilver" | "silver" => &mut columns.silver,
                "amtgold" | "gold" => &mut columns.gold,
                "skill" => &mut columns.skill,
                "weight" => &mut columns.weight,
                _ => continue,
            };
            slot.get_or_insert(index);
        }

        let missing: Vec<&str> = [
            ("id", columns.id),
            ("taskName", columns.name),
            ("category", columns.category),
        ]
        .iter()
        .filter(|(_, index)| index.is_none())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(columns)
        } else {
            Err(format!("Missing required column(s): {}", missing.join(", ")))
        }
    }
}

/// Split one CSV line into fields
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if current.trim().is_empty() => {
                current.clear();
                in_quotes = true;
            }
            (',', false) => fields.push(std::mem::take(&mut current).trim().to_string()),
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

fn field<'a>(row: &'a [String], index: Option<usize>) -> Option<&'a str> {
    index
        .and_then(|i| row.get(i))
        .map(String::as_str)
        .filter(|value| !value.is_empty())
}

fn parse_amount(row: &[String], index: Option<usize>, name: &str) -> Result<i32, String> {
    match field(row, index) {
        None => Ok(0),
        Some(value) => value
            .parse::<i32>()
            .map_err(|_| format!("{} '{}' is not a whole number", name, value)),
    }
}

fn parse_row(row: &[String], columns: &Columns) -> Result<Task, String> {
    let id = field(row, columns.id).ok_or("missing id")?.to_string();
    // Ids travel inside `|` separated button custom ids
    if id.contains('|') {
        return Err(format!("id '{}' must not contain '|'", id));
    }
    if id.chars().count() > TASK_ID_MAX_LEN {
        return Err(format!("id is longer than {} characters", TASK_ID_MAX_LEN));
    }
    let name = field(row, columns.name).ok_or("missing task name")?.to_string();
    let category = field(row, columns.category)
        .ok_or("missing category")?
        .parse::<TaskCategory>()?;

    let weight = match field(row, columns.weight) {
        None => DEFAULT_TASK_WEIGHT,
        Some(value) => value
            .parse::<i32>()
            .map_err(|_| format!("weight '{}' is not a whole number", value))?,
    };

    Ok(Task {
        id,
        name,
        category,
        skill: field(row, columns.skill).map(str::to_string),
        verification_type: field(row, columns.kind)
            .unwrap_or("screenshot")
            .to_string(),
        amounts: TierAmounts {
            bronze: parse_amount(row, columns.bronze, "amtBronze")?,
            silver: parse_amount(row, columns.silver, "amtSilver")?,
            gold: parse_amount(row, columns.gold, "amtGold")?,
        },
        weight,
    })
}

/// Read tasks from the text of an import file
///
/// Returns an error only when the header is unusable; bad rows are reported
/// in `malformed` and skipped.
pub fn parse_task_csv(text: &str) -> Result<CsvImport, String> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim_start_matches('\u{feff}')))
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines.next().ok_or("The file is empty")?;
    let columns = Columns::from_header(&parse_csv_line(header))?;

    let mut import = CsvImport::default();
    for (line_number, line) in lines {
        match parse_row(&parse_csv_line(line), &columns) {
            Ok(task) => import.tasks.push(task),
            Err(reason) => import
                .malformed
                .push(format!("Row {}: {}", line_number, reason)),
        }
    }

    Ok(import)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_line_plain() {
        assert_eq!(parse_csv_line("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_csv_line("a,,c"), vec!["a", "", "c"]);
    }

    #[test]
    fn test_parse_csv_line_quoted() {
        assert_eq!(
            parse_csv_line(r#"1,"Kill {amount} goblins, fast","say ""hi""""#),
            vec!["1", "Kill {amount} goblins, fast", r#"say "hi""#]
        );
    }

    #[test]
    fn test_parse_task_csv() {
        let text = "id,taskName,category,type,amtBronze,amtSilver,amtGold,skill\n\
                    pvm-1,Kill {amount} Vorkath,PvM,kc,5,10,25,\n\
                    sk-1,Mine {amount} ore,Skilling,xp,100,250,500,Mining\n";

        let import = parse_task_csv(text).unwrap();
        assert!(import.malformed.is_empty());
        assert_eq!(import.tasks.len(), 2);

        let vorkath = &import.tasks[0];
        assert_eq!(vorkath.id, "pvm-1");
        assert_eq!(vorkath.category, TaskCategory::PvM);
        assert_eq!(vorkath.skill, None);
        assert_eq!(vorkath.amounts, TierAmounts { bronze: 5, silver: 10, gold: 25 });
        assert_eq!(vorkath.weight, DEFAULT_TASK_WEIGHT);

        let mining = &import.tasks[1];
        assert_eq!(mining.skill.as_deref(), Some("Mining"));
        assert_eq!(mining.verification_type, "xp");
    }

    #[test]
    fn test_parse_task_csv_reports_bad_rows() {
        let text = "ID,Task Name,Category,Weight\n\
                    a,Good task,PvM,60\n\
                    b,Bad category,Raids,\n\
                    ,Missing id,PvM,\n\
                    c,Bad weight,PvM,heavy\n";

        let import = parse_task_csv(text).unwrap();
        assert_eq!(import.tasks.len(), 1);
        assert_eq!(import.tasks[0].weight, 60);
        assert_eq!(import.malformed.len(), 3);
        assert!(import.malformed[0].starts_with("Row 3:"));
        assert!(import.malformed[2].contains("heavy"));
    }

    #[test]
    fn test_parse_task_csv_rejects_unsafe_ids() {
        let long_id = "x".repeat(TASK_ID_MAX_LEN + 1);
        let max_id = "y".repeat(TASK_ID_MAX_LEN);
        let text = format!(
            "id,taskName,category\n\
             a|b,Piped,PvM\n\
             {},Too long,PvM\n\
             {},Just fits,PvM\n",
            long_id, max_id
        );

        let import = parse_task_csv(&text).unwrap();
        assert_eq!(import.tasks.len(), 1);
        assert_eq!(import.tasks[0].id, max_id);
        assert_eq!(import.malformed.len(), 2);
        assert!(import.malformed[0].starts_with("Row 2:"));
        assert!(import.malformed[0].contains("'|'"));
        assert!(import.malformed[1].starts_with("Row 3:"));
        assert!(import.malformed[1].contains("longer than"));
    }

    #[test]
    fn test_parse_task_csv_requires_columns() {
        let err = parse_task_csv("name,category\nx,PvM").unwrap_err();
        assert!(err.contains("id"));
        assert!(parse_task_csv("   \n").is_err());
    }
}
