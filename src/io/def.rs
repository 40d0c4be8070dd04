//! iMOPSE `.def` instance loader.
//!
//! The file is split into sections by lines made only of `=` characters:
//!
//! ```text
//! =====================================
//! Project name:   sample
//! =====================================
//! Tasks:          2
//! Resources:      1
//! =====================================
//! ResourceID   Salary   Skills
//! 1            14.2     Q1: 2   Q3: 1
//! =====================================
//! TaskID   Duration   Skills   Predecessor IDs
//! 1        5          Q1: 1
//! 2        3          Q3: 1    1
//! ```
//!
//! The resource and task tables are recognised by their `ResourceID` /
//! `TaskID` header rows. Without headers, the third section after the
//! first separator holds resources and the fourth holds tasks; text before
//! the first separator is ignored.
//!
//! IDs in the file are 1-based and converted to 0-based. Other rows whose
//! first token is not an integer are skipped.

use std::path::Path;

use crate::error::{Error, Result};
use crate::ga::ProblemInstance;
use crate::models::{Resource, SkillSet, Task};

const RESOURCE_SECTION: usize = 3;
const TASK_SECTION: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Resources,
    Tasks,
}

impl Table {
    fn from_header(first_token: &str) -> Option<Self> {
        if first_token.eq_ignore_ascii_case("ResourceID") {
            Some(Self::Resources)
        } else if first_token.eq_ignore_ascii_case("TaskID") {
            Some(Self::Tasks)
        } else {
            None
        }
    }

    fn from_position(section: usize) -> Option<Self> {
        match section {
            RESOURCE_SECTION => Some(Self::Resources),
            TASK_SECTION => Some(Self::Tasks),
            _ => None,
        }
    }
}

/// Reads and validates an instance file.
///
/// # Errors
/// [`Error::Io`] if the file cannot be read, [`Error::Parse`] for malformed
/// rows, [`Error::InvalidInstance`] if the data fails validation.
pub fn read_def(path: impl AsRef<Path>) -> Result<ProblemInstance> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_def(&text)
}

/// Parses instance text (see module docs for the format).
pub fn parse_def(text: &str) -> Result<ProblemInstance> {
    let mut section = 0usize;
    // Table announced by a header row in the current section
    let mut header: Option<Table> = None;
    let mut seen_resources = false;
    let mut seen_tasks = false;
    let mut line_count = 0usize;
    let mut resources = Vec::new();
    let mut tasks = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        line_count = line_no;
        let trimmed = line.trim();

        if !trimmed.is_empty() && trimmed.chars().all(|c| c == '=') {
            section += 1;
            header = None;
            continue;
        }

        let mut tokens = trimmed.split_whitespace().peekable();
        let Some(first) = tokens.peek() else {
            continue;
        };
        if first.parse::<u64>().is_err() {
            if let Some(table) = Table::from_header(first) {
                header = Some(table);
            }
            continue;
        }

        match header.or_else(|| Table::from_position(section)) {
            Some(Table::Resources) => {
                seen_resources = true;
                resources.push(parse_resource(line_no, tokens)?);
            }
            Some(Table::Tasks) => {
                seen_tasks = true;
                tasks.push(parse_task(line_no, tokens)?);
            }
            None => {}
        }
    }

    if !seen_resources || !seen_tasks {
        return Err(Error::parse(
            line_count,
            format!("missing resource or task table ({section} sections found)"),
        ));
    }

    ProblemInstance::new(resources, tasks)
}

fn parse_resource<'a>(line: usize, mut tokens: impl Iterator<Item = &'a str>) -> Result<Resource> {
    let id = parse_id(line, tokens.next())?;
    let cost_token = tokens
        .next()
        .ok_or_else(|| Error::parse(line, "missing resource cost"))?;
    let cost: f64 = cost_token
        .parse()
        .map_err(|_| Error::parse(line, format!("invalid cost '{cost_token}'")))?;

    let mut skills = SkillSet::new();
    while let Some(token) = tokens.next() {
        let (skill, level) = parse_skill(line, token, &mut tokens)?;
        skills.insert(skill, level);
    }

    Ok(Resource::new(id, cost).with_skills(skills))
}

fn parse_task<'a>(line: usize, mut tokens: impl Iterator<Item = &'a str>) -> Result<Task> {
    let id = parse_id(line, tokens.next())?;
    let duration_token = tokens
        .next()
        .ok_or_else(|| Error::parse(line, "missing task duration"))?;
    let duration: u32 = duration_token
        .parse()
        .map_err(|_| Error::parse(line, format!("invalid duration '{duration_token}'")))?;

    let mut task = Task::new(id, duration);
    while let Some(token) = tokens.next() {
        if token.starts_with('Q') {
            let (skill, level) = parse_skill(line, token, &mut tokens)?;
            task.requirements.insert(skill, level);
        } else {
            task = task.with_predecessor(parse_id(line, Some(token))?);
        }
    }

    Ok(task)
}

/// Parses a 1-based ID token into a 0-based index.
fn parse_id(line: usize, token: Option<&str>) -> Result<usize> {
    let token = token.ok_or_else(|| Error::parse(line, "missing ID"))?;
    match token.parse::<usize>() {
        Ok(id) if id >= 1 => Ok(id - 1),
        _ => Err(Error::parse(line, format!("invalid ID '{token}' (IDs are 1-based)"))),
    }
}

/// Parses `Q<skill>:<level>` or `Q<skill>:` followed by a `<level>` token.
fn parse_skill<'a>(
    line: usize,
    token: &str,
    rest: &mut impl Iterator<Item = &'a str>,
) -> Result<(u32, u32)> {
    let body = token
        .strip_prefix('Q')
        .ok_or_else(|| Error::parse(line, format!("unexpected token '{token}'")))?;
    let (skill_str, level_str) = body
        .split_once(':')
        .ok_or_else(|| Error::parse(line, format!("skill '{token}' lacks ':'")))?;

    let skill: u32 = skill_str
        .parse()
        .map_err(|_| Error::parse(line, format!("invalid skill '{token}'")))?;

    let level_str = if level_str.is_empty() {
        rest.next()
            .ok_or_else(|| Error::parse(line, format!("skill Q{skill} has no level")))?
    } else {
        level_str
    };
    let level: u32 = level_str
        .parse()
        .map_err(|_| Error::parse(line, format!("invalid level '{level_str}' for Q{skill}")))?;

    Ok((skill, level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
==========================================
Project name:    sample
Tasks:           3
==========================================
General characteristics:
Resources:       2
==========================================
ResourceID     Salary     Skills
1              10.5       Q1: 1     Q2: 2
2              20.0       Q1:3
==========================================
TaskID     Duration     Skills     Predecessor IDs
1          4            Q1: 1
2          2            Q2: 1      1
3          5            Q1: 3      1 2
==========================================
";

    #[test]
    fn test_parse_sample() {
        let inst = parse_def(SAMPLE).unwrap();
        assert_eq!(inst.resource_count(), 2);
        assert_eq!(inst.task_count(), 3);

        let r0 = inst.resource(0);
        assert!((r0.cost - 10.5).abs() < 1e-12);
        assert_eq!(r0.skill_level(1), Some(1));
        assert_eq!(r0.skill_level(2), Some(2));
        assert_eq!(inst.resource(1).skill_level(1), Some(3));

        let t2 = inst.task(2);
        assert_eq!(t2.duration, 5);
        assert_eq!(t2.requirements.level(1), Some(3));
        assert_eq!(t2.predecessors, vec![0, 1]);
        assert_eq!(inst.eligible_resources(2), &[1]);
        assert_eq!(inst.eligible_resources(1), &[0]);
    }

    #[test]
    fn test_tables_found_by_header_without_leading_separator() {
        let text = SAMPLE.trim_start_matches('=').trim_start();
        let inst = parse_def(text).unwrap();
        assert_eq!(inst.resource_count(), 2);
        assert_eq!(inst.task_count(), 3);
        assert_eq!(inst.task(2).predecessors, vec![0, 1]);
    }

    #[test]
    fn test_tables_found_by_position_without_headers() {
        let text = "\
=====
meta
=====
general
=====
1 10.0 Q1: 1
2 12.5 Q1: 2
=====
1 3 Q1: 1
2 2 Q1: 2 1
";
        let inst = parse_def(text).unwrap();
        assert_eq!(inst.resource_count(), 2);
        assert_eq!(inst.task_count(), 2);
        assert_eq!(inst.eligible_resources(1), &[1]);
    }

    #[test]
    fn test_read_def_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let inst = read_def(file.path()).unwrap();
        assert_eq!(inst.task_count(), 3);
    }

    #[test]
    fn test_missing_file() {
        let err = read_def("/definitely/not/here.def").unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn test_too_few_sections() {
        let err = parse_def("a\n=====\nb\n=====\n1 2.0\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_bad_number_reports_line() {
        let text = SAMPLE.replace("20.0", "twenty");
        match parse_def(&text).unwrap_err() {
            Error::Parse { line, .. } => assert_eq!(line, 10),
            other => panic!("expected Parse, got {other:?}"),
        }
    }

    #[test]
    fn test_skill_without_level() {
        let text = SAMPLE.replace("Q1:3", "Q1:");
        assert!(matches!(parse_def(&text).unwrap_err(), Error::Parse { line: 10, .. }));
    }

    #[test]
    fn test_gap_in_ids_is_invalid_instance() {
        let text = SAMPLE.replace("\n3          5", "\n4          5");
        assert!(matches!(parse_def(&text).unwrap_err(), Error::InvalidInstance(_)));
    }
}
