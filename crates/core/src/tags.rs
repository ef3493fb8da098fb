use crate::error::IngestError;
use crate::models::FileTags;
use regex::Regex;

/// Parses the bracket-delimited tags embedded in a document filename,
/// e.g. `report[1.법률][2024.03].pdf`.
///
/// The first group verbatim is the category; the last group is split on
/// `.` and its leading token parsed as the year. Filenames with fewer
/// than two groups or a non-numeric year token are a contract violation
/// of the ingestion request and fail with
/// [`IngestError::MalformedFilename`] rather than defaulting, since a
/// silent default would corrupt category/year metadata downstream.
pub fn extract_file_tags(filename: &str) -> Result<FileTags, IngestError> {
    let pattern = Regex::new(r"\[([^\]]*)\]")?;
    let groups: Vec<&str> = pattern
        .captures_iter(filename)
        .filter_map(|capture| capture.get(1).map(|group| group.as_str()))
        .collect();

    if groups.len() < 2 {
        return Err(IngestError::MalformedFilename(format!(
            "expected at least two bracketed tag groups in {filename:?}, found {}",
            groups.len()
        )));
    }

    let last_group = groups[groups.len() - 1];
    let year_token = last_group.split('.').next().unwrap_or_default();
    let year = year_token.parse::<i32>().map_err(|_| {
        IngestError::MalformedFilename(format!(
            "year token {year_token:?} in {filename:?} is not numeric"
        ))
    })?;

    Ok(FileTags {
        category: groups[0].to_string(),
        year,
    })
}
