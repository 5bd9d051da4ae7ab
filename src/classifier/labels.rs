use std::path::Path;

use super::interface::ClassifierError;

/// Turns one line of a label file into a display label.
///
/// Accepts bare names (`tabby`) and ImageNet synset lines
/// (`n02099601 golden retriever`). Only the first comma-separated name is
/// kept, with inner whitespace replaced by underscores. Returns `None` for
/// blank lines.
pub fn parse_label_line(line: &str) -> Option<String> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let names = match line.split_once(char::is_whitespace) {
        Some((id, rest)) if is_synset_id(id) => rest,
        _ => line,
    };

    let first = names.split(',').next().unwrap_or(names).trim();
    if first.is_empty() {
        return None;
    }

    Some(first.split_whitespace().collect::<Vec<_>>().join("_"))
}

fn is_synset_id(token: &str) -> bool {
    token.len() == 9
        && token.starts_with('n')
        && token[1..].chars().all(|c| c.is_ascii_digit())
}

/// Reads a label file, one class per line in output-index order. Trailing
/// blank lines are ignored; a blank line anywhere else would misalign every
/// later index and is rejected.
pub fn load_labels(path: &Path) -> Result<Vec<String>, ClassifierError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ClassifierError::Labels(format!("cannot read {}: {}", path.display(), e))
    })?;

    let mut lines: Vec<&str> = contents.lines().collect();
    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }

    if lines.is_empty() {
        return Err(ClassifierError::Labels(format!(
            "{} contains no labels",
            path.display()
        )));
    }

    lines
        .iter()
        .enumerate()
        .map(|(idx, line)| {
            parse_label_line(line).ok_or_else(|| {
                ClassifierError::Labels(format!(
                    "{} line {} has no label",
                    path.display(),
                    idx + 1
                ))
            })
        })
        .collect()
}
