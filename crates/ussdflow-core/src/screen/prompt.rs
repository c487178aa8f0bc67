//! Prompt formatting. Pure functions, no store access.

use ussdflow_types::error::ContractViolation;

use super::InputScreen;

/// Render the prompt asking for `screen.inputs[cursor]`.
///
/// ```text
/// Fruit
/// Choose fruit:
/// 1. Apple
/// 2. Banana
/// ```
///
/// A cursor past the last input is an orchestrator bug, not user input.
pub fn render_prompt(screen: &InputScreen, cursor: usize) -> Result<String, ContractViolation> {
    let input = screen
        .inputs
        .get(cursor)
        .ok_or(ContractViolation::CursorOutOfBounds {
            cursor,
            len: screen.inputs.len(),
        })?;

    let mut lines = vec![screen.title.clone()];
    match &input.options {
        Some(options) => {
            lines.push(format!("Choose {}:", input.display_name));
            lines.extend(numbered(options.iter().map(|o| o.display_value.as_str())));
        }
        None => lines.push(format!("Enter {}:", input.display_name)),
    }
    Ok(lines.join("\n"))
}

/// Render `title` followed by numbered entries.
pub fn render_menu(title: &str, labels: &[&str]) -> String {
    std::iter::once(title.to_string())
        .chain(numbered(labels.iter().copied()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix `notice` to a prompt, if one is configured.
pub fn annotate(notice: Option<&str>, prompt: String) -> String {
    match notice {
        Some(notice) => format!("{notice}\n{prompt}"),
        None => prompt,
    }
}

fn numbered<'a>(labels: impl Iterator<Item = &'a str>) -> impl Iterator<Item = String> {
    labels
        .enumerate()
        .map(|(index, label)| format!("{}. {label}", index + 1))
}
