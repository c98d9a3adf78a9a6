use std::path::Path;

use colored::Colorize;
use shiori_actions::suggest::suggest;
use shiori_engine::Statement;

use crate::story::Story;

pub fn run(path: &Path) -> Result<(), String> {
    let story = Story::load(path)?;
    let script = story.script()?;
    let languages = if script.is_multi_language() {
        script.languages()
    } else {
        vec![""]
    };

    let mut problems = Vec::new();
    let mut labels = 0;
    let mut statements = 0;

    for language in languages {
        let within = if language.is_empty() {
            String::new()
        } else {
            format!("[{language}] ")
        };
        let names = script.label_names(language);
        let start = story.settings.start_label.as_str();
        if !names.contains(&start) {
            problems.push(format!("{within}start label \"{start}\" does not exist"));
        }

        let Some(body) = script.labels(language) else {
            continue;
        };
        labels += body.len();
        for (label, sequence) in body {
            for (step, statement) in sequence.iter().enumerate() {
                statements += 1;
                for line in commands(statement) {
                    let tokens: Vec<&str> = line.split_whitespace().collect();
                    match tokens.as_slice() {
                        ["jump", target, ..] if !target.contains("{{") => {
                            if !names.contains(target) {
                                problems.push(missing(
                                    &format!("{within}{label}:{step}: label \"{target}\" does not exist"),
                                    target,
                                    names.iter().copied(),
                                ));
                            }
                        }
                        ["particles", preset, ..] if !preset.contains("{{") => {
                            if !story.particles.contains_key(*preset) {
                                problems.push(missing(
                                    &format!("{within}{label}:{step}: particles \"{preset}\" are not defined"),
                                    preset,
                                    story.particles.keys().map(String::as_str),
                                ));
                            }
                        }
                        _ => {}
                    }
                }
            }
        }
    }

    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("  {} {problem}", "problem:".yellow().bold());
        }
        return Err(format!(
            "{} problem{} found",
            problems.len(),
            if problems.len() == 1 { "" } else { "s" }
        ));
    }

    println!("  All checks passed for '{}'.", path.display());
    println!("  {labels} labels, {statements} statements");
    Ok(())
}

/// Text commands a statement can run: the text itself, or every option of a
/// choice.
fn commands(statement: &Statement) -> Vec<&str> {
    if let Some(text) = statement.as_text() {
        return vec![text];
    }
    statement
        .as_record()
        .and_then(|record| record.get("Choice"))
        .and_then(|choice| choice.as_object())
        .map(|options| {
            options
                .values()
                .filter_map(|option| option.get("Do")?.as_str())
                .collect()
        })
        .unwrap_or_default()
}

fn missing<'a>(message: &str, name: &str, known: impl IntoIterator<Item = &'a str>) -> String {
    let suggestions = suggest(name, known, 3);
    if suggestions.is_empty() {
        message.to_string()
    } else {
        format!("{message} (did you mean {}?)", suggestions.join(", "))
    }
}
