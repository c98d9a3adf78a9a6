use colored::{ColoredString, Colorize};
use shiori_engine::{Effect, Line, Speaker};

/// Print effects as terminal output.
pub fn effects(effects: &[Effect]) {
    for effect in effects {
        match effect {
            Effect::Say {
                speaker, text, nvl, ..
            } => {
                let indent = if *nvl { "    " } else { "  " };
                match speaker {
                    Some(speaker) => println!("{indent}{}: {text}", name(speaker)),
                    None => println!("{indent}{}", text.italic()),
                }
            }
            Effect::Centered { text, .. } => println!("\n          {}\n", text.bold()),
            Effect::ClearText => println!(),
            Effect::RemoveLastLine => println!("  {}", "(line taken back)".dimmed()),
            Effect::RestorePage { lines } => {
                for line in lines {
                    page_line(line);
                }
            }
            Effect::ShowChoices { choices } => {
                for (i, choice) in choices.iter().enumerate() {
                    println!("  {} {}", format!("{})", i + 1).bold(), choice.text);
                }
            }
            Effect::Particles { name, .. } => {
                println!("  {}", format!("[particles: {name}]").dimmed());
            }
            Effect::StopParticles => println!("  {}", "[particles stop]".dimmed()),
            Effect::Custom { kind, .. } => println!("  {}", format!("[{kind}]").dimmed()),
            Effect::FinishTyping | Effect::HideChoices => {}
        }
    }
}

fn page_line(line: &Line) {
    match &line.speaker {
        Some(speaker) => println!("    {}: {}", speaker.bold(), line.text),
        None => println!("    {}", line.text.italic()),
    }
}

fn name(speaker: &Speaker) -> ColoredString {
    let name = speaker.name.bold();
    match speaker.color.as_deref().and_then(parse_hex) {
        Some((r, g, b)) => name.truecolor(r, g, b),
        None => name,
    }
}

/// Parse `#rrggbb`.
fn parse_hex(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}
