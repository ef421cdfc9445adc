use chrono::Local;
use colored::Colorize;

use crate::constants::TITLE_PREVIEW_CHARS;
use crate::i18n::{strings, Language};
use crate::models::{ConversationSummary, Message, MessageRole, Source};

/// Unicode RIGHT-TO-LEFT MARK
const RLM: char = '\u{200F}';

/// Prefix every line with a right-to-left mark when `rtl` is set
pub fn directional(text: &str, rtl: bool) -> String {
    if !rtl {
        return text.to_string();
    }
    text.lines()
        .map(|line| format!("{}{}", RLM, line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One conversation entry: role label, local time, content, cited sources
pub fn format_message(message: &Message, language: Language) -> String {
    let text = strings(language);
    let time = message.created_at.with_timezone(&Local).format("%H:%M");

    let label = match message.role {
        MessageRole::User => text.you.blue().bold(),
        MessageRole::Assistant if message.error => text.assistant.red().bold(),
        MessageRole::Assistant => text.assistant.green().bold(),
    };

    let content = if message.error {
        message.content.red().to_string()
    } else {
        message.content.clone()
    };

    let mut out = format!("{} {}\n{}", label, time.to_string().dimmed(), content);

    let sources = format_sources(&message.sources, language);
    if !sources.is_empty() {
        out.push('\n');
        out.push_str(&sources);
    }

    directional(&out, language.is_rtl())
}

/// Bulleted source list, empty when there is nothing to cite
pub fn format_sources(sources: &[Source], language: Language) -> String {
    let labels: Vec<&str> = sources.iter().filter_map(Source::label).collect();
    if labels.is_empty() {
        return String::new();
    }

    let mut out = strings(language).sources.dimmed().to_string();
    for label in labels {
        out.push_str(&format!("\n  • {}", label));
    }
    out
}

pub fn thinking_line(language: Language) -> String {
    directional(&strings(language).thinking.dimmed().italic().to_string(), language.is_rtl())
}

/// Shown on an empty session
pub fn welcome(language: Language) -> String {
    let text = strings(language);
    let out = format!(
        "{}\n{}\n{}",
        text.welcome_title.bold(),
        text.welcome_subtitle,
        text.welcome_examples.dimmed()
    );
    directional(&out, language.is_rtl())
}

/// Title cut to a preview length, on char boundaries
pub fn preview(title: &str) -> String {
    let mut chars = title.chars();
    let head: String = chars.by_ref().take(TITLE_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{}...", head)
    } else {
        head
    }
}

/// One row of the conversation list
pub fn format_summary(summary: &ConversationSummary) -> String {
    let mut row = format!("{:>6}  {}", summary.id.to_string().cyan(), preview(&summary.title));
    if let Some(language) = summary.language {
        row.push_str(&format!("  [{}]", language.code()));
    }
    if let Some(count) = summary.message_count {
        row.push_str(&format!("  ({})", count));
    }
    if let Some(updated) = summary.updated_at {
        row.push_str(&format!(
            "  {}",
            updated.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string().dimmed()
        ));
    }
    row
}

/// Whole conversation, or the welcome text when it is empty
pub fn format_transcript(messages: &[Message], language: Language) -> String {
    if messages.is_empty() {
        return welcome(language);
    }
    messages
        .iter()
        .map(|m| format_message(m, language))
        .collect::<Vec<_>>()
        .join("\n\n")
}
