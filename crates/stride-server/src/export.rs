use std::fmt::Write;

use stride_store::{Conversation, Role};

const SLUG_MAX_CHARS: usize = 50;

/// Render a conversation as a Markdown transcript
pub fn markdown(conversation: &Conversation, exported_on: jiff::civil::Date) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# {}\n", conversation.title);
    let _ = writeln!(out, "*Exported on {exported_on}*\n");
    out.push_str("---\n\n");

    for turn in &conversation.messages {
        match turn.role {
            Role::User => {
                let _ = writeln!(out, "**You:** {}\n", turn.content);
            }
            Role::Assistant => {
                let _ = writeln!(out, "**Assistant:**\n\n{}\n", turn.content);

                for call in &turn.tool_calls {
                    let _ = writeln!(out, "> **Tool:** `{}`", call.tool_name);
                    let _ = writeln!(out, "> Input: `{}`\n", call.input);
                }
            }
            Role::System => {}
        }

        out.push_str("---\n\n");
    }

    out
}

/// Attachment name for an exported conversation, `<slug>-<YYYY-MM-DD>.md`
pub fn filename(conversation: &Conversation) -> String {
    let date = conversation.created_at.get(..10).unwrap_or(&conversation.created_at);
    format!("{}-{date}.md", slugify(&conversation.title))
}

/// Lowercase ASCII alphanumerics joined by single dashes
fn slugify(title: &str) -> String {
    let mut slug = String::new();
    let mut pending_dash = false;

    for c in title.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug.chars().take(SLUG_MAX_CHARS).collect()
}
