//! Line commands typed on stdin and the text shown in reply.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use feed_core::{
    AppViewModel, CommentForest, FeedError, ListingFilter, Msg, Operation, PostId, PostRowView,
    SortOrder,
};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  more              fetch the next page of posts
  post <id>         fetch one post by id
  comments <id>     fetch and show the comment tree of a known post
  sort <name>       change sort order (Active, Hot, New, ...)
  filter <name>     change listing filter (Subscribed, Local, All)
  clear             forget every loaded post
  show              print the feed status
  help              print this text
  quit              leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Feed(Msg),
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("'{0}' is not a post id")]
    BadId(String),
    #[error(transparent)]
    BadValue(#[from] feed_core::ParseConfigError),
}

/// `Ok(None)` for blank lines.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let argument = words.next();

    let command = match verb.to_ascii_lowercase().as_str() {
        "more" | "m" => Command::Feed(Msg::RetrieveMorePosts),
        "post" => Command::Feed(Msg::RetrievePost {
            id: post_id("post", argument)?,
        }),
        "comments" | "c" => Command::Feed(Msg::RetrieveComments {
            post_id: post_id("comments", argument)?,
        }),
        "sort" => {
            let sort: SortOrder = argument.ok_or(CommandError::MissingArgument("sort"))?.parse()?;
            Command::Feed(Msg::SetSortOrder(sort))
        }
        "filter" => {
            let filter: ListingFilter = argument
                .ok_or(CommandError::MissingArgument("filter"))?
                .parse()?;
            Command::Feed(Msg::SetListingFilter(filter))
        }
        "clear" => Command::Feed(Msg::ClearStore),
        "show" | "s" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(Some(command))
}

fn post_id(verb: &'static str, argument: Option<&str>) -> Result<PostId, CommandError> {
    let raw = argument.ok_or(CommandError::MissingArgument(verb))?;
    raw.parse().map_err(|_| CommandError::BadId(raw.to_string()))
}

pub fn render_status(view: &AppViewModel) -> String {
    let pending = if view.pending.is_empty() {
        "idle".to_string()
    } else {
        view.pending.join(", ")
    };
    format!(
        "{} posts | sort {} | filter {} | next page {} | {}",
        view.post_count, view.config.sort, view.config.filter, view.next_page, pending
    )
}

pub fn render_post_row(row: &PostRowView, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "[{}] {} ({} by {}, {}) score {} comments {}",
        row.id,
        row.title,
        row.community,
        row.author,
        age(row.published, now),
        row.score,
        row.comment_count
    );
    if row.is_image_post {
        line.push_str(" [image]");
    } else if !row.link.is_empty() {
        let _ = write!(line, " <{}>", row.link);
    }
    if row.has_preview {
        line.push_str(" +preview");
    }
    line
}

/// Coarse age such as `5m ago` or `3d ago`.
fn age(published: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(published);
    if elapsed.num_days() > 0 {
        format!("{}d ago", elapsed.num_days())
    } else if elapsed.num_hours() > 0 {
        format!("{}h ago", elapsed.num_hours())
    } else if elapsed.num_minutes() > 0 {
        format!("{}m ago", elapsed.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// One line per comment, indented two spaces per level.
pub fn render_forest(forest: &CommentForest) -> String {
    let mut out = String::new();
    for (depth, node) in forest.walk() {
        let comment = node.comment();
        let first_line = comment.content.lines().next().unwrap_or_default();
        let _ = writeln!(
            out,
            "{:indent$}#{} {} ({}): {}",
            "",
            comment.id,
            comment.author.shown_name(),
            comment.score,
            first_line,
            indent = depth * 2
        );
    }
    out
}

pub fn render_outcome(operation: Operation, result: &Result<(), FeedError>) -> Option<String> {
    let label = match operation {
        Operation::MorePosts { page } => format!("page {page}"),
        Operation::Post { id } => format!("post {id}"),
        Operation::Comments { post_id } => format!("comments of post {post_id}"),
    };
    match result {
        Ok(()) => None,
        Err(err) => Some(format!("{label} failed: {err}")),
    }
}
