use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::Serialize;

use tavsiyece::{FeedItem, FollowUser, NotificationView, SearchResults};

use crate::theme::{ICONS, THEME};

/// Output format options for CLI commands
#[derive(Clone, Debug, ValueEnum, Default, PartialEq)]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
}

/// Global CLI options that affect output and behavior
#[derive(Clone, Debug, Default)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
}

/// Data that can be rendered as a table
pub trait TableDisplay {
    fn to_table(&self, options: &GlobalOptions) -> Table;
}

pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        Self { options }
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }
        match self.options.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(data)?),
            OutputFormat::Table => println!("{}", data.to_table(&self.options)),
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        self.line(ICONS.success, message, THEME.success);
    }

    pub fn warning(&self, message: &str) {
        self.line(ICONS.warning, message, THEME.warning);
    }

    pub fn info(&self, message: &str) {
        self.line(ICONS.info, message, THEME.info);
    }

    /// Errors are shown even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.options.no_color {
            eprintln!("{} {message}", ICONS.error);
        } else {
            eprintln!("{} {}", ICONS.error.color(THEME.error), message.color(THEME.error));
        }
    }

    pub fn verbose(&self, message: &str) {
        if !self.options.verbose || self.options.quiet {
            return;
        }
        if self.options.no_color {
            eprintln!("{} {message}", ICONS.arrow);
        } else {
            eprintln!("{} {}", ICONS.arrow.color(THEME.muted), message.color(THEME.muted));
        }
    }

    pub fn heading(&self, text: &str) {
        if self.options.quiet || self.options.output_format == OutputFormat::Json {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", text.color(THEME.primary).bold());
        }
    }

    fn line(&self, icon: &str, message: &str, color: colored::Color) {
        if self.options.quiet || self.options.output_format == OutputFormat::Json {
            return;
        }
        if self.options.no_color {
            println!("{icon} {message}");
        } else {
            println!("{} {}", icon.color(color), message.color(color));
        }
    }
}

/// Table with the preset and header styling matching `--no-color`.
pub fn themed_table(options: &GlobalOptions, headers: &[&str]) -> Table {
    let mut table = Table::new();
    if options.no_color {
        table.load_preset(comfy_table::presets::ASCII_FULL);
    } else {
        table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
    }
    let header_cells: Vec<Cell> = headers
        .iter()
        .map(|h| {
            let cell = Cell::new(h).add_attribute(Attribute::Bold);
            if options.no_color { cell } else { cell.fg(TableColor::Cyan) }
        })
        .collect();
    table.set_header(header_cells);
    table
}

fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{head}…")
    } else {
        text.to_string()
    }
}

impl TableDisplay for Vec<FeedItem> {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Başlık", "Kategori", "Yazar", "Beğeni", "Yorum", "Tarih"]);
        for item in self {
            let likes = if item.is_liked {
                format!("{} {}", ICONS.heart, item.like_count)
            } else {
                item.like_count.to_string()
            };
            table.add_row(vec![
                Cell::new(shorten(&item.title, 40)),
                Cell::new(&item.category),
                Cell::new(&item.author.name),
                Cell::new(likes),
                Cell::new(item.comment_count),
                Cell::new(
                    item.created_at
                        .map(|ts| ts.format("%d.%m.%Y %H:%M").to_string())
                        .unwrap_or_default(),
                ),
            ]);
        }
        table
    }
}

impl TableDisplay for Vec<FollowUser> {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Id", "İsim", "Kullanıcı adı"]);
        for user in self {
            table.add_row(vec![
                Cell::new(&user.id),
                Cell::new(&user.name),
                Cell::new(format!("@{}", user.username)),
            ]);
        }
        table
    }
}

impl TableDisplay for Vec<NotificationView> {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["", "Gönderen", "Mesaj", "Zaman"]);
        for notification in self {
            let marker = if notification.is_read { "" } else { ICONS.unread };
            table.add_row(vec![
                Cell::new(marker),
                Cell::new(&notification.sender_name),
                Cell::new(shorten(&notification.message, 60)),
                Cell::new(&notification.time),
            ]);
        }
        table
    }
}

/// Serializable view of a search, with failures reduced to display messages.
#[derive(Debug, Serialize)]
pub struct SearchReport<'a> {
    pub users: &'a [tavsiyece::UserResult],
    pub recommendations: &'a [tavsiyece::RecommendationResult],
    pub errors: Vec<String>,
}

impl<'a> From<&'a SearchResults> for SearchReport<'a> {
    fn from(results: &'a SearchResults) -> Self {
        Self {
            users: &results.users,
            recommendations: &results.recommendations,
            errors: results
                .failures
                .iter()
                .map(|failure| format!("{:?}: {}", failure.section, failure.error.user_message()))
                .collect(),
        }
    }
}

impl TableDisplay for SearchReport<'_> {
    fn to_table(&self, options: &GlobalOptions) -> Table {
        let mut table = themed_table(options, &["Tür", "Id", "Sonuç"]);
        for user in self.users {
            table.add_row(vec![
                Cell::new("kullanıcı"),
                Cell::new(&user.id),
                Cell::new(format!("{} (@{})", user.name, user.username)),
            ]);
        }
        for rec in self.recommendations {
            table.add_row(vec![
                Cell::new("tavsiye"),
                Cell::new(&rec.id),
                Cell::new(format!("{} [{}]", rec.title, rec.category)),
            ]);
        }
        table
    }
}
