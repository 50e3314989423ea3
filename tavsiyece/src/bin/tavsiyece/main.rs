mod commands;
mod examples;
mod output;
mod theme;

use std::fmt::Write;
use std::io::{self, Write as IoWrite};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, Style},
    },
    error::ErrorKind,
};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};
use log::debug;

use commands::{
    feed::{FeedArgs, handle_feed},
    notifications::{NotificationsArgs, handle_notifications},
    search::{SearchArgs, handle_search},
    social::{EdgeArgs, ListArgs, handle_follow, handle_followers, handle_following, handle_unfollow},
};
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use tavsiyece::{Tavsiyece, TavsiyeceConfig, config::DEFAULT_CONFIG_FILE};
use theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("REDIS_URL", "Redis connection URL (used when the config file does not override it)"),
    ("RUST_LOG", "Log filter, e.g. 'tavsiyece=debug'"),
];

#[derive(Parser)]
#[command(name = "tavsiyece")]
#[command(version)]
#[command(
    about = "Operator CLI for the Tavsiyece recommendation backend",
    long_about = r#"Operator CLI for the Tavsiyece recommendation backend.

Reads the same document store the app uses and runs feed, search and
social-graph operations on behalf of a given user.
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Path to the configuration file
    #[arg(short = 'c', long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "table")]
    output: OutputFormat,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the home, profile or saved feed for a user
    Feed(FeedArgs),

    /// Search users and recommendations
    Search(SearchArgs),

    /// Follow a user
    Follow(EdgeArgs),

    /// Stop following a user
    Unfollow(EdgeArgs),

    /// List a user's followers
    Followers(ListArgs),

    /// List the accounts a user follows
    Following(ListArgs),

    /// List a user's notifications
    Notifications(NotificationsArgs),
}

impl Cli {
    fn parse_with_styles() -> Self {
        let command = build_cli_command().styles(help_styles());
        match command.try_get_matches() {
            Ok(matches) => Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit()),
            Err(err) => {
                let to_stdout = matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion);
                if let Err(print_err) = err.print()
                    && print_err.kind() != io::ErrorKind::BrokenPipe
                {
                    eprintln!("Failed to display help: {print_err}");
                }
                if to_stdout {
                    let _ = print_blank_line_stdout();
                }
                std::process::exit(err.exit_code());
            }
        }
    }
}

fn build_cli_command() -> Command {
    let use_color = ShouldColorize::from_env().should_colorize();
    let mut command = Cli::command()
        .after_long_help(render_top_level_appendix(use_color))
        .color(if use_color { ColorChoice::Auto } else { ColorChoice::Never });
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            *subcommand = subcommand.clone().after_long_help(render_examples(example.groups, use_color));
        }
    }
    command
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", stylize("Examples:", THEME.highlight, true, use_color));

    for (index, group) in groups.iter().enumerate() {
        let _ = writeln!(buffer, "  {}", stylize(group.title, THEME.primary, true, use_color));
        for command in group.commands {
            let arrow = stylize(ICONS.arrow, THEME.secondary, false, use_color);
            let _ = writeln!(buffer, "    {arrow} {}", stylize(command, THEME.secondary, false, use_color));
        }
        if index + 1 < groups.len() {
            buffer.push('\n');
        }
    }
    buffer
}

fn render_top_level_appendix(use_color: bool) -> String {
    let mut buffer = String::new();
    let _ = writeln!(buffer, "{}", stylize("Environment Variables:", THEME.highlight, true, use_color));
    for (key, description) in ENVIRONMENT_VARIABLES {
        let _ = writeln!(
            buffer,
            "  {}  {}",
            stylize(key, THEME.primary, true, use_color),
            stylize(description, THEME.muted, false, use_color)
        );
    }
    buffer.push('\n');
    let _ = writeln!(
        buffer,
        "{} {}",
        stylize("Tip:", THEME.highlight, true, use_color),
        stylize(
            "Use 'tavsiyece <command> --help' to view examples for each command.",
            THEME.secondary,
            false,
            use_color
        )
    );
    buffer
}

fn stylize(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    match (use_color, bold) {
        (false, _) => text.to_string(),
        (true, true) => text.color(color).bold().to_string(),
        (true, false) => text.color(color).to_string(),
    }
}

fn help_styles() -> Styles {
    Styles::styled()
        .usage(style_from_color(THEME.primary).bold())
        .header(style_from_color(THEME.highlight).bold())
        .literal(style_from_color(THEME.secondary))
        .placeholder(style_from_color(THEME.muted))
        .valid(style_from_color(THEME.success))
        .invalid(style_from_color(THEME.warning))
        .error(style_from_color(THEME.error).bold())
}

fn style_from_color(color: ThemeColor) -> Style {
    let ansi = match color {
        ThemeColor::Red => AnsiColor::Red,
        ThemeColor::Green => AnsiColor::Green,
        ThemeColor::Yellow => AnsiColor::Yellow,
        ThemeColor::Blue => AnsiColor::Blue,
        ThemeColor::Magenta => AnsiColor::Magenta,
        ThemeColor::Cyan => AnsiColor::Cyan,
        ThemeColor::BrightBlack => AnsiColor::BrightBlack,
        ThemeColor::BrightBlue => AnsiColor::BrightBlue,
        _ => AnsiColor::White,
    };
    Style::new().fg_color(Some(ClapColor::Ansi(ansi)))
}

fn print_blank_line_stdout() -> io::Result<()> {
    let mut stdout = io::stdout();
    IoWrite::write_all(&mut stdout, b"\n")?;
    IoWrite::flush(&mut stdout)
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse_with_styles();

    let default_filter = if cli.verbose { "tavsiyece=debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    if let Err(err) = execute(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn execute(cli: Cli) -> Result<()> {
    let output = OutputManager::new(GlobalOptions {
        output_format: cli.output,
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
    });

    let config = TavsiyeceConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    config.validate()?;
    output.verbose(&format!("connecting to store with prefix '{}'", config.store.prefix));

    let (app, dispatcher) = Tavsiyece::connect(&config)
        .await
        .context("connecting to the document store")?;

    let result = match cli.command {
        Commands::Feed(args) => handle_feed(args, &app, &output).await,
        Commands::Search(args) => handle_search(args, &app, &output).await,
        Commands::Follow(args) => handle_follow(args, &app, &output).await,
        Commands::Unfollow(args) => handle_unfollow(args, &app, &output).await,
        Commands::Followers(args) => handle_followers(args, &app, &output).await,
        Commands::Following(args) => handle_following(args, &app, &output).await,
        Commands::Notifications(args) => handle_notifications(args, &app, &output).await,
    };

    // Dropping the client closes the queue so the dispatcher drains and returns.
    drop(app);
    let delivered = dispatcher.run().await;
    debug!("delivered {delivered} notifications");

    result
}
