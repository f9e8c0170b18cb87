use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::grouping::LogTab;

#[derive(Debug, Parser)]
#[command(
    name = "svcdesk",
    about = "Service desk tooling: text-log rollups, contacts, attendance, reports"
)]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Text-log JSON export to read instead of the configured one
    #[arg(long, global = true)]
    pub data: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Group per-recipient text logs into logical messages
    Logs(LogsArgs),
    /// List send batches with their delivery counts
    Batches {
        /// Fetch per-recipient rows and show live counts
        #[arg(long)]
        expand: bool,
    },
    /// Expand one batch into its per-recipient rows
    Batch {
        batch_id: String,
        /// Filter recipients by name or phone
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Explain a carrier error message
    Explain {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// Build a prefilled link to resend a previous message
    Resend {
        /// Message id, or the id of a single log row
        message_id: String,
        /// Open the link in the default browser
        #[arg(long)]
        open: bool,
    },
    /// Import or export the contact directory as CSV
    #[command(subcommand)]
    Contacts(ContactsCommand),
    /// Record attendance marks with debounced autosave
    Attendance(AttendanceArgs),
    /// Render a Days of Service project report
    Report(ReportArgs),
}

#[derive(Debug, Clone, Args)]
pub struct LogsArgs {
    #[arg(long, value_enum, default_value_t = TabArg::All)]
    pub tab: TabArg,
    #[arg(long, default_value_t = 1)]
    pub page: usize,
    /// Rows per page (0 uses the configured page size)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub search: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Earliest send date (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<NaiveDate>,
    /// Latest send date (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<NaiveDate>,
    /// created_at, status or recipient_phone
    #[arg(long)]
    pub sort_by: Option<String>,
    /// asc or desc
    #[arg(long)]
    pub direction: Option<String>,
    /// Print grouped messages as JSON
    #[arg(long)]
    pub json: bool,
}

impl Default for LogsArgs {
    fn default() -> Self {
        Self {
            tab: TabArg::All,
            page: 1,
            limit: 0,
            status: None,
            search: None,
            phone: None,
            from: None,
            to: None,
            sort_by: None,
            direction: None,
            json: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum TabArg {
    #[default]
    All,
    Personal,
    Community,
    City,
}

impl From<TabArg> for LogTab {
    fn from(tab: TabArg) -> Self {
        match tab {
            TabArg::All => LogTab::All,
            TabArg::Personal => LogTab::Personal,
            TabArg::Community => LogTab::Community,
            TabArg::City => LogTab::City,
        }
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum ContactsCommand {
    /// Validate a contacts CSV and report rejected lines
    Import {
        file: PathBuf,
        /// Write accepted contacts back out in export format
        #[arg(long)]
        export: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct AttendanceArgs {
    #[arg(long)]
    pub class: String,
    /// JSON file holding the class's saved attendance
    #[arg(long)]
    pub store: PathBuf,
    /// Edits as STUDENT:YYYY-MM-DD:MARK (present, absent, excused)
    #[arg(required = true, num_args = 1..)]
    pub marks: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Project record as JSON
    pub project: PathBuf,
    /// Field inclusion settings as JSON
    #[arg(long)]
    pub settings: Option<PathBuf>,
    /// Mask lead contact details
    #[arg(long)]
    pub anonymize: bool,
    /// Output file (default: stdout)
    #[arg(short, long)]
    pub out: Option<PathBuf>,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Logs(LogsArgs::default()))
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::{Cli, Command, ContactsCommand, TabArg};

    #[test]
    fn defaults_to_logs_when_command_is_missing() {
        let cli = Cli::parse_from(["svcdesk"]);

        match cli.command_or_default() {
            Command::Logs(args) => {
                assert_eq!(args.tab, TabArg::All);
                assert_eq!(args.page, 1);
            }
            other => panic!("expected logs command, got {other:?}"),
        }
    }

    #[test]
    fn parses_logs_filters() {
        let cli = Cli::parse_from([
            "svcdesk",
            "logs",
            "--tab",
            "community",
            "--status",
            "failed",
            "--from",
            "2024-03-01",
            "--config",
            "custom.toml",
        ]);

        let Some(Command::Logs(args)) = cli.command else {
            panic!("expected logs command");
        };
        assert_eq!(args.tab, TabArg::Community);
        assert_eq!(args.status.as_deref(), Some("failed"));
        assert_eq!(args.from.map(|d| d.to_string()), Some("2024-03-01".to_owned()));
        assert_eq!(
            cli.config
                .as_deref()
                .map(|p| p.to_string_lossy().to_string()),
            Some("custom.toml".to_owned())
        );
    }

    #[test]
    fn parses_contacts_import() {
        let cli = Cli::parse_from(["svcdesk", "contacts", "import", "people.csv"]);

        assert!(matches!(
            cli.command,
            Some(Command::Contacts(ContactsCommand::Import { export: None, .. }))
        ));
    }

    #[test]
    fn parses_batches_expand_flag() {
        let cli = Cli::parse_from(["svcdesk", "batches", "--expand"]);

        assert!(matches!(cli.command, Some(Command::Batches { expand: true })));
    }

    #[test]
    fn explain_joins_words() {
        let cli = Cli::parse_from(["svcdesk", "explain", "Error", "30007"]);

        let Some(Command::Explain { message }) = cli.command else {
            panic!("expected explain command");
        };
        assert_eq!(message.join(" "), "Error 30007");
    }
}
