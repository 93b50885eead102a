use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

pub mod add;
pub mod contact;
pub mod dashboard;
pub mod dates;
pub mod delete;
pub mod display;
pub mod import;
pub mod leads;
pub mod list;
pub mod show;
pub mod ui;
pub mod update;

pub use add::run_add;
pub use contact::run_contact;
pub use dashboard::run_dashboard;
pub use delete::run_delete;
pub use import::run_import;
pub use leads::run_leads;
pub use list::run_list;
pub use show::run_show;
pub use update::run_update;

#[derive(Parser)]
#[command(name = "leadtrack")]
#[command(about = "Track stale real-estate listings and owner outreach")]
#[command(version)]
pub struct Cli {
    /// Use seeded sample data in memory; nothing is saved
    #[arg(long, global = true)]
    pub demo: bool,
    /// Path to the SQLite database (overrides LEADTRACK_DB)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,
    /// Print JSON instead of text where supported
    #[arg(long, global = true)]
    pub json: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summary stats, most urgent leads and recent additions
    Dashboard,
    /// List properties
    List(ListArgs),
    /// Show hot leads by tab
    Leads(LeadsArgs),
    /// Show a property with its contact history
    Show(ShowArgs),
    /// Add a property
    Add(AddArgs),
    /// Edit a property
    Update(UpdateArgs),
    /// Log a contact attempt with a property owner
    Contact(ContactArgs),
    /// Delete a property and its contact history
    Delete(DeleteArgs),
    /// Import properties from a CSV file
    Import(ImportArgs),
}

#[derive(Args)]
pub struct ListArgs {
    /// Match address, city or owner name
    #[arg(short, long)]
    pub search: Option<String>,
    /// Only this lead status (e.g. new, ready_to_contact, contacted)
    #[arg(long)]
    pub status: Option<String>,
    /// Sort key: created_date, posting_date, price, address; prefix "-" for descending
    #[arg(long, allow_hyphen_values = true, default_value = "-created_date")]
    pub sort: String,
}

#[derive(Args)]
pub struct LeadsArgs {
    /// all, hot, warm or contacted
    #[arg(short, long, default_value = "all")]
    pub tab: String,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Property id or unique id prefix
    pub identifier: String,
}

/// Editable property fields shared by `add` and `update`.
/// An empty string clears an optional text field.
#[derive(Args, Debug, Clone, Default)]
pub struct PropertyFields {
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub price: Option<f64>,
    /// Listing date (YYYY-MM-DD, today, -30d, ...)
    #[arg(long, allow_hyphen_values = true)]
    pub posted: Option<String>,
    /// house, condo, townhouse, duplex or land
    #[arg(long = "type")]
    pub property_type: Option<String>,
    #[arg(long)]
    pub beds: Option<f32>,
    #[arg(long)]
    pub baths: Option<f32>,
    #[arg(long)]
    pub sqft: Option<u32>,
    #[arg(long)]
    pub owner: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub url: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
    /// Whether the listing is still active (true/false)
    #[arg(long)]
    pub listed: Option<bool>,
}

#[derive(Args)]
pub struct AddArgs {
    #[arg(short, long)]
    pub address: String,
    #[command(flatten)]
    pub fields: PropertyFields,
}

#[derive(Args)]
pub struct UpdateArgs {
    /// Property id or unique id prefix
    pub identifier: String,
    #[arg(short, long)]
    pub address: Option<String>,
    #[command(flatten)]
    pub fields: PropertyFields,
}

#[derive(Args)]
pub struct ContactArgs {
    /// Property id or unique id prefix
    pub identifier: String,
    /// When the contact happened
    #[arg(short, long, default_value = "today", allow_hyphen_values = true)]
    pub date: String,
    /// phone, email, text or in_person
    #[arg(short, long, default_value = "phone")]
    pub method: String,
    /// no_answer, answered, voicemail, callback_requested, not_interested,
    /// interested or meeting_scheduled. Prompted for when omitted on a terminal.
    #[arg(short, long)]
    pub outcome: Option<String>,
    #[arg(short, long)]
    pub notes: Option<String>,
    /// Follow-up date (YYYY-MM-DD, tomorrow, +3d, +1w, ...)
    #[arg(short, long)]
    pub follow_up: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    /// Property id or unique id prefix
    pub identifier: String,
    /// Skip confirmation
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ImportArgs {
    /// CSV file with a header row
    pub file: PathBuf,
    /// Validate and report without saving
    #[arg(short, long)]
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_contact_command() {
        let cli = Cli::parse_from([
            "leadtrack", "--demo", "contact", "1a2b", "--outcome", "voicemail", "--follow-up", "+2d",
        ]);
        assert!(cli.demo);
        match cli.command {
            Some(Commands::Contact(args)) => {
                assert_eq!(args.identifier, "1a2b");
                assert_eq!(args.date, "today");
                assert_eq!(args.method, "phone");
                assert_eq!(args.outcome.as_deref(), Some("voicemail"));
                assert_eq!(args.follow_up.as_deref(), Some("+2d"));
            }
            _ => panic!("expected contact command"),
        }
    }

    #[test]
    fn test_parse_list_with_descending_sort() {
        let cli = Cli::parse_from(["leadtrack", "list", "--sort", "-price", "--db", "/tmp/x.db"]);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        match cli.command {
            Some(Commands::List(args)) => assert_eq!(args.sort, "-price"),
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn test_parse_add_fields() {
        let cli = Cli::parse_from([
            "leadtrack", "add", "--address", "9 Elm St", "--type", "condo", "--price", "325000",
            "--listed", "false",
        ]);
        match cli.command {
            Some(Commands::Add(args)) => {
                assert_eq!(args.address, "9 Elm St");
                assert_eq!(args.fields.property_type.as_deref(), Some("condo"));
                assert_eq!(args.fields.price, Some(325000.0));
                assert_eq!(args.fields.listed, Some(false));
            }
            _ => panic!("expected add command"),
        }
    }

    #[test]
    fn test_no_subcommand() {
        let cli = Cli::parse_from(["leadtrack"]);
        assert!(cli.command.is_none());
        assert!(!cli.json);
    }
}
