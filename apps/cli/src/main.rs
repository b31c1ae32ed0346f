use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{DirectoryClient, JoinWizard};
use shared::domain::FilterCategory;
use storage::DraftStore;

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the directory table, optionally filtered by role or region.
    List {
        #[arg(long)]
        role: Vec<String>,
        #[arg(long)]
        region: Vec<String>,
        /// Also print the selectable filter facets.
        #[arg(long)]
        facets: bool,
    },
    /// Walk the join wizard in one pass and submit the result.
    Join {
        #[arg(long)]
        name: String,
        #[arg(long)]
        location: String,
        #[arg(long)]
        website: String,
        #[arg(long = "focus")]
        focuses: Vec<String>,
        #[arg(long)]
        focus_suggested: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        years_experience: String,
        #[arg(long, default_value = "sqlite://./join_draft.db")]
        draft_db: String,
    },
    /// Forget any locally saved join answers.
    ClearDraft {
        #[arg(long, default_value = "sqlite://./join_draft.db")]
        draft_db: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();
    let args = Args::parse();

    match args.command {
        Command::List {
            role,
            region,
            facets,
        } => {
            let mut client = DirectoryClient::new(args.server_url);
            let count = client.load_directory().await;
            if count == 0 {
                println!("The directory is empty or unavailable right now.");
            }
            for label in &role {
                client.toggle_facet(FilterCategory::Role, label);
            }
            for label in &region {
                client.toggle_facet(FilterCategory::Region, label);
            }

            if facets {
                for category in [FilterCategory::Role, FilterCategory::Region] {
                    client.open_filter_panel(category);
                    let labels: Vec<&str> = client
                        .panel_facets()
                        .iter()
                        .map(|f| f.label.as_str())
                        .collect();
                    println!("{category}: {}", labels.join(", "));
                }
                client.close_filter_panel();
            }

            if let Some(visible) = client.visible() {
                println!("{:<24} {:<30} {:<20} Link", "Name", "Location", "Role");
                for entry in visible {
                    let place = format!("{}, {}", entry.location, entry.region);
                    println!(
                        "{:<24} {:<30} {:<20} {}",
                        entry.name, place, entry.role, entry.link
                    );
                }
                println!(
                    "{} of {} technologists shown",
                    visible.len(),
                    client.store().roster().len()
                );
            }
        }
        Command::Join {
            name,
            location,
            website,
            focuses,
            focus_suggested,
            title,
            years_experience,
            draft_db,
        } => {
            let drafts = DraftStore::new(&draft_db).await?;
            let mut wizard = JoinWizard::new(drafts);
            wizard.save_you(&name, &location, &website).await?;
            wizard
                .save_work(&focuses, focus_suggested.as_deref())
                .await?;
            wizard
                .save_background(title.as_deref(), &years_experience)
                .await?;
            let client = DirectoryClient::new(args.server_url);
            let receipt = client.submit_wizard(&mut wizard).await?;
            println!("Mahalo! Submission #{} received.", receipt.submission_id);
        }
        Command::ClearDraft { draft_db } => {
            let drafts = DraftStore::new(&draft_db).await?;
            let mut wizard = JoinWizard::new(drafts);
            wizard.clear_all_fields().await?;
            println!("Saved join answers cleared.");
        }
    }
    Ok(())
}
