use clap::Parser;
use miette::Result;
use receipts::cli::{load_project, Cli, Commands};
use receipts::output::Printer;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let printer = Printer::new();

    match cli.command {
        Commands::Decode(args) => receipts::cli::decode::run(args)?,
        Commands::Encode(args) => receipts::cli::encode::run(args)?,
        Commands::Completions(args) => receipts::cli::completions::run(args)?,
        command => {
            let project = load_project(cli.config.as_deref())?;
            match command {
                Commands::Ingest(args) => receipts::cli::ingest::run(args, &project, &printer)?,
                Commands::Export(args) => receipts::cli::export::run(args, &project, &printer)?,
                Commands::Feed(args) => receipts::cli::feed::run(args, &project, &printer)?,
                Commands::Leaderboard(args) => {
                    receipts::cli::leaderboard::run(args, &project, &printer)?
                }
                Commands::PatchUrls(args) => receipts::cli::patch::run(args, &project, &printer)?,
                Commands::Validate(args) => receipts::cli::validate::run(args, &project, &printer)?,
                Commands::Decode(_) | Commands::Encode(_) | Commands::Completions(_) => {}
            }
        }
    }

    Ok(())
}
