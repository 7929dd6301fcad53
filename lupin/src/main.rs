mod assign;
mod bins;
mod common;
mod config;
mod data;
mod filter;
mod run_count;
mod run_tags;
mod tag_table;
mod weight;

#[cfg(test)]
mod testing;

use crate::common::*;
use run_count::*;
use run_tags::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about, term_width = 80)]
struct Cli {
    #[command(subcommand)]
    commands: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count tag-annotated alignments into a sample-by-feature matrix
    Count(CountArgs),
    /// Report which tags a BAM file carries
    Tags(TagsArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match &cli.commands {
        Commands::Count(args) => {
            run_count(args)?;
        }
        Commands::Tags(args) => {
            run_tags(args)?;
        }
    }

    Ok(())
}
