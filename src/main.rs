use clap::Parser;
use metafitch::cli::{self, Commands};
use metafitch::commands;
use metafitch::commands::reconstruct::ReconstructArgs;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("metafitch=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();

    let result = match args.command {
        Commands::Reconstruct {
            tree,
            metadata,
            output,
            fields,
            id_field,
            tolerate_ambiguity,
            threads,
            summary,
            config,
        } => commands::reconstruct::run(ReconstructArgs {
            tree,
            metadata,
            output,
            fields,
            id_field,
            tolerate_ambiguity,
            threads: threads.map(usize::from),
            summary,
            config,
        }),
        Commands::NumDescendants {
            tree,
            output,
            config,
        } => commands::num_descendants::run(&tree, &output, config.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
