use clap::Parser;
use postit::cli::{
    handle_add, handle_color, handle_delete, handle_edit, handle_list, handle_move, handle_serve,
    Cli, Commands,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    // stdout carries protocol traffic under `serve`, so logs go to stderr
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let data_dir = cli.data_dir;
    let result = match cli.command {
        Commands::Serve { yes } => handle_serve(data_dir, yes),
        Commands::List { json } => handle_list(data_dir, json),
        Commands::Add { text, color, json } => handle_add(data_dir, text, color, json),
        Commands::Edit { index, text, color } => handle_edit(data_dir, index, text, color),
        Commands::Color { index, color } => handle_color(data_dir, index, color),
        Commands::Delete { index, force } => handle_delete(data_dir, index, force),
        Commands::Move { from, to } => handle_move(data_dir, from, to),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
