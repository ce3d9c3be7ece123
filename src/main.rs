use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{
    ConfigCommand, FeedbackCommand, GroceryCommand, InitCommand, PlanCommand, RecipeCommand,
};
use meal_planner::config::Config;
use meal_planner::db::{
    open_table, RepositoryError, SqliteTable, TableFeedbackRepository,
    TableGroceryListRepository, TableMealPlanRepository, TableRecipeRepository,
};

#[derive(Parser)]
#[command(name = "meal-planner")]
#[command(version)]
#[command(about = "Recipes, meal plans and grocery lists in a single table", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the table if it does not exist
    Init(InitCommand),

    /// Manage recipes
    Recipe(RecipeCommand),

    /// Inspect meal plans
    Plan(PlanCommand),

    /// Record and list recipe feedback
    Feedback(FeedbackCommand),

    /// Inspect grocery lists
    Grocery(GroceryCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so JSON output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meal_planner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn open(config: &Config) -> Result<SqliteTable, RepositoryError> {
    open_table(
        &config.database_path.value,
        &config.table_name.value,
        config.page_size.value,
    )
    .await
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Init(cmd)) => {
            cmd.run(&config).await?;
        }
        Some(Commands::Recipe(cmd)) => {
            let repo = TableRecipeRepository::new(open(&config).await?);
            cmd.run(&repo).await?;
        }
        Some(Commands::Plan(cmd)) => {
            let repo = TableMealPlanRepository::new(open(&config).await?);
            cmd.run(&repo).await?;
        }
        Some(Commands::Feedback(cmd)) => {
            let repo = TableFeedbackRepository::new(open(&config).await?);
            cmd.run(&repo).await?;
        }
        Some(Commands::Grocery(cmd)) => {
            let repo = TableGroceryListRepository::new(open(&config).await?);
            cmd.run(&repo).await?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config)?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
