use clap::Args;

use meal_planner::config::Config;
use meal_planner::db::open_table;

#[derive(Args)]
pub struct InitCommand {}

impl InitCommand {
    /// Creates the database file and table if they are missing.
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let table = open_table(
            &config.database_path.value,
            &config.table_name.value,
            config.page_size.value,
        )
        .await?;

        println!(
            "Table '{}' ready at {}",
            table.table_name(),
            config.database_path.value.display()
        );
        Ok(())
    }
}
