use clap::{Args, Subcommand};
use meal_planner_core::GroceryList;

use super::OutputFormat;
use meal_planner::db::GroceryListRepository;

#[derive(Args)]
pub struct GroceryCommand {
    #[command(subcommand)]
    pub command: GrocerySubcommand,
}

#[derive(Subcommand)]
pub enum GrocerySubcommand {
    /// Show the grocery list for a meal plan
    Show {
        /// Meal plan ID
        meal_plan_id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Mark an item on a meal plan's grocery list as purchased
    Check {
        /// Meal plan ID
        meal_plan_id: String,

        /// Item name (case-insensitive)
        item: String,
    },
}

async fn find_list(
    repo: &dyn GroceryListRepository,
    meal_plan_id: &str,
) -> Result<GroceryList, Box<dyn std::error::Error>> {
    match repo.get_by_meal_plan(meal_plan_id).await? {
        Some(list) => Ok(list),
        None => Err(format!("No grocery list for meal plan: {}", meal_plan_id).into()),
    }
}

fn print_list(list: &GroceryList) {
    match list.week_start_date {
        Some(week) => println!("Grocery list for week of {}", week),
        None => println!("Grocery list for plan {}", list.meal_plan_id),
    }
    println!("{}", "=".repeat(40));

    for category in list.categories() {
        println!("\n{}:", category);
        for item in list.items_in_category(&category) {
            println!("  {}", item);
        }
    }

    println!(
        "\n{}/{} purchased ({:.0}%)",
        list.purchased_count(),
        list.total_items(),
        list.completion_percentage()
    );
}

impl GroceryCommand {
    pub async fn run(
        &self,
        repo: &dyn GroceryListRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            GrocerySubcommand::Show {
                meal_plan_id,
                format,
            } => {
                let list = find_list(repo, meal_plan_id).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&list)?);
                    }
                    OutputFormat::Text => print_list(&list),
                }
                Ok(())
            }

            GrocerySubcommand::Check { meal_plan_id, item } => {
                let mut list = find_list(repo, meal_plan_id).await?;
                if !list.mark_item_purchased(item) {
                    return Err(format!("Item not on list: {}", item).into());
                }
                repo.save(&list).await?;
                println!("Checked off: {}", item);
                Ok(())
            }
        }
    }
}
