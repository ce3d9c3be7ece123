use chrono::NaiveDate;
use clap::{Args, Subcommand};
use meal_planner_core::MealPlan;
use std::io::{self, Write};

use super::OutputFormat;
use meal_planner::db::MealPlanRepository;

#[derive(Args)]
pub struct PlanCommand {
    #[command(subcommand)]
    pub command: PlanSubcommand,
}

#[derive(Subcommand)]
pub enum PlanSubcommand {
    /// Show a meal plan
    Show {
        /// Meal plan ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List a user's meal plans
    List {
        /// User ID
        #[arg(long)]
        user: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a user's active meal plan
    Active {
        /// User ID
        #[arg(long)]
        user: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a user's plan for the week starting on a date
    Week {
        /// User ID
        #[arg(long)]
        user: String,

        /// Week start date (YYYY-MM-DD)
        date: NaiveDate,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a meal plan (its grocery list is kept)
    Delete {
        /// Meal plan ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

fn print_plan(plan: &MealPlan, format: &OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(plan)?),
        OutputFormat::Text => println!("{}", plan),
    }
    Ok(())
}

impl PlanCommand {
    pub async fn run(
        &self,
        repo: &dyn MealPlanRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            PlanSubcommand::Show { id, format } => match repo.get_by_id(id).await? {
                Some(plan) => print_plan(&plan, format),
                None => Err(format!("Meal plan not found: {}", id).into()),
            },

            PlanSubcommand::List { user, format } => {
                let plans = repo.get_by_user(user).await?;

                if plans.is_empty() {
                    println!("No meal plans found for user {}", user);
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&plans)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<36}  {:<10}  {:<6}  MEALS", "ID", "WEEK", "ACTIVE");
                        println!("{}", "-".repeat(66));
                        for plan in &plans {
                            println!(
                                "{:<36}  {:<10}  {:<6}  {}",
                                plan.id,
                                plan.week_start_date,
                                if plan.is_active { "yes" } else { "no" },
                                plan.meals.len()
                            );
                        }
                        println!("\nTotal: {} plan(s)", plans.len());
                    }
                }
                Ok(())
            }

            PlanSubcommand::Active { user, format } => {
                match repo.get_active_by_user(user).await? {
                    Some(plan) => print_plan(&plan, format),
                    None => {
                        println!("No active meal plan for user {}", user);
                        Ok(())
                    }
                }
            }

            PlanSubcommand::Week { user, date, format } => {
                match repo.get_by_user_and_week(user, *date).await? {
                    Some(plan) => print_plan(&plan, format),
                    None => {
                        println!("No meal plan for user {} in week of {}", user, date);
                        Ok(())
                    }
                }
            }

            PlanSubcommand::Delete { id, force } => {
                let plan = match repo.get_by_id(id).await? {
                    Some(p) => p,
                    None => return Err(format!("Meal plan not found: {}", id).into()),
                };

                // Confirm deletion unless --force is used
                if !force {
                    print!("Delete meal plan for week of {}? [y/N] ", plan.week_start_date);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                repo.delete(&plan.id).await?;
                println!("Deleted meal plan: {}", plan.id);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meal_planner::db::{MemoryTable, TableMealPlanRepository};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[tokio::test]
    async fn test_show_missing_plan_errors() {
        let repo = TableMealPlanRepository::new(MemoryTable::new());
        let cmd = PlanCommand {
            command: PlanSubcommand::Show {
                id: "p-404".to_string(),
                format: OutputFormat::Json,
            },
        };
        let err = cmd.run(&repo).await.unwrap_err();
        assert_eq!(err.to_string(), "Meal plan not found: p-404");
    }

    #[tokio::test]
    async fn test_week_without_plan_is_not_an_error() {
        let repo = TableMealPlanRepository::new(MemoryTable::new());
        let cmd = PlanCommand {
            command: PlanSubcommand::Week {
                user: "u-1".to_string(),
                date: date("2024-01-15"),
                format: OutputFormat::Text,
            },
        };
        assert!(cmd.run(&repo).await.is_ok());
    }

    #[tokio::test]
    async fn test_force_delete_removes_plan() {
        let repo = TableMealPlanRepository::new(MemoryTable::new());
        repo.save(&MealPlan::new("p-1", "u-1", date("2024-01-15")))
            .await
            .unwrap();

        let cmd = PlanCommand {
            command: PlanSubcommand::Delete {
                id: "p-1".to_string(),
                force: true,
            },
        };
        cmd.run(&repo).await.unwrap();
        assert!(!repo.exists("p-1").await.unwrap());
    }
}
