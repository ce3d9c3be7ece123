use chrono::{NaiveDate, Utc};
use clap::{Args, Subcommand};
use meal_planner_core::Feedback;
use uuid::Uuid;

use super::OutputFormat;
use meal_planner::db::FeedbackRepository;

#[derive(Args)]
pub struct FeedbackCommand {
    #[command(subcommand)]
    pub command: FeedbackSubcommand,
}

#[derive(Subcommand)]
pub enum FeedbackSubcommand {
    /// Record feedback for a recipe
    Add {
        /// User ID
        #[arg(long)]
        user: String,

        /// Recipe ID
        #[arg(long)]
        recipe: String,

        /// Rating from 1 to 5
        #[arg(long)]
        rating: u8,

        /// Would cook this again
        #[arg(long)]
        make_again: bool,

        /// Meal plan the recipe was cooked from
        #[arg(long)]
        meal_plan: Option<String>,

        /// Date the recipe was cooked (YYYY-MM-DD)
        #[arg(long)]
        cooked: Option<NaiveDate>,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List feedback for a recipe, newest first
    Recipe {
        /// Recipe ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// List feedback left by a user
    User {
        /// User ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

fn print_feedback(
    entries: &[Feedback],
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    if entries.is_empty() {
        println!("No feedback found");
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(entries)?);
        }
        OutputFormat::Text => {
            for entry in entries {
                match entry.created_at {
                    Some(at) => println!("{}  {}", at.format("%Y-%m-%d %H:%M"), entry),
                    None => println!("{:<16}  {}", "-", entry),
                }
            }
            let average =
                entries.iter().map(|e| f64::from(e.rating)).sum::<f64>() / entries.len() as f64;
            println!(
                "\nTotal: {} entr{} (average rating {:.1})",
                entries.len(),
                if entries.len() == 1 { "y" } else { "ies" },
                average
            );
        }
    }
    Ok(())
}

impl FeedbackCommand {
    pub async fn run(
        &self,
        repo: &dyn FeedbackRepository,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            FeedbackSubcommand::Add {
                user,
                recipe,
                rating,
                make_again,
                meal_plan,
                cooked,
                notes,
            } => {
                let mut feedback = Feedback::new(
                    Uuid::new_v4().to_string(),
                    user.as_str(),
                    recipe.as_str(),
                    *rating,
                    *make_again,
                )?
                .with_created_at(Utc::now());

                if let Some(meal_plan) = meal_plan {
                    feedback = feedback.with_meal_plan(meal_plan.as_str());
                }
                if let Some(cooked) = cooked {
                    feedback = feedback.with_cooked_date(*cooked);
                }
                if let Some(notes) = notes {
                    feedback = feedback.with_notes(notes.as_str());
                }

                repo.save(&feedback).await?;
                println!("Recorded feedback: {}", feedback);
                Ok(())
            }

            FeedbackSubcommand::Recipe { id, format } => {
                let entries = repo.get_by_recipe(id).await?;
                print_feedback(&entries, format)
            }

            FeedbackSubcommand::User { id, format } => {
                let entries = repo.get_by_user(id).await?;
                print_feedback(&entries, format)
            }
        }
    }
}
