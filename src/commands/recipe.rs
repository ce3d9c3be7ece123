use clap::{Args, Subcommand};
use meal_planner_core::{Ingredient, Recipe};
use serde::Deserialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::{truncate, OutputFormat};
use meal_planner::db::RecipeRepository;

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// List all recipes, ordered by title
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only recipes carrying this dietary tag
        #[arg(long = "tag", value_name = "TAG")]
        tag: Option<String>,
    },

    /// Show a recipe's details
    Show {
        /// Recipe ID
        id: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Scale ingredients to this many servings
        #[arg(long)]
        servings: Option<u32>,
    },

    /// Import recipes from a JSON file (one recipe or an array)
    Import {
        /// Path to the JSON file
        file: PathBuf,
    },

    /// Delete a recipe
    Delete {
        /// Recipe ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

/// Recipe as accepted by `recipe import`; everything but the title is optional.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct RecipeFile {
    id: String,
    title: String,
    description: String,
    servings: u32,
    prep_time_minutes: u32,
    cook_time_minutes: u32,
    ingredients: Vec<Ingredient>,
    instructions: Vec<String>,
    dietary_tags: Vec<String>,
    cuisine: Option<String>,
    difficulty: Option<String>,
    protein_type: Option<String>,
    image_url: Option<String>,
    source_url: Option<String>,
    rating: Option<f64>,
}

impl Default for RecipeFile {
    fn default() -> Self {
        Self {
            id: String::new(),
            title: String::new(),
            description: String::new(),
            servings: 1,
            prep_time_minutes: 0,
            cook_time_minutes: 0,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            dietary_tags: Vec::new(),
            cuisine: None,
            difficulty: None,
            protein_type: None,
            image_url: None,
            source_url: None,
            rating: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Many(Vec<RecipeFile>),
    One(RecipeFile),
}

impl RecipeFile {
    fn into_recipe(self) -> Result<Recipe, Box<dyn std::error::Error>> {
        if self.title.trim().is_empty() {
            return Err("Recipe title cannot be empty".into());
        }
        let id = if self.id.trim().is_empty() {
            Uuid::new_v4().to_string()
        } else {
            self.id
        };

        let mut recipe = Recipe::new(id, self.title.trim(), self.servings)?
            .with_description(self.description)
            .with_times(self.prep_time_minutes, self.cook_time_minutes)
            .with_ingredients(self.ingredients)
            .with_instructions(self.instructions)
            .with_dietary_tags(self.dietary_tags);

        if let Some(cuisine) = self.cuisine {
            recipe = recipe.with_cuisine(cuisine);
        }
        if let Some(difficulty) = self.difficulty {
            recipe = recipe.with_difficulty(difficulty);
        }
        if let Some(protein_type) = self.protein_type {
            recipe = recipe.with_protein_type(protein_type);
        }
        recipe.image_url = self.image_url;
        recipe.source_url = self.source_url;
        recipe.rating = self.rating;

        recipe.validate()?;
        Ok(recipe)
    }
}

fn read_recipes(path: &Path) -> Result<Vec<Recipe>, Box<dyn std::error::Error>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let parsed: ImportFile = serde_json::from_str(&contents)
        .map_err(|e| format!("Failed to parse '{}': {}", path.display(), e))?;

    let files = match parsed {
        ImportFile::Many(files) => files,
        ImportFile::One(file) => vec![file],
    };
    files.into_iter().map(RecipeFile::into_recipe).collect()
}

impl RecipeCommand {
    pub async fn run(&self, repo: &dyn RecipeRepository) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            RecipeSubcommand::List { format, tag } => {
                let recipes = repo.get_all().await?;

                let recipes: Vec<_> = if let Some(tag) = tag {
                    let required = [tag.clone()];
                    recipes
                        .into_iter()
                        .filter(|r| r.meets_dietary_requirements(&required))
                        .collect()
                } else {
                    recipes
                };

                if recipes.is_empty() {
                    println!("No recipes found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipes)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<36}  {:<30}  {:<10}  TAGS", "ID", "TITLE", "CUISINE");
                        println!("{}", "-".repeat(92));
                        for recipe in &recipes {
                            println!(
                                "{:<36}  {:<30}  {:<10}  {}",
                                recipe.id,
                                truncate(&recipe.title, 30),
                                truncate(&recipe.cuisine, 10),
                                recipe.dietary_tags.join(", ")
                            );
                        }
                        println!("\nTotal: {} recipe(s)", recipes.len());
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Show {
                id,
                format,
                servings,
            } => {
                let recipe = match repo.get_by_id(id).await? {
                    Some(r) => r,
                    None => return Err(format!("Recipe not found: {}", id).into()),
                };
                let recipe = match servings {
                    Some(servings) => recipe.scale(*servings)?,
                    None => recipe,
                };

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipe)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", recipe);
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Import { file } => {
                let recipes = read_recipes(file)?;
                for recipe in &recipes {
                    repo.save(recipe).await?;
                    println!("Imported recipe: {} ({})", recipe.title, recipe.id);
                }
                println!("\nTotal: {} recipe(s) imported", recipes.len());
                Ok(())
            }

            RecipeSubcommand::Delete { id, force } => {
                let recipe = match repo.get_by_id(id).await? {
                    Some(r) => r,
                    None => return Err(format!("Recipe not found: {}", id).into()),
                };

                // Confirm deletion unless --force is used
                if !force {
                    print!("Delete recipe '{}'? [y/N] ", recipe.title);
                    io::stdout().flush()?;

                    let mut input = String::new();
                    io::stdin().read_line(&mut input)?;

                    if !input.trim().eq_ignore_ascii_case("y") {
                        println!("Deletion cancelled.");
                        return Ok(());
                    }
                }

                repo.delete(&recipe.id).await?;
                println!("Deleted recipe: {}", recipe.title);
                Ok(())
            }
        }
    }
}
