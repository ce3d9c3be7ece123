mod config_cmd;
mod feedback;
mod grocery;
mod init;
mod plan;
mod recipe;

pub use config_cmd::ConfigCommand;
pub use feedback::FeedbackCommand;
pub use grocery::GroceryCommand;
pub use init::InitCommand;
pub use plan::PlanCommand;
pub use recipe::RecipeCommand;

use clap::ValueEnum;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Shortens `text` to `width` characters for table output.
fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() > width {
        let kept: String = text.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Soup", 10), "Soup");
        assert_eq!(truncate("Slow-cooker pulled pork", 10), "Slow-co...");
        assert_eq!(truncate("Crème brûlée tart", 8), "Crème...");
    }
}
