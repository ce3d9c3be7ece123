//! Meal Planner
//!
//! Stores recipes, user profiles, meal plans, grocery lists and recipe
//! feedback in one key-value table. Every entity lives under its own
//! partition/sort key pair, and a single secondary index serves the
//! "all recipes", "plan by id" and "feedback by recipe" lookups.

pub mod config;
pub mod db;
