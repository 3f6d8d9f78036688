//! Command-line surface.

use std::time::Duration;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use taskboard_core::config::{parse_base_url, DEFAULT_BASE_URL};
use taskboard_core::{
    ClientConfig, ConfigError, CreateCategory, CreateTodo, FilterPatch, Priority, SortField,
    SortOrder, UpdateCategory, UpdateTodo,
};

#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Manage todos on a taskboard server")]
pub struct Cli {
    /// API base URL
    #[arg(
        long,
        global = true,
        env = "TASKBOARD_API_URL",
        default_value = DEFAULT_BASE_URL,
        value_parser = api_url
    )]
    pub api_url: String,

    /// Request timeout in whole seconds; unset waits indefinitely
    #[arg(long, global = true, env = "TASKBOARD_TIMEOUT_SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Flags win over their env vars; clap has already validated both.
    pub fn to_config(&self) -> ClientConfig {
        let config = ClientConfig::new(self.api_url.clone());
        match self.timeout {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

fn api_url(value: &str) -> Result<String, ConfigError> {
    parse_base_url("--api-url", value)
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List todos matching a filter
    List(ListArgs),
    /// Show one todo
    Show { id: u64 },
    /// Create a todo
    Add(AddArgs),
    /// Change fields of a todo
    Edit(EditArgs),
    /// Flip a todo between done and not done
    Toggle { id: u64 },
    /// Delete a todo
    Rm { id: u64 },
    /// Manage categories
    #[command(subcommand)]
    Category(CategoryCommand),
}

#[derive(Debug, Default, Args)]
pub struct ListArgs {
    /// Match title or description
    #[arg(long, short)]
    pub search: Option<String>,
    #[arg(long)]
    pub category: Option<u64>,
    /// true or false
    #[arg(long)]
    pub completed: Option<bool>,
    #[arg(long)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub page: Option<u32>,
    #[arg(long)]
    pub limit: Option<u32>,
    #[arg(long)]
    pub sort_by: Option<SortField>,
    #[arg(long)]
    pub order: Option<SortOrder>,
}

impl ListArgs {
    /// Only the flags that were given end up in the patch.
    pub fn to_patch(&self) -> FilterPatch {
        let mut patch = FilterPatch::new();
        if let Some(search) = &self.search {
            patch = patch.search(Some(search.clone()));
        }
        if let Some(id) = self.category {
            patch = patch.category_id(Some(id));
        }
        if let Some(completed) = self.completed {
            patch = patch.completed(Some(completed));
        }
        if let Some(priority) = self.priority {
            patch = patch.priority(Some(priority));
        }
        if let Some(page) = self.page {
            patch = patch.page(Some(page));
        }
        if let Some(limit) = self.limit {
            patch = patch.limit(Some(limit));
        }
        if let Some(field) = self.sort_by {
            patch = patch.sort_by(Some(field));
        }
        if let Some(order) = self.order {
            patch = patch.sort_order(Some(order));
        }
        patch
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub title: String,
    #[arg(long, short)]
    pub description: Option<String>,
    #[arg(long, short)]
    pub priority: Option<Priority>,
    /// RFC 3339 timestamp, e.g. 2026-11-01T09:00:00Z
    #[arg(long)]
    pub due: Option<DateTime<Utc>>,
    #[arg(long, short)]
    pub category: Option<u64>,
}

impl From<AddArgs> for CreateTodo {
    fn from(args: AddArgs) -> Self {
        CreateTodo {
            title: args.title,
            description: args.description,
            priority: args.priority,
            due_date: args.due,
            category_id: args.category,
        }
    }
}

#[derive(Debug, Args)]
pub struct EditArgs {
    pub id: u64,
    #[arg(long, short)]
    pub title: Option<String>,
    #[arg(long, short)]
    pub description: Option<String>,
    #[arg(long)]
    pub completed: Option<bool>,
    #[arg(long, short)]
    pub priority: Option<Priority>,
    #[arg(long)]
    pub due: Option<DateTime<Utc>>,
    #[arg(long, short)]
    pub category: Option<u64>,
}

impl EditArgs {
    pub fn to_update(&self) -> UpdateTodo {
        UpdateTodo {
            title: self.title.clone(),
            description: self.description.clone(),
            completed: self.completed,
            priority: self.priority,
            due_date: self.due,
            category_id: self.category,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum CategoryCommand {
    /// List categories
    List,
    /// Create a category
    Add {
        name: String,
        /// Hex color, e.g. #3B82F6
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename or recolor a category
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category
    Rm { id: u64 },
}

pub fn create_category(name: &str, color: Option<&str>) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        color: color.map(str::to_string),
    }
}

pub fn update_category(name: Option<&str>, color: Option<&str>) -> UpdateCategory {
    UpdateCategory {
        name: name.map(str::to_string),
        color: color.map(str::to_string),
    }
}
