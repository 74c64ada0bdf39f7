//! `recipebox` - CLI for the recipe store
//!
//! This binary composes the configuration, the repository and the asset store
//! and exposes them as subcommands.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use recipebox::cli::{
    AddCommand, AttachCommand, Cli, Command, ConfigCommand, ListCommand, ShowCommand,
    UpdateCommand,
};
use recipebox::{
    init_logging, Category, Config, ImageImport, Mutation, RecipeDraft, RecipeRepository,
    RecipeSummary, DEFAULT_CATEGORY,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    match cli.command {
        Command::List(cmd) => handle_list(&config, &cmd),
        Command::Show(cmd) => handle_show(&config, &cmd),
        Command::Add(cmd) => handle_add(&config, cmd),
        Command::Update(cmd) => handle_update(&config, cmd),
        Command::Delete(cmd) => {
            let mut repo = RecipeRepository::from_config(&config);
            let summary = find_summary(&repo, cmd.id)?;
            repo.try_delete_recipe(&summary)?;
            println!("Deleted {} ({})", summary.name, summary.id);
            Ok(())
        }
        Command::Attach(cmd) => handle_attach(&config, cmd),
        Command::Categories => {
            for category in Category::defaults() {
                println!("{}", category.name);
            }
            Ok(())
        }
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn find_summary(repo: &RecipeRepository, id: uuid::Uuid) -> anyhow::Result<RecipeSummary> {
    repo.get_summary(id)
        .cloned()
        .with_context(|| format!("no recipe with id {id}"))
}

fn handle_list(config: &Config, cmd: &ListCommand) -> anyhow::Result<()> {
    let repo = RecipeRepository::from_config(config);
    let recipes = repo.search(cmd.query.as_deref().unwrap_or_default());

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&recipes)?);
        return Ok(());
    }

    if recipes.is_empty() {
        println!("No recipes.");
    }
    for recipe in recipes {
        println!(
            "{}  {:<30} {:<14} {}",
            recipe.id,
            recipe.name,
            recipe.category,
            recipe.create_date.format("%Y-%m-%d")
        );
    }
    Ok(())
}

fn handle_show(config: &Config, cmd: &ShowCommand) -> anyhow::Result<()> {
    let repo = RecipeRepository::from_config(config);
    let detail = repo
        .detail_or_default(cmd.id)
        .with_context(|| format!("no recipe with id {}", cmd.id))?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&detail)?);
        return Ok(());
    }

    println!("{}", detail.name);
    println!("{}", "=".repeat(detail.name.chars().count().max(1)));
    println!("Category:    {}", detail.category);
    println!("Created:     {}", detail.create_date.to_rfc3339());
    println!("Updated:     {}", detail.update_date.to_rfc3339());
    if let Some(cover) = &detail.cover_image_path {
        println!("Cover:       {cover}");
    }
    if !detail.description.is_empty() {
        println!();
        println!("{}", detail.description);
    }
    println!();
    println!("Ingredients: {}", detail.ingredients.join(", "));
    println!("Seasonings:  {}", detail.seasonings.join(", "));
    if !detail.steps.is_empty() {
        println!();
        println!("[Steps]");
        for (n, step) in detail.steps.iter().enumerate() {
            println!("  {}. {}", n + 1, step.description);
            for path in &step.image_paths {
                println!("     photo: {path}");
            }
        }
    }
    if !detail.notes.is_empty() {
        println!();
        println!("[Notes]");
        for note in &detail.notes {
            println!("  {}  {}", note.create_date.format("%Y-%m-%d"), note.content);
        }
    }
    Ok(())
}

fn handle_add(config: &Config, cmd: AddCommand) -> anyhow::Result<()> {
    let mut repo = RecipeRepository::from_config(config);

    let mut draft = RecipeDraft::new_recipe();
    draft.detail_mut().name = cmd.name;
    draft.detail_mut().category = cmd.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
    draft.detail_mut().description = cmd.description.unwrap_or_default();
    for ingredient in &cmd.ingredients {
        draft.add_ingredient(ingredient);
    }

    let id = draft.id();
    draft.commit(&mut repo)?;
    println!("{id}");
    Ok(())
}

fn handle_update(config: &Config, cmd: UpdateCommand) -> anyhow::Result<()> {
    let mut repo = RecipeRepository::from_config(config);
    let mut summary = find_summary(&repo, cmd.id)?;

    if let Some(name) = cmd.name {
        summary.name = name;
    }
    if !cmd.ingredients.is_empty() {
        summary.ingredients = cmd.ingredients;
    }
    if let Some(category) = cmd.category {
        summary.category = category;
    }

    match repo.try_update_recipe(summary, None)? {
        Mutation::Applied => println!("Updated {}", cmd.id),
        Mutation::UnknownId => bail!("no recipe with id {}", cmd.id),
    }
    Ok(())
}

fn handle_attach(config: &Config, cmd: AttachCommand) -> anyhow::Result<()> {
    let mut repo = RecipeRepository::from_config(config);
    let detail = repo
        .detail_or_default(cmd.id)
        .with_context(|| format!("no recipe with id {}", cmd.id))?;

    let mut draft = RecipeDraft::edit(detail);
    let index = cmd.step.checked_sub(1).context("steps are numbered from 1")?;
    let mut import = ImageImport::new(draft.id(), repo.assets().clone());
    let Some(step) = draft.step_mut(index) else {
        bail!("recipe {} has no step {}", cmd.id, cmd.step);
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let attached = runtime.block_on(async {
        for file in cmd.files {
            import.spawn(async move {
                match tokio::fs::read(&file).await {
                    Ok(bytes) => Some(bytes),
                    Err(e) => {
                        eprintln!("Skipping {}: {e}", file.display());
                        None
                    }
                }
            });
        }
        import.drain_into(step).await
    });

    if attached == 0 {
        bail!("no images could be attached");
    }
    draft.commit(&mut repo)?;
    println!("Attached {attached} image(s) to step {}", cmd.step);
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Root:               {}", config.storage_root().display());
                println!();
                println!("[Images]");
                println!("  JPEG quality:       {}", config.images.jpeg_quality);
                println!("  Max dimension:      {}", config.images.max_dimension);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
