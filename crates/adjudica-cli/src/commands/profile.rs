//! Profile command implementation.

use crate::cli::{ProfileAction, ProfileArgs};
use crate::config::{Config, Profile};
use crate::error::Result;
use crate::output::Formatter;
use std::path::PathBuf;

/// Execute the profile command, saving the configuration when it changes.
pub fn execute_profile(args: ProfileArgs, config: &mut Config, formatter: &Formatter) -> Result<()> {
    let changed = match args.action {
        ProfileAction::List => {
            list_profiles(config, formatter);
            false
        }
        ProfileAction::Show => {
            show_active_profile(config, formatter)?;
            false
        }
        ProfileAction::Switch { name } => switch_profile(config, name, formatter)?,
        ProfileAction::Set {
            name,
            pipeline_config,
            workspace,
            data_dir,
        } => set_profile(
            config,
            name,
            Profile {
                config_path: pipeline_config,
                workspace_id: workspace,
                data_dir,
            },
            formatter,
        ),
        ProfileAction::Delete { name } => delete_profile(config, name, formatter)?,
    };

    if changed {
        config.save()?;
    }
    Ok(())
}

/// List all profiles.
fn list_profiles(config: &Config, formatter: &Formatter) {
    if config.profiles.is_empty() {
        println!("{}", formatter.info("No profiles configured"));
        return;
    }

    println!("Available profiles:");
    for (name, profile) in &config.profiles {
        if name == &config.active_profile {
            println!("* {}", formatter.success(name));
        } else {
            println!("  {}", name);
        }
        print_profile(profile, "    ");
    }
}

/// Show the active profile.
fn show_active_profile(config: &Config, formatter: &Formatter) -> Result<()> {
    let profile = config.get_active_profile()?;

    println!("Active profile: {}", formatter.success(&config.active_profile));
    print_profile(profile, "  ");
    Ok(())
}

fn print_profile(profile: &Profile, indent: &str) {
    let show = |path: &Option<PathBuf>| {
        path.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "-".to_string())
    };
    println!("{}Config: {}", indent, show(&profile.config_path));
    println!(
        "{}Workspace: {}",
        indent,
        profile.workspace_id.as_deref().unwrap_or("-")
    );
    println!("{}Data dir: {}", indent, show(&profile.data_dir));
}

/// Switch to a different profile.
fn switch_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<bool> {
    config.switch_profile(name.clone())?;
    println!(
        "{}",
        formatter.success(&format!("Switched to profile '{}'", name))
    );
    Ok(true)
}

/// Create or update a profile.
fn set_profile(config: &mut Config, name: String, profile: Profile, formatter: &Formatter) -> bool {
    let action = if config.profiles.contains_key(&name) {
        "Updated"
    } else {
        "Created"
    };

    config.set_profile(name.clone(), profile);
    println!(
        "{}",
        formatter.success(&format!("{} profile '{}'", action, name))
    );
    true
}

/// Delete a profile.
fn delete_profile(config: &mut Config, name: String, formatter: &Formatter) -> Result<bool> {
    if name == config.active_profile {
        return Err(crate::error::CliError::NotPermitted(
            "Cannot delete the active profile".to_string(),
        ));
    }

    if config.profiles.remove(&name).is_some() {
        println!(
            "{}",
            formatter.success(&format!("Deleted profile '{}'", name))
        );
        Ok(true)
    } else {
        println!(
            "{}",
            formatter.warning(&format!("Profile '{}' does not exist", name))
        );
        Ok(false)
    }
}
