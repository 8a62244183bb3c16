//! `replica preview`: show what a clone would change.

use super::template_filter;
use crate::config::{ConfigFile, HookPhase, HookSpec};
use crate::error::Result;
use crate::logger::success;
use crate::preview::{preview, Preview};
use crate::processor::Processor;
use crate::prompt::{resolve_values, Prompter};
use colored::Colorize;
use log::{info, warn};
use std::path::Path;

fn print_preview(preview: &Preview) {
    info!("Directory change(s) ({})", preview.directories.len());
    for (from, to) in &preview.directories {
        println!("{} -> {}", from.display().to_string().red(), to.display().to_string().green());
    }

    info!("File change(s) ({})", preview.files.len());
    for (from, to) in &preview.files {
        println!("{} -> {}", from.display().to_string().red(), to.display().to_string().green());
    }

    info!("Content change(s) ({})", preview.content_change_count());
    for (path, changes) in &preview.contents {
        for change in changes {
            info!("{} line {}", path.display(), change.line);
            println!("{}", format!("- {}", change.raw).red());
            println!("{}", format!("+ {}", change.rewritten).green());
        }
    }
}

fn print_hooks(phase: HookPhase, hooks: &[&HookSpec]) {
    info!("\"{}\" hook(s) that will trigger ({})", phase, hooks.len());
    for (index, hook) in hooks.iter().enumerate() {
        let name = hook.name.clone().unwrap_or_else(|| format!("<unnamed hook {index}>"));
        println!("{}", format!("{name}: {} step(s)", hook.steps.len()).green());
        for step in &hook.steps {
            println!("\t- {}", step.magenta());
        }
        if !hook.ignore_error {
            println!("{}", "will fail if an error occurs".red());
        }
        if !hook.ignore_user_skip {
            println!("{}", "will fail if user skip".red());
        }
    }
}

pub fn run(dir: &Path, prompt: &dyn Prompter) -> Result<()> {
    let Some(config_file) = ConfigFile::discover(dir)? else {
        warn!("No configuration file found in '{}', nothing to preview", dir.display());
        return Ok(());
    };

    info!("Previewing '{}'", dir.display());
    let variables = config_file.variables();
    let values = resolve_values(prompt, variables)?;

    let filter = template_filter(dir, &config_file.config)?;
    let processor = Processor::new(dir, variables, &values);
    let result = preview(&processor, filter.entries());
    success("Preview generated");

    print_preview(&result);
    for phase in HookPhase::ALL {
        print_hooks(phase, &config_file.config.hooks_for(phase));
    }
    Ok(())
}
