//! Command dispatch: each subcommand mounts a layout on a fresh app.

use std::future::Future;
use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::App;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::NodeId;
use crate::infrastructure::traits::RealFileSystem;
use crate::infrastructure::{InfraError, LayoutLoader};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Tree { layout }) => run_async(cmd_tree(cli, layout)),
        Some(Commands::Query { layout, selector }) => run_async(cmd_query(cli, layout, selector)),
        Some(Commands::Remove {
            layout,
            selectors,
            tab,
            focus,
        }) => run_async(cmd_remove(cli, layout, selectors, *tab, focus.as_deref())),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(cli),
            ConfigCommands::Path => cmd_config_path(),
        },
        Some(Commands::Completion { shell }) => {
            cmd_completion(*shell);
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

fn run_async(fut: impl Future<Output = CliResult<()>>) -> CliResult<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| InfraError::io("start runtime", e))?;
    runtime.block_on(fut)
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    Ok(Settings::load(cli.config.as_deref())?)
}

/// Starts an app and mounts the layout at `path` on its screen.
async fn mount_layout(cli: &Cli, path: &Path) -> CliResult<App> {
    let settings = load_settings(cli)?;
    let layout = LayoutLoader::new(Arc::new(RealFileSystem)).load(path)?;
    let app = App::start(settings);
    let roots = app.mount(layout.into_widgets()).await?;
    debug!(roots = roots.len(), "layout mounted");
    Ok(app)
}

fn describe(app: &App, node: NodeId) -> String {
    app.node(node)
        .map(|data| data.to_string())
        .unwrap_or_else(|| node.to_string())
}

#[instrument(skip(cli))]
async fn cmd_tree(cli: &Cli, layout: &Path) -> CliResult<()> {
    let app = mount_layout(cli, layout).await?;
    output::info(&app.render());
    let (nodes, depth) = app.with_dom(|dom| (dom.len() - 1, dom.depth()));
    output::detail(&format!("{} widgets, depth {}", nodes, depth));
    app.shutdown().await?;
    Ok(())
}

#[instrument(skip(cli))]
async fn cmd_query(cli: &Cli, layout: &Path, selector: &str) -> CliResult<()> {
    let app = mount_layout(cli, layout).await?;
    let matches = app.query(selector)?;
    if matches.is_empty() {
        output::warning(&format!("no nodes match '{}'", selector));
    } else {
        output::header(&format!("{} match(es) for '{}'", matches.len(), selector));
        for node in matches.iter() {
            output::detail(&format!("{}  {}", node, describe(&app, node)));
        }
    }
    app.shutdown().await?;
    Ok(())
}

#[instrument(skip(cli))]
async fn cmd_remove(
    cli: &Cli,
    layout: &Path,
    selectors: &[String],
    tab: usize,
    focus: Option<&str>,
) -> CliResult<()> {
    let app = mount_layout(cli, layout).await?;

    for _ in 0..tab {
        app.press("tab").await?;
    }
    if let Some(selector) = focus {
        let target = app.query_one(selector)?;
        app.set_focus(target).await?;
    }
    let focused_before = app.focused().map(|node| describe(&app, node));

    let mut targets = Vec::new();
    for selector in selectors {
        targets.extend(app.query(selector)?);
    }
    let descriptions: Vec<(NodeId, String)> = targets
        .iter()
        .unique()
        .map(|&node| (node, describe(&app, node)))
        .collect();

    let report = app.remove(targets).await?;

    output::header(&format!(
        "removed {} node(s) for {}",
        report.len(),
        selectors.iter().map(|s| format!("'{}'", s)).join(", ")
    ));
    for (node, description) in &descriptions {
        if report.removed.contains(node) {
            output::removed(&format!("{}  {}", node, description));
        }
    }
    output::info(&app.render());
    output::action(
        "focus",
        &format!(
            "{} -> {}",
            focused_before.as_deref().unwrap_or("none"),
            app.focused()
                .map(|node| describe(&app, node))
                .as_deref()
                .unwrap_or("none")
        ),
    );
    app.shutdown().await?;
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> CliResult<()> {
    let settings = load_settings(cli)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path() -> CliResult<()> {
    match global_config_path() {
        Some(path) => {
            output::info(&path.display());
            Ok(())
        }
        None => Err(CliError::Usage(
            "cannot determine config directory for this platform".to_string(),
        )),
    }
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
