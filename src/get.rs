//! Plugin retrieval by identifier.
//!
//! Used by the `catalog get` CLI command and `GET /plugins/{id}`.

use anyhow::Result;

use plugin_catalog_core::models::Plugin;

use crate::config::Config;
use crate::export::load_catalog;

/// Core get function returning the stored record (the first one, if the
/// identifier is listed twice).
pub fn get_plugin(config: &Config, id: &str) -> Result<Option<Plugin>> {
    Ok(load_catalog(&config.catalog.output)?.and_then(|c| c.into_iter().find(|p| p.id == id)))
}

/// CLI entry point: calls get_plugin and prints to stdout.
pub fn run_get(config: &Config, id: &str) -> Result<()> {
    let plugin = match get_plugin(config, id)? {
        Some(p) => p,
        None => {
            eprintln!("Error: plugin not found: {}", id);
            std::process::exit(1);
        }
    };
    print!("{}", render_plugin(&plugin));
    Ok(())
}

pub fn render_plugin(plugin: &Plugin) -> String {
    let mut out = String::new();
    out.push_str("--- Plugin ---\n");
    out.push_str(&format!("id:          {}\n", plugin.id));
    out.push_str(&format!("category:    {}\n", plugin.category));
    out.push_str(&format!("description: {}\n", plugin.description));
    out.push_str(&format!("install:     {}\n", plugin.install_command));
    out.push_str(&format!("source:      {}\n", plugin.github_url));
    out.push('\n');

    out.push_str(&format!("--- Agents ({}) ---\n", plugin.agents.len()));
    for agent in &plugin.agents {
        out.push_str(&format!("[{}] {}\n", agent.name, agent.description));
        if let Some(ref model) = agent.model {
            out.push_str(&format!("  model: {}\n", model));
        }
        if let Some(ref color) = agent.color {
            out.push_str(&format!("  color: {}\n", color));
        }
        let prompt = agent.prompt.trim();
        if !prompt.is_empty() {
            for line in prompt.lines() {
                out.push_str(&format!("  | {}\n", line));
            }
        }
        out.push('\n');
    }

    out.push_str(&format!("--- Commands ({}) ---\n", plugin.commands.len()));
    for command in &plugin.commands {
        out.push_str(&format!("/{}  {}\n", command.name, command.description));
    }
    out.push('\n');

    out.push_str("--- README ---\n");
    out.push_str(plugin.readme.trim_end());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use plugin_catalog_core::models::{Agent, Command};

    #[test]
    fn renders_agents_and_commands() {
        let plugin = Plugin {
            id: "rev".into(),
            name: "rev".into(),
            category: "Code Quality Testing".into(),
            description: "Reviews code".into(),
            readme: "# Rev\nReviews code\n".into(),
            agents: vec![Agent {
                name: "reviewer".into(),
                description: "Checks diffs".into(),
                prompt: "Look closely.\nBe kind.".into(),
                model: Some("sonnet".into()),
                color: None,
                file_name: Some("reviewer.md".into()),
            }],
            commands: vec![Command {
                name: "review".into(),
                description: "Run a review".into(),
                file_name: None,
            }],
            install_command: "/plugin install x".into(),
            github_url: "https://example.test/rev".into(),
        };
        let text = render_plugin(&plugin);
        assert!(text.contains("--- Agents (1) ---"));
        assert!(text.contains("[reviewer] Checks diffs"));
        assert!(text.contains("  model: sonnet"));
        assert!(!text.contains("color:"));
        assert!(text.contains("  | Be kind."));
        assert!(text.contains("/review  Run a review"));
        assert!(text.contains("install:     /plugin install x"));
    }

    fn stub(id: &str, category: &str) -> Plugin {
        Plugin {
            id: id.into(),
            name: id.into(),
            category: category.into(),
            description: String::new(),
            readme: String::new(),
            agents: vec![],
            commands: vec![],
            install_command: String::new(),
            github_url: String::new(),
        }
    }

    #[test]
    fn get_plugin_reads_saved_catalog() {
        let tmp = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.catalog.output = tmp.path().join("plugins.json");

        assert_eq!(get_plugin(&config, "a").unwrap(), None);

        let catalog = vec![
            stub("a", "Documentation"),
            stub("b", "Security"),
            stub("a", "Git Workflow"),
        ];
        crate::export::write_catalog(&config.catalog.output, &catalog).unwrap();

        let found = get_plugin(&config, "a").unwrap().unwrap();
        assert_eq!(found.category, "Documentation");
        assert_eq!(get_plugin(&config, "nope").unwrap(), None);
    }
}
