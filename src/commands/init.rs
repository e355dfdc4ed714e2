use htmlx::config::{CONFIG_FILE, HtmlxConfig, ProjectConfig};

use crate::InitArgs;

const STARTER_PAGE: &str = r#"header.site-header
  h1#title { Welcome to HTMLx }
  p.lead { Edit src/index.htmlx and run htmlx serve }

main
  section.card(animate: "fade 1s ease-in") {
    h2 { Hello }
    p { Signed in as span(⚡-data: "username") { guest } }
  }
  button.primary(⚡-call: "refresh") { Refresh }
"#;

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = if args.path.is_relative() {
        std::env::current_dir()?.join(&args.path)
    } else {
        args.path.clone()
    };

    if !path.exists() {
        if args.create {
            tokio::fs::create_dir_all(&path).await?;
            println!("Created directory {path}", path = path.display());
        } else {
            return Err(anyhow::anyhow!(
                "Directory does not exist: {path}",
                path = path.display()
            ));
        }
    }

    let config_file = path.join(CONFIG_FILE);
    if config_file.exists() {
        return Err(anyhow::anyhow!(
            "{config_file} already exists",
            config_file = config_file.display()
        ));
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| ProjectConfig::default().name);
    let default_config = HtmlxConfig {
        project: ProjectConfig { name },
        ..HtmlxConfig::default()
    };

    println!("Initializing project in {}", path.display());

    let config_text = serde_yaml::to_string(&default_config)?;
    tokio::fs::write(&config_file, config_text).await?;
    println!("Created config file {}", config_file.display());

    let source_dir = path.join(&default_config.build.source);
    let starter = source_dir.join("index.htmlx");
    if !starter.exists() {
        tokio::fs::create_dir_all(&source_dir).await?;
        tokio::fs::write(&starter, STARTER_PAGE).await?;
        println!("Created starter page {}", starter.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_page_compiles() {
        let bundle = htmlx::compile(
            STARTER_PAGE,
            "index.htmlx",
            &htmlx::CompileOptions::default(),
        )
        .unwrap();
        assert!(bundle.html.contains(r#"data-dynamic="username""#));
        assert!(bundle.js.contains("\"refresh\""));
        assert!(bundle.css.contains("@keyframes fade"));
    }
}
