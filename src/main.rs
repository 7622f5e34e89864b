use anyhow::Context as _;
use simplemap_rs::{Config, Dictionary, Renderer, Tag};
use std::io::Read as _;

fn usage<T>(err: &'static str) -> anyhow::Result<T> {
    let exe = std::env::args().next().unwrap_or_default();
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Usage: {exe} [options] <tag>\n");
    println!("Use '-' as the tag to read it from stdin");
    println!("or, use environment variables:");
    println!("    SIMPLEMAP_TAG");
    println!("    SIMPLEMAP_SERVICE_URL");
    println!("    SIMPLEMAP_VIEWER_URL");
    println!("    SIMPLEMAP_SYNTAX_HELP_URL\n");
    println!("Options:");
    println!("    --config: JSON configuration file");
    println!("    --messages: JSON message file, overlaid on the English messages");
    println!("    --service-url: Static map image service URL prefix\n");
    Err(anyhow::Error::msg(err))
}

fn free_arg(
    args: &mut pico_args::Arguments,
    key: &str,
    err: &'static str,
) -> anyhow::Result<String> {
    if let Some(arg) = args.opt_free_from_str::<String>()? {
        Ok(arg)
    } else if let Ok(arg) = std::env::var(key) {
        Ok(arg)
    } else {
        usage(err)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("warn"));

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return usage("Help requested");
    }
    let config_path = args.opt_value_from_str::<_, String>("--config")?;
    let messages_path = args.opt_value_from_str::<_, String>("--messages")?;
    let service_url = args.opt_value_from_str::<_, String>("--service-url")?;
    let _ = args.contains("--");
    let source = free_arg(&mut args, "SIMPLEMAP_TAG", "Missing tag argument")?;

    if !args.finish().is_empty() {
        return usage("Unknown extra arguments passed");
    }

    let mut config = match config_path {
        Some(path) => Config::from_file(&path)?,
        None => Config::default(),
    }
    .with_env();
    if let Some(service_url) = service_url {
        config.service_url = service_url;
    }

    let mut messages = Dictionary::english();
    if let Some(path) = messages_path {
        messages.extend(Dictionary::from_file(&path)?);
    }

    let source = if source == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("could not read tag from stdin")?;
        text
    } else {
        source
    };

    let tag = Tag::parse(&source).with_context(|| format!("could not parse '{source}'"))?;
    log::debug!("rendering <{}> with {config:?}", tag.name);

    let renderer = Renderer::new(config, messages);
    println!("{}", renderer.render(&tag)?);
    Ok(())
}
