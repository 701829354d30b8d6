//! Render command - Render one tag to HTML

use std::path::PathBuf;

use clap::Args;
use tessera_mosaic::{Attributes, Context, Director, DirectorOptions};
use tessera_tile::{PrintOptions, Value};

use crate::config::{load_config, resolve_base};

#[derive(Args)]
pub struct RenderArgs {
    /// Tag to render, e.g. `todo-list`
    pub tag: String,

    /// Directory holding the .part / .md templates (default: config, then `.`)
    #[arg(short, long)]
    pub base: Option<PathBuf>,

    /// Attribute passed to the tag as NAME=VALUE; VALUE is parsed as JSON
    /// when possible and used as a string otherwise
    #[arg(short, long = "attr", value_name = "NAME=VALUE", value_parser = parse_attribute)]
    pub attributes: Vec<(String, Value)>,

    /// Request path visible to scripts as `$context.path`
    #[arg(long, default_value = "/")]
    pub path: String,

    /// Trim text and omit the trailing newline
    #[arg(long)]
    pub trim: bool,

    /// Do not HTML-escape evaluated expressions
    #[arg(long)]
    pub no_escape: bool,

    /// Config file (default: ./tessera.config.json)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

pub fn run(args: RenderArgs) {
    let config = load_config(args.config.as_deref());

    let base = resolve_base(args.base, &config);
    let mut options = DirectorOptions {
        base: Some(base),
        ..config.director
    };
    if args.no_escape {
        options.express.escape = false;
    }
    let print = PrintOptions {
        trim: args.trim || config.print.trim,
    };

    let attributes: Attributes = args.attributes.into_iter().collect();
    let context = Context::new(args.path);
    let director = Director::new(options);

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start runtime: {e}");
            std::process::exit(1);
        }
    };

    match runtime.block_on(director.render(&args.tag, &context, attributes, print)) {
        Ok(Some(html)) => print!("{html}"),
        Ok(None) => {
            eprintln!("No template found for <{}>", args.tag);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error rendering <{}>: {e}", args.tag);
            std::process::exit(1);
        }
    }
}

fn parse_attribute(arg: &str) -> Result<(String, Value), String> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, found '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing attribute name in '{arg}'"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((name.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_attribute() {
        assert_eq!(parse_attribute("count=3"), Ok(("count".into(), json!(3))));
        assert_eq!(parse_attribute("gift=Joy"), Ok(("gift".into(), json!("Joy"))));
        assert_eq!(
            parse_attribute(r#"items=["a","b"]"#),
            Ok(("items".into(), json!(["a", "b"])))
        );
        assert_eq!(parse_attribute("empty="), Ok(("empty".into(), json!(""))));
        assert_eq!(parse_attribute("url=a=b"), Ok(("url".into(), json!("a=b"))));
        assert!(parse_attribute("novalue").is_err());
        assert!(parse_attribute("=3").is_err());
    }
}
