use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info, warn};

use shareurl::network::{get_raw_data, ping, PING_FAILED};
use shareurl::{explode, explode_sub, outbounds_document, CoreType, OrderedMap, Settings};

/// Parse proxy share links and turn them into proxy-core outbounds
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a one-line summary of each link
    Parse {
        #[arg(required = true, value_name = "LINK")]
        links: Vec<String>,
    },
    /// Print the outbound object of a single link
    Outbound {
        /// Target core: xray, v2ray, sing-box or mihomo
        #[arg(long)]
        core: Option<CoreType>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(value_name = "LINK")]
        link: String,
    },
    /// Convert a whole subscription into an outbound list
    Sub(SubArgs),
    /// Measure the latency of a node
    Ping {
        #[arg(value_name = "LINK")]
        link: String,
    },
}

#[derive(Args, Debug)]
#[group(required = true, multiple = false, id = "source")]
struct SubSource {
    /// Subscription URL
    #[arg(long, value_name = "URL")]
    url: Option<String>,
    /// Local subscription file
    #[arg(long, value_name = "FILE")]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct SubArgs {
    #[command(flatten)]
    source: SubSource,
    #[arg(long)]
    core: Option<CoreType>,
    #[arg(long, value_name = "TAG")]
    tag_prefix: Option<String>,
    /// Write the document here instead of stdout
    #[arg(short, long, value_name = "OUTPUT_FILE")]
    output: Option<PathBuf>,
}

fn render(core: CoreType, document: &OrderedMap) -> Result<String> {
    let text = match core {
        CoreType::Mihomo => document.to_yaml_string()?,
        _ => document.to_json_pretty()?,
    };
    Ok(text)
}

fn run_parse(links: &[String]) -> Result<()> {
    let mut failed = 0;
    for link in links {
        match explode(link) {
            Ok(node) => println!("{}", node),
            Err(e) => {
                error!("{}", e);
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{} of {} links could not be parsed", failed, links.len());
    }
    Ok(())
}

fn run_sub(args: SubArgs, settings: &Settings) -> Result<()> {
    let core = args.core.unwrap_or(settings.core_type);
    let tag_prefix = args.tag_prefix.unwrap_or_else(|| settings.tag.clone());

    let content = match (&args.source.url, &args.source.file) {
        (Some(url), _) => {
            info!("fetching subscription {}", url);
            let raw = get_raw_data(url, &settings.http_options())
                .with_context(|| format!("cannot fetch subscription {}", url))?;
            String::from_utf8_lossy(&raw).into_owned()
        }
        (None, Some(file)) => fs::read_to_string(file)
            .with_context(|| format!("cannot read subscription {}", file.display()))?,
        (None, None) => bail!("either --url or --file is required"),
    };

    let mut nodes: Vec<_> = explode_sub(&content).into_iter().filter_map(Result::ok).collect();
    nodes.retain(|node| match node.to_outbound_with_tag(core, &tag_prefix) {
        Ok(_) => true,
        Err(e) => {
            warn!("skipping {}: {}", node, e);
            false
        }
    });
    if nodes.is_empty() {
        bail!("subscription contains no node usable with {}", core);
    }

    let document = outbounds_document(&nodes, core, &tag_prefix)?;
    let text = render(core, &document)?;
    match args.output {
        Some(path) => {
            fs::write(&path, text).with_context(|| format!("cannot write {}", path.display()))?;
            info!("wrote {} outbounds to {}", nodes.len(), path.display());
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    env_logger::init_from_env(Env::default().default_filter_or(settings.log_level.as_str()));

    match cli.command {
        Command::Parse { links } => run_parse(&links),
        Command::Outbound { core, tag, link } => {
            let core = core.unwrap_or(settings.core_type);
            let tag = tag.unwrap_or_else(|| settings.tag.clone());
            let node = explode(&link)?;
            let outbound = node.to_outbound_with_tag(core, &tag)?;
            println!("{}", render(core, &outbound)?);
            Ok(())
        }
        Command::Sub(sub) => run_sub(sub, &settings),
        Command::Ping { link } => {
            let node = explode(&link)?;
            let elapsed = ping(node.probe_protocol(), &node.address, node.port);
            if elapsed == PING_FAILED {
                bail!("{} is unreachable", node.endpoint());
            }
            println!("{} {}ms", node, elapsed);
            Ok(())
        }
    }
}
