use clap::{Args, Parser, Subcommand};
use gallery_kit::check::check_site;
use gallery_kit::config::{self, SiteConfig};
use gallery_kit::content::FsSource;
use gallery_kit::exhibition::load_exhibition;
use gallery_kit::menu::load_menu;
use gallery_kit::navigate::{LocationSink, Navigator};
use gallery_kit::output;
use gallery_kit::probe::{FsProber, HttpProber, Prober};
use gallery_kit::render::render_exhibition_page;
use gallery_kit::resolve::{
    PageLocation, Resolution, ResolveOptions, Resolver, TargetKind, candidates, classify,
};
use gallery_kit::session::Session;
use reqwest::Url;
use std::path::{Path, PathBuf};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "gallery-kit")]
#[command(about = "Carousel engine and link resolver for static gallery sites")]
#[command(long_about = "\
Carousel engine and link resolver for static gallery sites

Menu links are written relative to the site root but rendered on pages at
any folder depth. gallery-kit resolves them the way the site's pages do:
by building a list of candidate URLs and probing until one exists.

Site layout:

  site/
  ├── site.toml                    # Config (optional, lives in --config DIR)
  ├── index.html
  ├── fellowship-data.json         # Fellows, bios, images
  ├── exhibition-data.json         # Exhibition strip
  ├── navigation-data.json         # Menu (optional, built-in menu otherwise)
  ├── program/
  │   └── fellowship.html
  └── about/
      └── mission.html

Run 'gallery-kit gen-config' to generate a documented site.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing site.toml
    #[arg(long, default_value = ".", global = true)]
    config: PathBuf,

    /// Log resolution steps to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// The page a link is clicked on.
#[derive(Args, Clone)]
struct PageArgs {
    /// Site-root path of the page, e.g. /program/calendar.html
    #[arg(long, default_value = "/index.html")]
    page: String,
}

#[derive(Subcommand)]
enum Command {
    /// List the candidate URLs for a menu target, in probe order
    Candidates {
        #[command(flatten)]
        page: PageArgs,
        target: String,
    },
    /// Resolve a menu target against a site on disk or a live site
    Resolve {
        #[command(flatten)]
        page: PageArgs,
        target: String,
        /// Built site directory
        #[arg(long, conflicts_with = "base_url", required_unless_present = "base_url")]
        site: Option<PathBuf>,
        /// Root URL of a live site
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Resolve every menu link from every page of a built site
    Check {
        /// Built site directory
        site: PathBuf,
    },
    /// Render the fellowship page from the site's content documents
    Render {
        #[command(flatten)]
        page: PageArgs,
        /// Built site directory
        site: PathBuf,
        /// Write HTML here instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Render the exhibition page from the site's content documents
    RenderExhibition {
        #[command(flatten)]
        page: PageArgs,
        /// Built site directory
        site: PathBuf,
        /// Write HTML here instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
    /// Print a stock site.toml with all options documented
    GenConfig,
}

/// Rendering never clicks; assignments are only logged.
struct LoggedLocation;

impl LocationSink for LoggedLocation {
    fn assign(&self, url: &str) {
        info!(%url, "location assigned");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let load_config = || -> Result<(SiteConfig, ResolveOptions), config::ConfigError> {
        let site_config = config::load_config(&cli.config)?;
        let options = ResolveOptions::from(&site_config.navigation);
        Ok((site_config, options))
    };

    match cli.command {
        Command::Candidates { page, target } => {
            let (_, options) = load_config()?;
            let location = PageLocation::new(&page.page);
            let list = match classify(&target) {
                TargetKind::Symbolic(t) => candidates(&location, &t, &options.aliases),
                _ => Vec::new(),
            };
            output::print_candidates(&location, &target, &list);
        }
        Command::Resolve {
            page,
            target,
            site,
            base_url,
        } => {
            let (_, options) = load_config()?;
            let location = PageLocation::new(&page.page);
            let found = match site {
                Some(site) => {
                    let prober = FsProber::new(site, &location);
                    run_resolve(prober, location, options, &target).await
                }
                None => {
                    let base_url = base_url.ok_or("either --site or --base-url is required")?;
                    let prober = HttpProber::new(page_url(&base_url, &page.page)?)?;
                    run_resolve(prober, location, options, &target).await
                }
            };
            if !found {
                std::process::exit(1);
            }
        }
        Command::Check { site } => {
            let (site_config, _) = load_config()?;
            let report = check_site(&site, &site_config).await?;
            output::print_check_report(&report);
            if !report.is_ok() {
                std::process::exit(1);
            }
        }
        Command::Render { page, site, out } => {
            let (site_config, options) = load_config()?;
            let location = PageLocation::new(&page.page);
            let prober = FsProber::new(&site, &location);
            let navigator = Navigator::new(
                Resolver::new(prober, location, options),
                LoggedLocation,
                site_config.navigation.on_not_found,
            );
            let session = Session::bootstrap(site_config, &FsSource::new(&site), navigator).await;
            write_html(out.as_deref(), &session.render().into_string())?;
        }
        Command::RenderExhibition { page, site, out } => {
            let (site_config, options) = load_config()?;
            let source = FsSource::new(&site);
            let view = load_exhibition(&source, &site_config.content.exhibition_data).await;
            let menu = load_menu(&source, site_config.content.navigation_data.as_deref()).await;
            let location = PageLocation::new(&page.page);
            let resolver = Resolver::new(FsProber::new(&site, &location), location, options);
            let markup = render_exhibition_page(&view, &menu, &site_config.site, &resolver.home_url());
            write_html(out.as_deref(), &markup.into_string())?;
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Resolve with probe progress printed as it happens. Returns whether the
/// target resolved.
async fn run_resolve<P: Prober>(
    prober: P,
    location: PageLocation,
    options: ResolveOptions,
    target: &str,
) -> bool {
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            println!("{}", output::format_probe_event(&event));
        }
    });
    let resolver = Resolver::new(prober, location, options).with_events(tx);
    let resolution = resolver.resolve(target).await;
    drop(resolver);
    let _ = printer.join();
    output::print_resolution(target, &resolution);
    matches!(resolution, Resolution::Resolved { .. })
}

/// URL of `page` on the live site at `base_url`. The base is treated as a
/// directory even without a trailing slash.
fn page_url(base_url: &str, page: &str) -> Result<Url, Box<dyn std::error::Error>> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(page.trim_start_matches('/'))?)
}

fn write_html(out: Option<&Path>, html: &str) -> std::io::Result<()> {
    match out {
        Some(path) => std::fs::write(path, html),
        None => {
            print!("{}", html);
            Ok(())
        }
    }
}
