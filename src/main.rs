//! `tourcms` command-line interface
//!
//! Prints site content as pretty JSON, builds image URLs and serves the
//! JSON API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;

use tourcms::api::AppState;
use tourcms::image_url::{AutoMode, FitMode};
use tourcms::models::PostFilter;
use tourcms::{AssetId, SanityClient, TourCmsConfig, logging, queries, web};

#[derive(Parser)]
#[command(name = "tourcms")]
#[command(about = "Content tools for the tour operator website", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List tours
    Tours {
        /// Only featured tours
        #[arg(long)]
        featured: bool,

        /// Only tours of this destination
        #[arg(long, value_name = "SLUG")]
        destination: Option<String>,
    },

    /// Show one tour
    Tour { slug: String },

    /// List destinations
    Destinations,

    /// Show one destination with its tours
    Destination { slug: String },

    /// List blog posts, newest first
    Posts {
        /// Case-insensitive search in title and excerpt
        #[arg(long)]
        search: Option<String>,

        /// Exact category name
        #[arg(long)]
        category: Option<String>,
    },

    /// Show one blog post
    Post { slug: String },

    /// List testimonials
    Testimonials {
        #[arg(long)]
        featured: bool,
    },

    /// Show the site settings
    Settings,

    /// Print the WhatsApp chat link from the site settings
    Whatsapp {
        /// Prefilled chat message
        #[arg(long)]
        message: Option<String>,
    },

    /// Build an image CDN URL from an asset reference or CDN URL
    Image {
        #[arg(value_name = "REF")]
        reference: String,

        #[arg(long)]
        width: Option<u32>,

        #[arg(long)]
        height: Option<u32>,

        /// clip, crop, fill, fillmax, max, scale or min
        #[arg(long)]
        fit: Option<FitMode>,

        /// Let the CDN pick the output format
        #[arg(long)]
        auto_format: bool,
    },

    /// Run the JSON API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Verify credentials and reachability of the content store
    Check,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn found<T: Serialize>(value: Option<T>, what: &str, slug: &str) -> Result<()> {
    match value {
        Some(value) => print_json(&value),
        None => bail!("{what} '{slug}' not found"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = TourCmsConfig::load_from_path(cli.config)?;
    logging::init(&config.logging, cli.verbose)?;

    let client = Arc::new(SanityClient::new(&config.cms)?);
    let source = client.as_ref();

    match cli.command {
        Commands::Tours {
            featured,
            destination,
        } => {
            let tours = match destination {
                Some(slug) => {
                    let mut tours = queries::tours_by_destination(source, &slug).await?;
                    if featured {
                        tours.retain(|tour| tour.featured);
                    }
                    tours
                }
                None if featured => queries::featured_tours(source).await?,
                None => queries::tours(source).await?,
            };
            print_json(&tours)?;
        }
        Commands::Tour { slug } => {
            found(queries::tour_by_slug(source, &slug).await?, "Tour", &slug)?;
        }
        Commands::Destinations => print_json(&queries::destinations(source).await?)?,
        Commands::Destination { slug } => {
            let destination = queries::destination_by_slug(source, &slug).await?;
            found(destination, "Destination", &slug)?;
        }
        Commands::Posts { search, category } => {
            let posts = queries::posts(source).await?;
            print_json(&PostFilter::new(search, category).apply(posts))?;
        }
        Commands::Post { slug } => {
            found(queries::post_by_slug(source, &slug).await?, "Post", &slug)?;
        }
        Commands::Testimonials { featured } => {
            let testimonials = if featured {
                queries::featured_testimonials(source).await?
            } else {
                queries::testimonials(source).await?
            };
            print_json(&testimonials)?;
        }
        Commands::Settings => match queries::site_settings(source).await? {
            Some(settings) => print_json(&settings)?,
            None => bail!("Site settings not found"),
        },
        Commands::Whatsapp { message } => {
            let Some(settings) = queries::site_settings(source).await? else {
                bail!("Site settings not found");
            };
            match settings.whatsapp_link(message.as_deref()) {
                Some(link) => println!("{link}"),
                None => bail!("No WhatsApp number configured"),
            }
        }
        Commands::Image {
            reference,
            width,
            height,
            fit,
            auto_format,
        } => {
            let mut builder = client.image_url(&AssetId::parse(&reference)?);
            if let Some(width) = width {
                builder = builder.width(width);
            }
            if let Some(height) = height {
                builder = builder.height(height);
            }
            if let Some(fit) = fit {
                builder = builder.fit(fit);
            }
            if auto_format {
                builder = builder.auto(AutoMode::Format);
            }
            println!("{}", builder.url());
        }
        Commands::Serve { port } => {
            let mut server = config.server.clone();
            if let Some(port) = port {
                server.port = port;
            }
            let state = AppState::new(
                client.clone(),
                client.images().clone(),
                config.images.clone(),
            );
            web::run(&server, state).await?;
        }
        Commands::Check => {
            let tours = client.health_check().await?;
            println!("OK: {} reachable, {} tours", client.query_url(), tours);
        }
    }

    Ok(())
}
