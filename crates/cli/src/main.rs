use clap::{Parser, Subcommand};
use converter_core::{
    links::{extract_urls, is_domain_link},
    LinkStore, MongoConfig, MongoLinkStore, Shortener, ShortenerConfig, ViralboxShortener,
};

#[derive(Parser)]
#[command(name = "converter")]
#[command(about = "Link converter bot admin CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a shortener API key for a Telegram user
    SetApi {
        /// Telegram user id
        user_id: i64,
        /// Shortener API key
        api_key: String,
    },
    /// Show the stored API key for a Telegram user
    GetApi {
        /// Telegram user id
        user_id: i64,
    },
    /// Resolve a short link to its long URL
    Lookup {
        /// Short link as stored in the links collection
        short_url: String,
    },
    /// Convert a short link with an API key, without Telegram
    Convert {
        /// Shortener API key to convert with
        api_key: String,
        /// Short link to convert
        url: String,
    },
    /// List the URLs in some text and whether each would be accepted
    Extract {
        /// Text to scan
        text: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::SetApi { user_id, api_key }) => {
            let store = connect().await?;
            match store.save_api_key(user_id, api_key.trim()).await {
                Ok(()) => println!("Saved API key for user {}", user_id),
                Err(e) => eprintln!("Error saving API key: {}", e),
            }
        }
        Some(Commands::GetApi { user_id }) => {
            let store = connect().await?;
            match store.get_api_key(user_id).await {
                Ok(Some(key)) => println!("{}", key),
                Ok(None) => println!("No API key stored for user {}", user_id),
                Err(e) => eprintln!("Error reading API key: {}", e),
            }
        }
        Some(Commands::Lookup { short_url }) => {
            let store = connect().await?;
            match store.find_long_url(&short_url).await {
                Ok(Some(long_url)) => println!("{}", long_url),
                Ok(None) => println!("Link not found: {}", short_url),
                Err(e) => eprintln!("Error looking up link: {}", e),
            }
        }
        Some(Commands::Convert { api_key, url }) => {
            let shortener_cfg = ShortenerConfig::from_env()?;
            if !is_domain_link(&url, shortener_cfg.domain()) {
                eprintln!("Only {} links are supported: {}", shortener_cfg.domain(), url);
                return Ok(());
            }

            let store = connect().await?;
            let Some(long_url) = store.find_long_url(&url).await? else {
                eprintln!("Link not found: {}", url);
                return Ok(());
            };

            let shortener = ViralboxShortener::from_config(&shortener_cfg)?;
            match shortener.shorten(&api_key, &long_url).await {
                Ok(Some(short_url)) => {
                    store.save_converted(&long_url, &short_url).await?;
                    println!("{}", short_url);
                }
                Ok(None) => eprintln!("Shortener rejected the API key or URL"),
                Err(e) => eprintln!("Error shortening link: {}", e),
            }
        }
        Some(Commands::Extract { text }) => {
            let shortener_cfg = ShortenerConfig::from_env()?;
            let urls = extract_urls(&text);
            if urls.is_empty() {
                println!("No links found.");
            }
            for url in urls {
                let verdict = if is_domain_link(&url, shortener_cfg.domain()) {
                    "accepted"
                } else {
                    "rejected"
                };
                println!("{} {}", verdict, url);
            }
        }
        None => {
            println!("Use 'converter --help' for commands");
        }
    }

    Ok(())
}

async fn connect() -> Result<MongoLinkStore, Box<dyn std::error::Error>> {
    let cfg = MongoConfig::from_env()?;
    Ok(MongoLinkStore::connect(&cfg).await?)
}
