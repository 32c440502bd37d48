use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use lexispark::{
    logging, CategoryDefinition, CategorySource, DailyClock, DailySeed, FilterConfig, GuessConfirmer,
    GuessOutcome, GuessSession, GuessVerifier, HttpPuzzleClient, Library, LibraryBuilder,
    LocalConfirmer, PuzzleRef, PuzzleService, PuzzleStart, Rejection, SessionStore,
};

#[derive(Parser)]
#[command(author, version, long_about = None)]
#[command(about = "LexiSpark - build category libraries and play word-list puzzles")]
struct Cli {
    /// Category library built with `lexispark build`
    #[arg(long, global = true, env = "LEXISPARK_LIBRARY")]
    library: Option<PathBuf>,

    /// Puzzle server to use instead of a local library
    #[arg(long, global = true, env = "LEXISPARK_URL")]
    url: Option<String>,

    /// Puzzle language
    #[arg(long, global = true, env = "LEXISPARK_LANGUAGE", default_value = "en")]
    language: String,

    /// Offset in hours of the timezone that decides the daily date
    #[arg(long, global = true, env = "LEXISPARK_UTC_OFFSET", default_value_t = 0, allow_negative_numbers = true)]
    utc_offset: i32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a library from dictionaries and category definitions
    Build {
        /// `LANG:DICTIONARY:CATEGORIES`, repeatable
        #[arg(long = "source", required = true)]
        sources: Vec<String>,

        /// Output library file
        #[arg(long, short)]
        output: PathBuf,

        /// Target false-positive rate of every category filter
        #[arg(long, default_value_t = default_false_positive_rate())]
        false_positive_rate: f64,
    },
    /// List the categories of a language
    Categories,
    /// Open a puzzle and print the start payload
    Start {
        /// `daily`, `hidden-daily`, `random` or a category id
        puzzle: PuzzleRef,
    },
    /// Ask for the authoritative answer to a guess
    Guess {
        puzzle: PuzzleRef,
        word: String,
    },
    /// Run the filter of a puzzle against words, without asking the server
    Check {
        puzzle: PuzzleRef,
        #[arg(required = true)]
        words: Vec<String>,
    },
    /// Show the daily selection for a date
    Daily {
        /// Date to seed, today by default
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Selection label
        #[arg(long, default_value = "daily")]
        label: String,

        /// Number of candidates to select among
        #[arg(long)]
        size: Option<usize>,
    },
    /// Play a puzzle interactively
    Play {
        puzzle: PuzzleRef,

        /// Directory for saved progress
        #[arg(long, default_value = ".lexispark")]
        state_dir: PathBuf,
    },
}

fn default_false_positive_rate() -> f64 {
    FilterConfig::default().false_positive_rate
}

/// Where puzzles come from
enum Backend {
    Local(PuzzleService<Library>),
    Remote(HttpPuzzleClient),
}

impl Backend {
    fn open(cli: &Cli, clock: DailyClock) -> anyhow::Result<Self> {
        if let Some(url) = &cli.url {
            return Ok(Backend::Remote(HttpPuzzleClient::new(url)?));
        }
        let Some(path) = &cli.library else {
            bail!("either --library or --url is required");
        };
        let library = Library::load(path)
            .with_context(|| format!("failed to load library {}", path.display()))?;
        Ok(Backend::Local(PuzzleService::with_clock(library, clock)))
    }

    async fn start(&self, puzzle: PuzzleRef, language: &str) -> lexispark::Result<PuzzleStart> {
        match self {
            Backend::Local(service) => service.start(puzzle, language),
            Backend::Remote(client) => client.start(puzzle, language).await,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("info")?;
    let cli = Cli::parse();

    let clock = DailyClock::with_offset_hours(cli.utc_offset)
        .with_context(|| format!("UTC offset out of range: {}", cli.utc_offset))?;

    match &cli.command {
        Commands::Build {
            sources,
            output,
            false_positive_rate,
        } => {
            let config = FilterConfig::default().with_false_positive_rate(*false_positive_rate);
            handle_build(sources, output, config)?;
        }
        Commands::Categories => {
            let Backend::Local(service) = Backend::open(&cli, clock)? else {
                bail!("listing categories needs a local --library");
            };
            let listings = service.source().listings(&cli.language);
            println!("{}", serde_json::to_string_pretty(&listings)?);
        }
        Commands::Start { puzzle } => {
            let backend = Backend::open(&cli, clock)?;
            let start = backend.start(*puzzle, &cli.language).await?;
            println!("{}", serde_json::to_string_pretty(&start)?);
        }
        Commands::Guess { puzzle, word } => {
            let backend = Backend::open(&cli, clock)?;
            let response = match &backend {
                Backend::Local(service) => {
                    let request = lexispark::GuessRequest { word: word.clone() };
                    service.guess(*puzzle, &cli.language, &request)?
                }
                Backend::Remote(client) => client.guess(*puzzle, &cli.language, word).await?,
            };
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Check { puzzle, words } => {
            let backend = Backend::open(&cli, clock)?;
            let filter = backend.start(*puzzle, &cli.language).await?.filter()?;
            for word in words {
                let verdict = if filter.check_word(word) { "maybe" } else { "no" };
                println!("{word}: {verdict}");
            }
        }
        Commands::Daily { date, label, size } => {
            let date = date.unwrap_or_else(|| clock.today());
            let seed = DailySeed::new(date.year(), date.month(), date.day(), label)?;
            println!("seed:   {}", seed.seed_string());
            println!("number: {}", seed.number());
            if let Some(size) = size {
                println!("index:  {}", seed.index(*size)?);
            }
        }
        Commands::Play { puzzle, state_dir } => {
            let backend = Backend::open(&cli, clock)?;
            let start = backend.start(*puzzle, &cli.language).await?;
            let store = SessionStore::new(state_dir);
            let expires_at = match puzzle {
                PuzzleRef::Daily | PuzzleRef::HiddenDaily => clock.next_rollover(Utc::now()),
                _ => None,
            };
            let session_ref = start.session_ref(*puzzle);

            match &backend {
                Backend::Local(service) => {
                    let confirmer = LocalConfirmer::new(service, session_ref, &cli.language);
                    handle_play(*puzzle, &start, confirmer, &store, expires_at).await?;
                }
                Backend::Remote(client) => {
                    let confirmer = client.confirmer(session_ref, &cli.language);
                    handle_play(*puzzle, &start, confirmer, &store, expires_at).await?;
                }
            }
        }
    }

    Ok(())
}

fn handle_build(sources: &[String], output: &Path, config: FilterConfig) -> anyhow::Result<()> {
    let mut builder = LibraryBuilder::new(config);
    for source in sources {
        let parts: Vec<&str> = source.splitn(3, ':').collect();
        let [language, dictionary, categories] = parts.as_slice() else {
            bail!("invalid source {source}, use LANG:DICTIONARY:CATEGORIES");
        };

        let dictionary = fs::read_to_string(dictionary)
            .with_context(|| format!("failed to read dictionary {dictionary}"))?;
        let definitions = fs::read_to_string(categories)
            .with_context(|| format!("failed to read categories {categories}"))?;
        let definitions = CategoryDefinition::parse_list(&definitions)?;
        builder.add_language(language, &dictionary, &definitions)?;
    }

    let library = builder.build()?;
    library.save(output)?;

    let counts: BTreeMap<&str, usize> = library
        .languages()
        .map(|language| {
            let count = library.valid_categories(language).len();
            (language, count)
        })
        .collect();
    for (language, count) in counts {
        println!("{language}: {count} playable categories");
    }
    println!("Library written to {}", output.display());
    Ok(())
}

async fn handle_play<C: GuessConfirmer>(
    puzzle: PuzzleRef,
    start: &PuzzleStart,
    confirmer: C,
    store: &SessionStore,
    expires_at: Option<chrono::DateTime<Utc>>,
) -> anyhow::Result<()> {
    let mut session = GuessSession::from_start(start)?;
    if let Some(snapshot) = store.load(&puzzle, session.blob_hash(), Utc::now())? {
        if session.restore(&snapshot) {
            println!("Resuming saved progress");
        }
    }
    // Sessions without a category id only exist until the daily rollover
    let deadline = if start.category_id.is_none() { expires_at } else { None };
    let verifier = GuessVerifier::new(session, confirmer).with_deadline(deadline);

    println!("{} - {} words", start.category_name, start.word_lengths.len());
    print_grid(&verifier.session());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while !verifier.session().is_complete() {
        let line = {
            let _quiet = logging::suppress_output();
            lines.next_line().await?
        };
        let Some(line) = line else { break };
        if line.trim() == ":quit" {
            break;
        }

        match verifier.guess(&line).await {
            Ok(GuessOutcome::Accepted { display, .. }) => {
                println!("+ {display}");
                let snapshot = verifier.session().snapshot(Utc::now(), expires_at);
                store.save(&puzzle, &snapshot)?;
                print_grid(&verifier.session());
            }
            Ok(GuessOutcome::Rejected(Rejection::Duplicate)) => println!("already found"),
            Ok(GuessOutcome::Rejected(Rejection::Empty)) => {}
            Ok(GuessOutcome::Rejected(_)) => println!("no"),
            Err(lexispark::Error::Expired) => {
                println!("This puzzle has expired, start today's to keep playing");
                break;
            }
            Err(e) => eprintln!("could not check guess: {e}"),
        }
    }

    let session = verifier.into_session();
    let elapsed = session.elapsed(Utc::now());
    println!(
        "{}/{} found in {}m{:02}s",
        session.found_count(),
        session.word_lengths().len(),
        elapsed.num_minutes(),
        elapsed.num_seconds() % 60
    );
    Ok(())
}

fn print_grid(session: &GuessSession) {
    for (slot, length) in session.slots().iter().zip(session.word_lengths()) {
        match slot {
            Some(word) => println!("  {word}"),
            None => println!("  {}", "_ ".repeat(*length).trim_end()),
        }
    }
}
