use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::info;

use dm_domains::cards::{Card, CardCatalog, CardId, SqliteCatalog, SqliteSource};
use dm_domains::core::{EngineConfig, Error, Result};
use dm_domains::domain::{Deck, DeckChecker, Domain, DomainContext};
use dm_domains::lookup::ReverseIndex;

#[derive(Debug, Parser)]
#[command(name = "dm-domains", about = "Deck Master domain generator and reverse domain search")]
struct Args {
    /// Engine configuration (JSON). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Add every missing Deck Master to the lookup database
    Rebuild,

    /// Print the domain of a Deck Master (passcode or exact name)
    Show { card: String },

    /// List the Deck Masters whose domain admits every given monster
    Filter {
        #[arg(required = true)]
        cards: Vec<String>,
    },

    /// Write the domain of a Deck Master as an EDOPro banlist (and optionally a CSV)
    Iflist {
        card: String,

        /// Include every spell and trap
        #[arg(long)]
        spells: bool,

        /// Also write a YGOPRODeck collection CSV
        #[arg(long)]
        csv: bool,

        /// Folder to write the banlist into
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Check a deck (JSON with `main`, `extra` and `side` passcode lists)
    Check { deck: PathBuf },
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    if let Err(err) = run(args) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    let ctx = DomainContext::load(&config)?;
    let mut index = ReverseIndex::open(&config.lookup_db)?;
    let catalog = SqliteCatalog::open(&config.cards_db)?;

    match args.command {
        Command::Rebuild => {
            let source = SqliteSource::new(&config.cards_db);
            let report = index.rebuild(&source, &ctx, config.effective_workers())?;
            println!(
                "{} missing, {} added, {} skipped",
                report.missing, report.inserted, report.skipped
            );
        }
        Command::Show { card } => {
            let domain = domain_of(&card, &catalog, &index, &ctx)?;
            println!("{}", domain.describe(&ctx.reference));
        }
        Command::Filter { cards } => {
            let cards = cards
                .iter()
                .map(|query| find_card(&catalog, query))
                .collect::<Result<Vec<_>>>()?;
            let masters = index.reverse_search(&cards, &ctx.reference.archetypes)?;
            if masters.is_empty() {
                println!("No Deck Master admits all of these cards.");
            }
            for id in masters {
                let master = catalog.card_by_id(id)?;
                println!("{} -- {}", master.id, master.name);
            }
        }
        Command::Iflist {
            card,
            spells,
            csv,
            out,
        } => {
            let mut domain = domain_of(&card, &catalog, &index, &ctx)?;
            domain.collect_members(&catalog, &ctx.reference.archetypes, spells)?;
            std::fs::create_dir_all(&out)?;

            let mut files = vec![(out.join(domain.iflist_file_name()), domain.to_iflist())];
            if csv {
                files.push((out.join(domain.csv_file_name()), domain.to_csv()));
            }
            for (path, contents) in files {
                std::fs::write(&path, contents)?;
                info!("Wrote {} cards to {}", domain.members.len(), path.display());
                println!("{}", path.display());
            }
        }
        Command::Check { deck } => {
            let deck: Deck = serde_json::from_str(&std::fs::read_to_string(deck)?)?;
            let checker = DeckChecker::new(&catalog, &index, &ctx.reference.archetypes);
            println!("{}", checker.check(&deck)?);
        }
    }

    Ok(())
}

/// A passcode if the query is numeric, otherwise an exact name.
fn find_card(catalog: &SqliteCatalog, query: &str) -> Result<Card> {
    match query.trim().parse::<u32>() {
        Ok(id) => catalog.card_by_id(CardId::new(id)),
        Err(_) => catalog.card_by_name(query.trim()),
    }
}

/// The indexed domain of a Deck Master, parsing its text when it isn't indexed yet.
fn domain_of(
    query: &str,
    catalog: &SqliteCatalog,
    index: &ReverseIndex,
    ctx: &DomainContext,
) -> Result<Domain> {
    let card = find_card(catalog, query)?;
    let master = catalog.monster_by_id(card.id)?;
    match index.load_domain(master.clone()) {
        Err(Error::NotIndexed(_)) => Domain::from_card(master, ctx, catalog),
        other => other,
    }
}
