use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};

use rfq::config::{Settings, load_config};
use rfq::queue::{Harvester, Payload, Queue, QueueKind};
use rfq::utils::logging;
use rfq::{Result, SledStore};

/// Reliable at-least-once FIFO queue.
#[derive(Parser)]
#[command(name = "rfq", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish a message; prints the new message id.
    Publish {
        #[arg(long)]
        topic: String,
        /// Flat JSON object of string keys to string values.
        #[arg(long)]
        message: String,
    },
    /// Claim the oldest backlogged message; prints it as JSON, or `null`
    /// when the backlog is empty.
    Consume {
        #[arg(long)]
        topic: String,
    },
    /// Acknowledge a claimed message, deleting it permanently.
    Commit {
        #[arg(long)]
        topic: String,
        #[arg(long)]
        id: String,
    },
    /// Return abandoned leases to the backlog; prints the recovered ids.
    Harvest {
        #[arg(long)]
        topic: String,
        /// Keep sweeping on the configured interval instead of exiting.
        #[arg(long)]
        watch: bool,
    },
    /// List every known topic.
    ListTopics,
    /// List the message ids in one of a topic's queues.
    ListQueue {
        #[arg(long)]
        topic: String,
        #[arg(long, default_value = "backlog")]
        queue: QueueKind,
    },
    /// Delete a topic's queues and payloads; prints how many ids were dropped.
    PurgeQueue {
        #[arg(long)]
        topic: String,
    },
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = match load_config() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("rfq: failed to load configuration: {e}");
            process::exit(1);
        }
    };
    logging::init(&settings.log.level);

    if let Err(e) = run(cli.command, &settings) {
        eprintln!("rfq: {e}");
        process::exit(1);
    }
}

fn run(command: Command, settings: &Settings) -> Result<()> {
    let store = SledStore::open(&settings.store.path)?;
    let queue = Queue::new(store, settings.store.namespace.as_str());

    match command {
        Command::Publish { topic, message } => {
            let payload: Payload = serde_json::from_str(&message)?;
            let id = queue.publish(&topic, payload)?;
            println!("{id}");
        }
        Command::Consume { topic } => match queue.claim(&topic)? {
            Some(msg) => println!("{}", serde_json::to_string_pretty(&msg)?),
            None => println!("null"),
        },
        Command::Commit { topic, id } => {
            queue.commit(&topic, &id)?;
        }
        Command::Harvest { topic, watch } => {
            if watch {
                let interval = Duration::from_secs(settings.harvester.interval);
                Harvester::new(queue, interval).watch(&topic)?;
            } else {
                let recovered = queue.harvest(&topic)?;
                println!("{}", serde_json::to_string(&recovered)?);
            }
        }
        Command::ListTopics => {
            println!("{}", serde_json::to_string(&queue.list_topics()?)?);
        }
        Command::ListQueue { topic, queue: kind } => {
            println!("{}", serde_json::to_string(&queue.list_queue(&topic, kind)?)?);
        }
        Command::PurgeQueue { topic } => {
            println!("{}", queue.purge_queue(&topic)?);
        }
    }
    Ok(())
}
