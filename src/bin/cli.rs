//! slotkv CLI
//!
//! Command-line interface over the file dictionaries registered in one
//! master table directory.

use clap::{Parser, Subcommand, ValueEnum};
use slotkv::{
    Backend, Dictionary, DictionaryConfig, KeyType, MasterTable, Predicate, Record, SlotError,
};
use tracing_subscriber::{fmt, EnvFilter};

/// slotkv CLI
#[derive(Parser, Debug)]
#[command(name = "slotkv-cli")]
#[command(about = "CLI for slotkv file dictionaries")]
#[command(version)]
struct Args {
    /// Directory holding the master table and table files
    #[arg(short, long, default_value = "./slotkv_data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a dictionary and print its id
    Create {
        #[arg(short, long, value_enum, default_value = "signed")]
        key_type: KeyTypeArg,

        /// Key width in bytes
        #[arg(long, default_value = "8")]
        key_size: usize,

        /// Value width in bytes
        #[arg(long, default_value = "32")]
        value_size: usize,

        /// Bucket count
        #[arg(short, long, default_value = "1024")]
        capacity: usize,
    },

    /// Insert a record
    Put {
        id: u32,
        key: String,
        value: String,

        /// Overwrite an existing value instead of failing
        #[arg(short, long)]
        update: bool,
    },

    /// Print the value stored under a key
    Get { id: u32, key: String },

    /// Delete a record
    Del { id: u32, key: String },

    /// Print every record, or those with lower <= key <= upper
    Scan {
        id: u32,

        #[arg(long, requires = "upper")]
        lower: Option<String>,

        #[arg(long, requires = "lower")]
        upper: Option<String>,
    },

    /// List registered dictionaries
    List,

    /// Delete a dictionary and its table file
    Drop { id: u32 },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum KeyTypeArg {
    Signed,
    Unsigned,
    Bytes,
    String,
}

impl From<KeyTypeArg> for KeyType {
    fn from(arg: KeyTypeArg) -> Self {
        match arg {
            KeyTypeArg::Signed => KeyType::SignedNumeric,
            KeyTypeArg::Unsigned => KeyType::UnsignedNumeric,
            KeyTypeArg::Bytes => KeyType::FixedByteArray,
            KeyTypeArg::String => KeyType::NullTerminatedString,
        }
    }
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,slotkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> slotkv::Result<()> {
    let mut master = MasterTable::open(&args.data_dir)?;

    match args.command {
        Commands::Create {
            key_type,
            key_size,
            value_size,
            capacity,
        } => {
            let template = DictionaryConfig::builder()
                .key_type(key_type.into())
                .key_size(key_size)
                .value_size(value_size)
                .capacity(capacity)
                .backend(Backend::File)
                .build();

            let mut dictionary = master.create_dictionary(&template)?;
            println!("{}", dictionary.id());
            dictionary.close()?;
        }

        Commands::Put {
            id,
            key,
            value,
            update,
        } => {
            let mut dictionary = master.open_dictionary(id)?;
            let key = encode_key(dictionary.config(), &key)?;
            let value = encode_value(dictionary.config(), &value);

            if update {
                dictionary.update(&key, &value)?;
            } else {
                dictionary.insert(&key, &value)?;
            }
            dictionary.close()?;
        }

        Commands::Get { id, key } => {
            let mut dictionary = master.open_dictionary(id)?;
            let key = encode_key(dictionary.config(), &key)?;

            match dictionary.fetch(&key) {
                Ok(value) => println!("{}", display_value(&value)),
                Err(SlotError::ItemNotFound) => println!("(nil)"),
                Err(e) => return Err(e),
            }
            dictionary.close()?;
        }

        Commands::Del { id, key } => {
            let mut dictionary = master.open_dictionary(id)?;
            let key = encode_key(dictionary.config(), &key)?;

            match dictionary.delete(&key) {
                Ok(count) => println!("(integer) {}", count),
                Err(SlotError::ItemNotFound) => println!("(integer) 0"),
                Err(e) => return Err(e),
            }
            dictionary.close()?;
        }

        Commands::Scan { id, lower, upper } => {
            let mut dictionary = master.open_dictionary(id)?;
            let predicate = match (lower, upper) {
                (Some(lower), Some(upper)) => Predicate::range(
                    encode_key(dictionary.config(), &lower)?,
                    encode_key(dictionary.config(), &upper)?,
                ),
                _ => Predicate::all_records(),
            };

            scan(&dictionary, &predicate)?;
            dictionary.close()?;
        }

        Commands::List => {
            for id in master.ids()? {
                let config = master.lookup(id)?;
                println!(
                    "{}\t{:?}\tkey={}B\tvalue={}B\tcapacity={}",
                    id, config.key_type, config.key_size, config.value_size, config.capacity
                );
            }
        }

        Commands::Drop { id } => {
            master.drop_dictionary(id)?;
        }
    }

    master.close()
}

fn scan(dictionary: &Dictionary, predicate: &Predicate) -> slotkv::Result<()> {
    let config = dictionary.config();
    let mut cursor = dictionary.find(predicate)?;

    let mut count = 0usize;
    for record in cursor.records() {
        let Record { key, value } = record?;
        println!("{}\t{}", display_key(config, &key), display_value(&value));
        count += 1;
    }

    tracing::info!(count, "Scan complete");
    Ok(())
}

// =============================================================================
// Key / Value Encoding
// =============================================================================

/// Numeric keys are parsed as integers and stored little-endian, widened
/// with their sign or truncated to `key_size`. Other keys are raw text,
/// zero padded.
fn encode_key(config: &DictionaryConfig, text: &str) -> slotkv::Result<Vec<u8>> {
    let invalid = |e: std::num::ParseIntError| {
        SlotError::Config(format!("invalid numeric key '{}': {}", text, e))
    };

    let (bytes, fill) = match config.key_type {
        KeyType::SignedNumeric => {
            let v: i64 = text.parse().map_err(invalid)?;
            (v.to_le_bytes().to_vec(), if v < 0 { 0xFF } else { 0x00 })
        }
        KeyType::UnsignedNumeric => {
            let v: u64 = text.parse().map_err(invalid)?;
            (v.to_le_bytes().to_vec(), 0x00)
        }
        KeyType::FixedByteArray | KeyType::NullTerminatedString => {
            (text.as_bytes().to_vec(), 0x00)
        }
    };

    Ok(fit(bytes, config.key_size, fill))
}

fn encode_value(config: &DictionaryConfig, text: &str) -> Vec<u8> {
    fit(text.as_bytes().to_vec(), config.value_size, 0)
}

fn fit(mut bytes: Vec<u8>, width: usize, fill: u8) -> Vec<u8> {
    bytes.resize(width, fill);
    bytes
}

fn display_key(config: &DictionaryConfig, key: &[u8]) -> String {
    let mut word = [0u8; 8];
    let n = key.len().min(8);
    word[..n].copy_from_slice(&key[..n]);

    match config.key_type {
        KeyType::SignedNumeric => {
            if key[..n].last().is_some_and(|b| b & 0x80 != 0) {
                word[n..].fill(0xFF);
            }
            i64::from_le_bytes(word).to_string()
        }
        KeyType::UnsignedNumeric => u64::from_le_bytes(word).to_string(),
        KeyType::FixedByteArray | KeyType::NullTerminatedString => display_value(key),
    }
}

fn display_value(value: &[u8]) -> String {
    let end = value.iter().position(|&b| b == 0).unwrap_or(value.len());
    String::from_utf8_lossy(&value[..end]).into_owned()
}
