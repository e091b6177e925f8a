use clap::{ArgGroup, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "paygate",
    version,
    about = "Token authorization gate and card-data encryption at rest"
)]
pub struct Cli {
    /// YAML config file (defaults apply when omitted)
    #[arg(long, global = true, env = "PAYGATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Evaluate a token-authorizer event and print the policy document
    Authorize(AuthorizeArgs),
    /// Encrypt and store card data from a proxy event
    Process(ProcessArgs),
    /// Decrypt a stored blob with the configured data key
    Decrypt(DecryptArgs),
    /// Generate a random data key
    Keygen(KeygenArgs),
    Version,
}

#[derive(Parser, Debug)]
pub struct AuthorizeArgs {
    /// Event JSON file (`-` for stdin)
    /// Shape: {"authorizationToken": "...", "methodArn": "..."}
    #[arg(long, default_value = "-")]
    pub event: String,
}

#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Proxy event JSON file (`-` for stdin)
    /// Shape: {"body": "{\"card_data\": \"...\", \"card_id\": \"...\"}"}
    #[arg(long, default_value = "-")]
    pub event: String,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["blob", "record"])))]
pub struct DecryptArgs {
    /// base64(iv || ciphertext)
    #[arg(long)]
    pub blob: Option<String>,

    /// Read the blob stored under this card id
    #[arg(long)]
    pub record: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum KeyOutputEncoding {
    #[default]
    Base64,
    Hex,
}

#[derive(Parser, Debug)]
pub struct KeygenArgs {
    /// Key size: 128, 192 or 256
    #[arg(long, default_value_t = 256)]
    pub bits: usize,

    /// Encoding of the printed key; set `encryption.key_encoding` to match
    #[arg(long, value_enum, default_value_t = KeyOutputEncoding::Base64)]
    pub encoding: KeyOutputEncoding,
}
