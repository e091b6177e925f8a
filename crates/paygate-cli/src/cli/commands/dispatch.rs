use super::super::args::*;
use super::context::Context;
use crate::exit_codes::SUCCESS;

pub async fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    let config = cli.config.as_deref();
    match cli.cmd {
        Command::Authorize(args) => super::authorize::run(args, &Context::load(config)?),
        Command::Process(args) => super::process::run(args, &Context::load(config)?).await,
        Command::Decrypt(args) => super::decrypt::run(args, &Context::load(config)?).await,
        Command::Keygen(args) => super::keygen::run(args),
        Command::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(SUCCESS)
        }
    }
}
