use anyhow::Context as _;
use paygate_core::{PaymentHandler, ProxyEvent};

use super::super::args::ProcessArgs;
use super::context::{read_input, Context};
use crate::exit_codes::{FAILURE, SUCCESS};

pub async fn run(args: ProcessArgs, ctx: &Context) -> anyhow::Result<i32> {
    let raw = read_input(&args.event)?;
    let event: ProxyEvent = serde_json::from_str(&raw).context("event is not a proxy event")?;

    let handler = PaymentHandler::new(
        ctx.store()?,
        ctx.secrets.clone(),
        ctx.config.encryption.key_secret.clone(),
        ctx.config.encryption.key_encoding,
    );
    let response = handler.handle(&event).await;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(if response.is_success() { SUCCESS } else { FAILURE })
}
