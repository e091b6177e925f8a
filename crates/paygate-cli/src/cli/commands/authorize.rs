use anyhow::Context as _;
use paygate_core::{Authorizer, AuthorizerRequest};

use super::super::args::AuthorizeArgs;
use super::context::{read_input, Context};
use crate::exit_codes::{DENIED, SUCCESS};

pub fn run(args: AuthorizeArgs, ctx: &Context) -> anyhow::Result<i32> {
    let raw = read_input(&args.event)?;
    let request: AuthorizerRequest =
        serde_json::from_str(&raw).context("event is not a token-authorizer request")?;

    let authorizer = Authorizer::new(ctx.secrets.clone(), ctx.config.token_policy());
    let response = authorizer.handle(&request);

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(if response.is_allowed() { SUCCESS } else { DENIED })
}
