use std::io::Write;

use paygate_core::{crypto, resolve_data_key, RecordStore};

use super::super::args::DecryptArgs;
use super::context::Context;
use crate::exit_codes::{FAILURE, NOT_FOUND, SUCCESS};

pub async fn run(args: DecryptArgs, ctx: &Context) -> anyhow::Result<i32> {
    let key = resolve_data_key(
        ctx.secrets.as_ref(),
        &ctx.config.encryption.key_secret,
        ctx.config.encryption.key_encoding,
    )?;

    let blob = match (args.blob, args.record) {
        (Some(blob), _) => blob,
        (None, Some(record_id)) => match ctx.store()?.get(&record_id).await {
            Ok(record) => record.encrypted_data,
            Err(e) => {
                eprintln!("error: {}", e);
                return Ok(if e.is_not_found() {
                    NOT_FOUND
                } else {
                    e.exit_code()
                });
            }
        },
        (None, None) => anyhow::bail!("one of --blob or --record is required"),
    };

    let plaintext = match crypto::decrypt(blob.trim(), &key) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("decrypt failed: {}", e);
            return Ok(FAILURE);
        }
    };

    let mut out = std::io::stdout().lock();
    out.write_all(&plaintext)?;
    out.write_all(b"\n")?;
    Ok(SUCCESS)
}
