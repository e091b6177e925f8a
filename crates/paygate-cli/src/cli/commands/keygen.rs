use paygate_core::{KeyEncoding, SymmetricKey};

use super::super::args::{KeyOutputEncoding, KeygenArgs};
use crate::exit_codes::SUCCESS;

pub fn run(args: KeygenArgs) -> anyhow::Result<i32> {
    let key = SymmetricKey::generate(args.bits)?;
    let encoding = match args.encoding {
        KeyOutputEncoding::Base64 => KeyEncoding::Base64,
        KeyOutputEncoding::Hex => KeyEncoding::Hex,
    };
    println!("{}", key.encode(encoding)?);
    Ok(SUCCESS)
}
