//! Smoke-test harness for the Jubjub group operations.
//!
//! Decodes a hex-encoded compressed point, multiplies it by the Fr modulus
//! ℓ in canonical little-endian byte form, and prints the result. The
//! product is the identity exactly when the input point lies in the
//! prime-order subgroup.

use std::io::BufRead;
use std::process;

use clap::{Arg, Command};

use jubjub::{CompressedPoint, DecodeError, Fr};

fn build_cli() -> Command {
    Command::new("jubjub-tester")
        .about("Multiplies a compressed Jubjub point by the Fr modulus")
        .arg(
            Arg::new("point")
                .value_name("HEX")
                .help("Hex-encoded 32-byte compressed point; read from stdin when omitted"),
        )
}

fn fail(msg: &str) -> ! {
    eprintln!("ERROR: {msg}");
    process::exit(1);
}

fn run(input: &str) -> Result<(), DecodeError> {
    let bytes = hex::decode(input.trim())
        .map_err(|_| DecodeError::InvalidEncoding)?;
    let compressed = CompressedPoint::from_slice(&bytes)?;
    let point = compressed
        .decompress()
        .ok_or(DecodeError::InvalidEncoding)?;

    log::debug!("decoded point {:?}", point.to_affine());

    let product = point.to_niels().multiply(&Fr::MODULUS_BYTES);

    println!("{}", hex::encode(product.compress().to_bytes()));
    println!(
        "in prime-order subgroup: {}",
        bool::from(product.is_identity())
    );

    Ok(())
}

fn main() {
    env_logger::init();

    let matches = build_cli().get_matches();

    let input = match matches.get_one::<String>("point") {
        Some(arg) => arg.clone(),
        None => {
            let mut line = String::new();
            if std::io::stdin().lock().read_line(&mut line).is_err() || line.trim().is_empty() {
                fail("no point given on the command line or stdin");
            }
            line
        }
    };

    if let Err(e) = run(&input) {
        fail(&e.to_string());
    }
}
