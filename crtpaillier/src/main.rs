//! crtpaillier: homomorphic subtraction demo
//!
//! Generates a fresh key pair, encrypts two signed integers, subtracts them under encryption and
//! prints the decrypted results.

use anyhow::{Context, Result};
use clap::Parser;
use rug::Integer;
use std::io::{self, Write};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use crtpaillier::cryptosystems::paillier::{EncryptionMode, Paillier, PaillierPK, PaillierSK};
use crtpaillier::crtpaillier_traits::cryptosystems::{
    AsymmetricCryptosystem, DecryptionKey, EncryptionKey,
};
use crtpaillier::crtpaillier_traits::randomness::{GeneralRng, SecureRng};
use crtpaillier::crtpaillier_traits::security::BitsOfSecurity;

#[derive(Parser, Debug)]
#[command(name = "crtpaillier")]
#[command(about = "Subtract two integers under Paillier encryption")]
#[command(version)]
#[command(allow_negative_numbers = true)]
struct Args {
    /// Left-hand operand
    lhs: Integer,

    /// Right-hand operand
    rhs: Integer,

    /// Bit length of the public modulus n (use at least 2048 outside of experiments)
    #[arg(long, env = "CRTPAILLIER_KEY_BITS")]
    key_bits: u32,

    /// Blind every ciphertext with a random factor r^n mod n^2
    #[arg(long)]
    randomized: bool,

    /// Verbosity of the diagnostics written to stderr
    #[arg(long, default_value = "warn")]
    log_level: Level,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut rng = GeneralRng::from_os_entropy().context("Cannot seed the random generator")?;

    let stdout = io::stdout();
    run(&args, &mut rng, &mut stdout.lock())
}

/// Generates a key pair as configured by `args` and writes the subtraction report to `out`.
fn run<R: SecureRng, W: Write>(args: &Args, rng: &mut GeneralRng<R>, out: &mut W) -> Result<()> {
    let mode = if args.randomized {
        EncryptionMode::Randomized
    } else {
        EncryptionMode::Deterministic
    };

    info!("Generating a {}-bit key pair", args.key_bits);
    let paillier = Paillier::setup(&BitsOfSecurity::Other {
        pk_bits: args.key_bits,
    })
    .with_mode(mode);
    let (public_key, secret_key) = paillier
        .generate_keys(rng)
        .context("Key generation failed")?;

    report(&public_key, &secret_key, &args.lhs, &args.rhs, rng, out)
}

fn report<R: SecureRng, W: Write>(
    public_key: &PaillierPK,
    secret_key: &PaillierSK,
    lhs: &Integer,
    rhs: &Integer,
    rng: &mut GeneralRng<R>,
    out: &mut W,
) -> Result<()> {
    writeln!(out, "n: {}", public_key.n())?;
    writeln!(
        out,
        "Positive / negative boundary: {}",
        secret_key.pos_neg_boundary()
    )?;
    writeln!(out, "Testing: {} - {}", lhs, rhs)?;

    let encrypted_lhs = public_key.encrypt(lhs, rng).context("Cannot encrypt lhs")?;
    let encrypted_rhs = public_key.encrypt(rhs, rng).context("Cannot encrypt rhs")?;

    writeln!(out, "Decrypted lhs: {}", secret_key.decrypt(&encrypted_lhs))?;
    writeln!(out, "Decrypted rhs: {}", secret_key.decrypt(&encrypted_rhs))?;

    let difference = encrypted_lhs
        .checked_sub(encrypted_rhs)
        .context("Homomorphic subtraction failed")?;

    writeln!(
        out,
        "Decrypted subtraction: {}",
        secret_key.decrypt(&difference)
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{report, run, Args};
    use clap::{CommandFactory, Parser};
    use crtpaillier::cryptosystems::paillier::{EncryptionMode, PaillierSK};
    use crtpaillier::crtpaillier_traits::randomness::GeneralRng;
    use rand_core::OsRng;
    use rug::Integer;

    #[test]
    fn verify_cli() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_negative_operands() {
        let args =
            Args::try_parse_from(["crtpaillier", "--key-bits", "64", "-500", "700"]).unwrap();

        assert_eq!(args.lhs, -500);
        assert_eq!(args.rhs, 700);
        assert_eq!(args.key_bits, 64);
        assert!(!args.randomized);
    }

    #[test]
    fn test_unparsable_operand() {
        let error =
            Args::try_parse_from(["crtpaillier", "--key-bits", "64", "five", "7"]).unwrap_err();

        assert_ne!(error.exit_code(), 0);
    }

    #[test]
    fn test_missing_operand() {
        let error = Args::try_parse_from(["crtpaillier", "--key-bits", "64", "5"]).unwrap_err();

        assert_ne!(error.exit_code(), 0);
    }

    #[test]
    fn test_report_for_fixed_keys() {
        let mut rng = GeneralRng::new(OsRng);
        let (public_key, secret_key) = PaillierSK::from_primes(
            Integer::from(61),
            Integer::from(53),
            EncryptionMode::Deterministic,
        )
        .unwrap();

        let mut out = Vec::new();
        report(
            &public_key,
            &secret_key,
            &Integer::from(500),
            &Integer::from(700),
            &mut rng,
            &mut out,
        )
        .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "n: 3233\n\
             Positive / negative boundary: 1616\n\
             Testing: 500 - 700\n\
             Decrypted lhs: 500\n\
             Decrypted rhs: 700\n\
             Decrypted subtraction: -200\n"
        );
    }

    #[test]
    fn test_report_rejects_out_of_range_operand() {
        let mut rng = GeneralRng::new(OsRng);
        let (public_key, secret_key) = PaillierSK::from_primes(
            Integer::from(61),
            Integer::from(53),
            EncryptionMode::Deterministic,
        )
        .unwrap();

        let mut out = Vec::new();
        let result = report(
            &public_key,
            &secret_key,
            &Integer::from(5000),
            &Integer::from(7),
            &mut rng,
            &mut out,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_run_randomized_subtraction() {
        let mut rng = GeneralRng::new(OsRng);
        let args = Args::try_parse_from([
            "crtpaillier",
            "--key-bits",
            "128",
            "--randomized",
            "--",
            "-12345",
            "678",
        ])
        .unwrap();

        let mut out = Vec::new();
        run(&args, &mut rng, &mut out).unwrap();

        let output = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with("n: "));
        assert_eq!(lines[2], "Testing: -12345 - 678");
        assert_eq!(lines[3], "Decrypted lhs: -12345");
        assert_eq!(lines[4], "Decrypted rhs: 678");
        assert_eq!(lines[5], "Decrypted subtraction: -13023");
    }

    #[test]
    fn test_run_rejects_odd_key_length() {
        let mut rng = GeneralRng::new(OsRng);
        let args = Args::try_parse_from(["crtpaillier", "--key-bits", "63", "1", "2"]).unwrap();

        let mut out = Vec::new();

        assert!(run(&args, &mut rng, &mut out).is_err());
        assert!(out.is_empty());
    }
}
