//! In-memory example of the intersection-sum protocol.
//!
//! Runs both parties in one process and prints what each round sends,
//! simulating the message exchange without network I/O.
//!
//! Run with:
//! ```bash
//! cargo run --bin in_memory -- [mersenne31|modp2048] [toy|paillier]
//! RUST_LOG=debug cargo run --bin in_memory
//! ```

use psi_sum_protocol::{
    AdditiveCipher, GroupParameters, PaillierCipher, Party1, Party2, ToyCipher,
};
use std::env;
use tracing_subscriber::EnvFilter;

fn usage(program: &str) -> ! {
    eprintln!("Usage: {} [mersenne31|modp2048] [toy|paillier]", program);
    std::process::exit(1);
}

/// Run the reference scenario step by step, printing every message.
fn run_scenario<C>(params: GroupParameters, cipher: C) -> Result<u64, Box<dyn std::error::Error>>
where
    C: AdditiveCipher,
    C::Ciphertext: serde::Serialize,
    C::PublicKey: serde::Serialize,
{
    let set_v = ["alice", "bob", "carol"];
    let pairs_wt = [("alice", 10u64), ("dave", 20), ("carol", 30)];

    let party1 = Party1::<C>::new(&set_v, params.clone())?;
    let party2 = Party2::new(&pairs_wt, params, &cipher)?;

    println!("=== Protocol Setup ===");
    println!("Modulus: {} bits", party1.params().modulus().bits());
    println!("Party 1 identifiers V ({}): {:?}", set_v.len(), set_v);
    println!("Party 2 pairs W ({}): {:?}", pairs_wt.len(), pairs_wt);
    println!("Party 2 public key: {}", serde_json::to_string(party2.public_key())?);

    // In a real deployment each message crosses the network (with TLS!).
    println!("\n--- Round 1: Party 1 -> Party 2 ---");
    let (party1, round1) = party1.round1();
    for (i, blinded) in round1.blinded.iter().enumerate() {
        println!("  [{}] H(v)^k1 = {}", i, blinded);
    }

    println!("\n--- Round 2: Party 2 -> Party 1 ---");
    let (party2, round2) = party2.round2(round1)?;
    for (i, z) in round2.double_blinded.iter().enumerate() {
        println!("  Z[{}] (H(v)^k1)^k2 = {}", i, z);
    }
    for (i, entry) in round2.entries.iter().enumerate() {
        println!(
            "  [{}] H(w)^k2 = {}, Enc(t) = {}",
            i,
            entry.blinded,
            serde_json::to_string(&entry.ciphertext)?
        );
    }

    println!("\n--- Round 3: Party 1 -> Party 2 ---");
    let blinded_w = round2.blinded_entries();
    let round3 = party1.round3(round2)?;
    for &i in &round3.matched_indices {
        println!("  Matched [{}] H(w)^k2 = {}", i, blinded_w[i]);
    }
    println!(
        "  Encrypted sum: {}",
        serde_json::to_string(&round3.message.aggregate)?
    );

    println!("\n--- Finalize: Party 2 ---");
    let sum = party2.finalize(round3.message)?;
    println!("  Intersection-sum: {}", sum);

    Ok(sum)
}

fn print_outcome<E>(sum: Result<u64, E>) -> Result<(), E> {
    let sum = sum?;
    println!("\n=== Results ===");
    println!("Expected 40 (alice + carol), got {}", sum);
    if sum == 40 {
        println!("✓ Protocol completed successfully!");
        println!("✓ Party 1 learned only the number of matches");
        println!("✓ Party 2 learned only the sum");
    } else {
        println!("✗ Unexpected result");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("in_memory");

    let params = match args.get(1).map(String::as_str) {
        None | Some("mersenne31") => GroupParameters::mersenne_31(),
        Some("modp2048") => GroupParameters::modp_2048(),
        Some(other) => {
            eprintln!("Unknown group: {}", other);
            usage(program);
        }
    };

    println!("=== Private Intersection-Sum In-Memory Example ===\n");
    match args.get(2).map(String::as_str) {
        None | Some("toy") => print_outcome(run_scenario(params, ToyCipher)),
        Some("paillier") => {
            let cipher = PaillierCipher::default();
            println!("Paillier modulus: {} bits\n", cipher.modulus_bits());
            print_outcome(run_scenario(params, cipher))
        }
        Some(other) => {
            eprintln!("Unknown cipher: {}", other);
            usage(program);
        }
    }
}
