//! Example demonstrating simulator setup and account management

use sim_vm::{ContextOverrides, Simulator, SimulatorConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("🦀 Contract Simulator Demo");
    println!("==========================");

    // Configure the simulator
    println!("\n1. Configuring...");
    let mut config = SimulatorConfig::default();
    if let Ok(runner) = std::env::var("VM_RUNNER") {
        config.runner_binary = runner.into();
    }
    println!("   Runner binary: {}", config.runner_binary.display());
    println!("   Default balance: {}", config.default_balance);

    let mut sim = Simulator::new(config);

    // Create accounts
    println!("\n2. Creating accounts...");
    let alice = sim.new_account("alice", None)?;
    println!("   alice: balance={}, key={}", alice.balance, alice.signer_key);
    let bob = sim.get_or_create("bob");
    println!("   bob:   balance={}, key={}", bob.balance, bob.signer_key);

    // Pin the block context for deterministic runs
    println!("\n3. Pinning block context...");
    sim.set_context(ContextOverrides {
        block_height: Some(100),
        block_timestamp: Some(1_700_000_000_000_000_000),
        ..Default::default()
    });
    println!("   block_height=100");

    // Calls require the runner binary on PATH (or VM_RUNNER set)
    if std::env::var("VM_RUNNER").is_ok() {
        println!("\n4. Calling alice.echo...");
        let session = sim.call("alice", "echo", r#"{"x":7}"#)?;
        println!("   return_index={}", session.return_index);
        println!("   value={:?}", session.value);
        for log in session.logs() {
            println!("   log: {}", log);
        }
    } else {
        println!("\n4. Set VM_RUNNER=<path> to execute a real contract call.");
    }

    println!("\n✅ Demo completed!");
    Ok(())
}
