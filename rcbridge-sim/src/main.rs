// RCBridge simulator: one sender and one receiver endpoint on an in-memory
// radio medium, driven from a single cooperative loop.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use rcbridge_core::{
    Addr, ConfigCommand, ConfigSurface, Endpoint, Receiver, ReceiverEvents, Sender, StdClock,
    TimeSeededKeys, INIT_CHANNEL,
};
use tracing::{info, warn};

use rcbridge_sim::config::{self, SimConfig};
use rcbridge_sim::ether::{Ether, SimRadio};
use rcbridge_sim::store::DirStore;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const SENDER_ADDR: Addr = Addr([0x5e, 0x0d, 0x01, 0x02, 0x03, 0x04]);
const RECEIVER_ADDR: Addr = Addr([0x4c, 0x0d, 0x0a, 0x0b, 0x0c, 0x0d]);

/// Config surface fed from an in-process queue; stands in for the web UI.
#[derive(Clone, Default)]
struct CommandQueue(Rc<RefCell<VecDeque<ConfigCommand>>>);

impl CommandQueue {
    fn push(&self, command: ConfigCommand) {
        self.0.borrow_mut().push_back(command);
    }
}

impl ConfigSurface for CommandQueue {
    fn poll(&mut self) -> Option<ConfigCommand> {
        self.0.borrow_mut().pop_front()
    }
}

/// Logs every payload the receiver delivers.
struct PayloadLog;

impl ReceiverEvents for PayloadLog {
    fn on_data(&mut self, payload: &[u8]) {
        info!("data received: {}", String::from_utf8_lossy(payload));
    }
}

fn print_help() {
    println!("rcbridge-sim {VERSION} — RC bridge endpoints on a simulated radio");
    println!();
    println!("USAGE:");
    println!("    rcbridge-sim [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print this help message and exit");
    println!("    -V, --version    Print version and exit");
    println!("        --reset      Clear both endpoints' pairing info and exit");
    println!();
    println!("DESCRIPTION:");
    println!("    Boots a sender and a receiver on an in-memory ether, pairs them");
    println!("    (or warm-boots from a previous run), pushes payload frames, and");
    println!("    degrades the link mid-run to demonstrate a coordinated channel");
    println!("    hop. Pairing info persists under the store directory.");
    println!();
    println!("CONFIGURATION:");
    println!("    Config file (optional): rcbridge-sim.toml");
    println!();
    println!("    Example rcbridge-sim.toml:");
    println!("      ticks = 4000");
    println!("      store_dir = \"rcbridge-state\"");
    println!("      degrade_at = 1000");
    println!();
    println!("ENVIRONMENT VARIABLES (override config file):");
    println!("    RCBRIDGE_TICKS         Loop iterations to run");
    println!("    RCBRIDGE_STORE_DIR     Blob store directory");
    println!("    RCBRIDGE_DEGRADE_AT    Tick to start degrading the link (0 = off)");
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut reset = false;
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" => {
                println!("rcbridge-sim {VERSION}");
                return Ok(());
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            "--reset" => reset = true,
            other => {
                eprintln!("rcbridge-sim: unknown option '{other}'\n");
                print_help();
                std::process::exit(1);
            }
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cfg = config::load();
    let ether = Ether::new();

    let mut receiver = Receiver::start(
        ether.attach(RECEIVER_ADDR),
        DirStore::open(cfg.store_dir.join("receiver"))?,
        StdClock::new(),
        TimeSeededKeys::new(),
        PayloadLog,
    )?;
    let mut sender = Sender::start(
        ether.attach(SENDER_ADDR),
        DirStore::open(cfg.store_dir.join("sender"))?,
        StdClock::new(),
        (),
    )?;

    let mut sender_config = CommandQueue::default();
    let mut receiver_config = CommandQueue::default();

    if reset {
        sender_config.push(ConfigCommand::Reset);
        receiver_config.push(ConfigCommand::Reset);
        sender.step(&mut sender_config)?;
        receiver.step(&mut receiver_config)?;
        info!("pairing info cleared; the next run will rediscover");
        return Ok(());
    }

    run(
        &cfg,
        &ether,
        &mut sender,
        &mut receiver,
        &mut sender_config,
        &mut receiver_config,
    )
}

fn run(
    cfg: &SimConfig,
    ether: &Ether,
    sender: &mut Sender<SimRadio, DirStore, StdClock>,
    receiver: &mut Receiver<SimRadio, DirStore, StdClock, TimeSeededKeys, PayloadLog>,
    sender_config: &mut CommandQueue,
    receiver_config: &mut CommandQueue,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut frames_sent = 0u64;
    let mut degraded = false;

    for tick in 0..cfg.ticks {
        sender.step(sender_config)?;
        receiver.step(receiver_config)?;

        if sender.is_paired() && tick % 10 == 0 {
            frames_sent += 1;
            let payload = format!("frame {frames_sent}");
            if let Err(err) = sender.send(payload.as_bytes()) {
                warn!("payload not accepted: {err}");
            }
        }

        if cfg.degrade_at != 0 && tick == cfg.degrade_at {
            info!("forcing degraded link samples");
            sender.set_quality_sample_override(Some(0.0));
            degraded = true;
        }
        if degraded && ether.channel_of(RECEIVER_ADDR) != Some(INIT_CHANNEL) {
            sender.set_quality_sample_override(None);
            degraded = false;
            info!(
                "link recovered on channel {}",
                ether.channel_of(RECEIVER_ADDR).unwrap_or(0)
            );
        }

        std::thread::sleep(Duration::from_millis(1));
    }

    info!(
        "simulation finished: {frames_sent} frames pushed, receiver on channel {}",
        receiver.channel()
    );
    Ok(())
}
