use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use pqc_kex::{
    defaults, tcp, with_default_port, HandshakeConfig, KemAlgorithm, PqcClient, PqcServer, Result,
    SecretSink, SharedSecret,
};

#[derive(Parser)]
#[command(
    name = "pqc-kex",
    version,
    about = "Post-quantum KEM key exchange between two peers"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// KEM parameter set (kyber512, kyber768, kyber1024)
    #[arg(long, global = true, default_value_t = KemAlgorithm::default())]
    algorithm: KemAlgorithm,

    /// Receive timeout in seconds (0 waits forever)
    #[arg(long, global = true, default_value_t = defaults::RECEIVE_TIMEOUT.as_secs())]
    timeout_secs: u64,

    /// Largest payload accepted from the peer, in bytes
    #[arg(long, global = true, default_value_t = defaults::MAX_PAYLOAD_LEN)]
    max_payload: usize,
}

#[derive(Subcommand)]
enum Command {
    /// Accept one client and run the server side of the handshake
    Server {
        /// Address to listen on; the default port is used when omitted
        listen: String,
    },
    /// Connect to a server and run the client side of the handshake
    Client {
        /// Server address; the default port is used when omitted
        server: String,
    },
}

/// Records the secret's fingerprint; the secret itself is dropped and zeroized.
struct LogSink;

impl SecretSink for LogSink {
    fn accept(&mut self, shared_secret: SharedSecret) -> Result<()> {
        info!(
            len = shared_secret.len(),
            fingerprint = %shared_secret.fingerprint_hex(),
            "shared secret established"
        );
        Ok(())
    }
}

impl Cli {
    fn config(&self) -> HandshakeConfig {
        let timeout = (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs));
        HandshakeConfig::new()
            .with_algorithm(self.algorithm)
            .with_receive_timeout(timeout)
            .with_max_payload_len(self.max_payload)
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config();
    match &cli.command {
        Command::Server { listen } => {
            let server = PqcServer::with_config(config)?;
            let mut listener = tcp::listen(&with_default_port(listen))?;
            info!(address = %listener.local_addr()?, algorithm = %cli.algorithm, "waiting for client");
            server.accept_one(&mut listener, &mut LogSink)
        }
        Command::Client { server } => {
            let client = PqcClient::with_config(config)?;
            client.connect_and_handshake(server, &mut LogSink)
        }
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("handshake failed ({}): {}", err.reason(), err);
            ExitCode::FAILURE
        }
    }
}
