//! frag6: one-shot fragmented IPv6 TCP datagram sender
//!
//! Builds a single IPv6 datagram (TCP segment, Hop-by-Hop Router Alert,
//! Destination ILNP nonce), fragments it to the link MTU, and emits each
//! fragment as a raw Ethernet frame on the chosen interface.

mod args;

use args::Cli;
use frag6_core::Result;
use frag6_net::{link_info, resolve_ipv6, send_fragments, DatalinkTransmitter};
use frag6_packet::{DatagramBuilder, Ipv6Option, TcpHeader, TcpPort};
use std::io::Read;
use tracing::info;

fn main() {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn run(cli: &Cli) -> Result<()> {
    let link = link_info(&cli.interface)?;
    let mtu = cli.mtu.unwrap_or(link.mtu) as usize;
    info!(
        interface = %link.name,
        index = link.index,
        mtu,
        mac = %link.mac,
        "interface ready"
    );

    let destination = resolve_ipv6(&cli.target)?;
    info!(target = %cli.target, %destination, "target resolved");

    let payload = read_payload(&cli.payload)?;
    info!(bytes = payload.len(), "payload loaded");

    let tcp = TcpHeader::new(
        TcpPort::new(cli.source_port),
        TcpPort::new(cli.dest_port),
        cli.seq,
        cli.ack,
        cli.tcp_flags()?,
        cli.window,
    );

    let mut builder = DatagramBuilder::new(cli.source, destination, tcp)
        .payload(payload)
        .hop_limit(cli.hop_limit)
        .traffic_class(cli.traffic_class)
        .flow_label(cli.flow_label);

    if !cli.no_hop_by_hop {
        builder = builder.hop_by_hop_option(Ipv6Option::router_alert(cli.router_alert));
    }
    if !cli.no_dest_opts {
        let nonce = match cli.nonce_bytes()? {
            Some(bytes) => bytes,
            None => rand::random::<[u8; 12]>().to_vec(),
        };
        builder = builder.destination_option(Ipv6Option::ilnp_nonce(&nonce)?);
    }
    if let Some(id) = cli.fragment_id {
        builder = builder.fragment_id(id);
    }

    let fragments = builder.build(mtu)?;
    info!(count = fragments.len(), "datagram built");

    let mut transmitter = DatalinkTransmitter::open(&cli.interface)?;
    send_fragments(&mut transmitter, cli.dest_mac, link.mac, &fragments)?;
    info!(count = fragments.len(), "all fragments sent");

    Ok(())
}

fn read_payload(source: &str) -> Result<Vec<u8>> {
    let mut payload = Vec::new();
    if source == "-" {
        std::io::stdin().read_to_end(&mut payload)?;
    } else {
        std::fs::File::open(source)?.read_to_end(&mut payload)?;
    }
    Ok(payload)
}
