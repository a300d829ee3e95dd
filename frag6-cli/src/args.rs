//! CLI argument parsing

use clap::Parser;
use frag6_core::{Error, Result};
use frag6_packet::{MacAddress, TcpFlags};
use std::net::Ipv6Addr;

#[derive(Parser, Debug)]
#[command(name = "frag6")]
#[command(
    version,
    about = "Send a fragmented IPv6 TCP segment with hop-by-hop and destination options",
    long_about = None
)]
pub struct Cli {
    /// Target host name or IPv6 literal
    pub target: String,

    /// Network interface to send on
    #[arg(short = 'I', long)]
    pub interface: String,

    /// Source IPv6 address
    #[arg(short = 's', long)]
    pub source: Ipv6Addr,

    /// Destination MAC address
    #[arg(short = 'm', long, default_value = "ff:ff:ff:ff:ff:ff")]
    pub dest_mac: MacAddress,

    /// Payload file, or '-' to read from stdin
    #[arg(short = 'p', long, default_value = "-")]
    pub payload: String,

    /// TCP source port
    #[arg(long, default_value_t = 80)]
    pub source_port: u16,

    /// TCP destination port
    #[arg(long, default_value_t = 80)]
    pub dest_port: u16,

    /// TCP sequence number
    #[arg(long, default_value_t = 0)]
    pub seq: u32,

    /// TCP acknowledgment number
    #[arg(long, default_value_t = 0)]
    pub ack: u32,

    /// TCP flags as a comma-separated list (fin,syn,rst,psh,ack,urg,ece,cwr)
    #[arg(long, default_value = "syn")]
    pub flags: String,

    /// TCP window size
    #[arg(long, default_value_t = 65535)]
    pub window: u16,

    /// Override the interface MTU
    #[arg(long)]
    pub mtu: Option<u32>,

    /// IPv6 hop limit
    #[arg(long, default_value_t = 255)]
    pub hop_limit: u8,

    /// IPv6 traffic class
    #[arg(long, default_value_t = 0)]
    pub traffic_class: u8,

    /// IPv6 flow label (20 bits)
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(..=0xFFFFF))]
    pub flow_label: u32,

    /// Router Alert value for the hop-by-hop option
    #[arg(long, default_value_t = 5)]
    pub router_alert: u16,

    /// Omit the Hop-by-Hop Options header
    #[arg(long)]
    pub no_hop_by_hop: bool,

    /// ILNP nonce as 8 or 24 hex digits (default: random 12-byte nonce)
    #[arg(long)]
    pub nonce: Option<String>,

    /// Omit the Destination Options header
    #[arg(long)]
    pub no_dest_opts: bool,

    /// Fix the 32-bit fragment identification value (default: random)
    #[arg(long)]
    pub fragment_id: Option<u32>,

    /// Verbose output (-v, -vv for increasing verbosity)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Parse the --flags list into TCP flags
    pub fn tcp_flags(&self) -> Result<TcpFlags> {
        parse_tcp_flags(&self.flags)
    }

    /// Decode the --nonce hex string, if given
    pub fn nonce_bytes(&self) -> Result<Option<Vec<u8>>> {
        self.nonce.as_deref().map(parse_hex).transpose()
    }
}

fn parse_tcp_flags(spec: &str) -> Result<TcpFlags> {
    let mut flags = TcpFlags::default();
    for name in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match name.to_ascii_lowercase().as_str() {
            "fin" => flags.fin = true,
            "syn" => flags.syn = true,
            "rst" => flags.rst = true,
            "psh" => flags.psh = true,
            "ack" => flags.ack = true,
            "urg" => flags.urg = true,
            "ece" => flags.ece = true,
            "cwr" => flags.cwr = true,
            other => {
                return Err(Error::config(format!("unknown TCP flag '{}'", other)));
            }
        }
    }
    Ok(flags)
}

fn parse_hex(s: &str) -> Result<Vec<u8>> {
    if s.len() % 2 != 0 {
        return Err(Error::config(format!(
            "hex string '{}' has an odd number of digits",
            s
        )));
    }
    (0..s.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&s[i..i + 2], 16)
                .map_err(|_| Error::config(format!("invalid hex string '{}'", s)))
        })
        .collect()
}
