//! Feeds two raw TLS byte captures (one per direction) through
//! [`tls_flow::TlsInfo`] and prints the resulting [`tls_flow::report::Report`]
//! as JSON. Stands in for the packet capture and file I/O a real embedding
//! harness would own; not part of the library's tested surface.

use std::{fs, io};

use clap::Parser;
use tls_flow::report::Report;
use tls_flow::TlsInfo;

#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Arguments {
    /// Raw record-layer bytes observed from the client.
    #[arg(long = "client")]
    client: Option<String>,

    /// Raw record-layer bytes observed from the server.
    #[arg(long = "server")]
    server: Option<String>,
}

#[derive(Debug)]
enum Error {
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}

fn accumulate(path: Option<&str>, tick: u64) -> Result<Option<TlsInfo>, Error> {
    let Some(path) = path else {
        return Ok(None);
    };
    let bytes = fs::read(path)?;
    let mut info = TlsInfo::with_defaults();
    info.feed(tick, &bytes);
    Ok(Some(info))
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Arguments::parse();

    let out = accumulate(args.client.as_deref(), 0)?;
    let in_ = accumulate(args.server.as_deref(), 1)?;

    match Report::build(out.as_ref(), in_.as_ref()) {
        Some(report) => println!("{}", report.to_json()),
        None => log::warn!("neither capture carried a negotiated TLS version; nothing to report"),
    }

    Ok(())
}
