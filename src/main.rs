use std::sync::Arc;

use clap::Parser;
use pcmatrix::{Args, Config, NullSink, ProductSink, StdoutSink};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args = Args::parse();
    let banner = if args.uses_defaults() { "USING DEFAULTS" } else { "USING" };
    let config = Config::try_from(args)?;

    println!(
        "{}: worker_threads={} bounded_buffer_size={} matrices={} matrix_mode={}",
        banner, config.workers, config.buffer_size, config.matrices, config.mode
    );
    println!("Producing {} matrices in mode {}.", config.matrices, config.mode);
    println!("Using a shared buffer of size={}", config.buffer_size);
    println!("With {} producer and consumer thread(s).", config.workers);
    println!();

    let sink: Arc<dyn ProductSink> = if config.quiet {
        Arc::new(NullSink)
    } else {
        Arc::new(StdoutSink)
    };

    let totals = pcmatrix::run(&config, |i| config.random_source(i), sink)?;
    print!("{}", totals);

    Ok(())
}
