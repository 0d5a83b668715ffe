use std::borrow::Cow;
use std::io::{self, BufRead, Read};
use std::net::Ipv4Addr;
use std::process::{Command, Stdio};

use anyhow::{bail, Context, Result};
use hop_models::hop_event::HopEvent;
use hop_models::probe_request::ProbeOptions;
use log::Level::Debug;
use log::{debug, error, log_enabled, trace, warn};
use tokio::sync::mpsc::UnboundedSender;

use crate::hop_source::HopSource;

use super::hop_line;

/// Runs the system `traceroute` binary, one process per [HopSource::trace] call.
#[derive(Debug, Clone)]
pub struct Caller {
    bin_path: String,
    wait_secs: u8,
}

impl Caller {
    pub fn new(bin_path: String, wait_secs: u8) -> Self {
        Caller { bin_path, wait_secs }
    }

    fn make_cmd(&self, target: Ipv4Addr, options: &ProbeOptions) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.arg("-n")
            .arg("-m")
            .arg(options.max_hops.to_string())
            .arg("-f")
            .arg(options.first_hop.to_string())
            .arg("-q")
            .arg(options.queries_per_hop().to_string())
            .arg("-w")
            .arg(self.wait_secs.to_string())
            .arg(target.to_string());
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn watch_logger_fd<R: Read + Send + 'static>(&self, fd: Option<R>) -> Result<()> {
        let taken = fd.with_context(|| "Failed to open error stream of traceroute")?;
        std::thread::spawn(move || {
            let reader = io::BufReader::new(taken);
            for line in reader.lines().map_while(|it| it.ok()) {
                if is_fatal_line(&line) {
                    error!("traceroute: {}", line);
                } else {
                    trace!("traceroute: {}", line);
                }
            }
        });
        Ok(())
    }
}

fn is_fatal_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.contains("operation not permitted")
        || lower.contains("cannot handle")
        || lower.contains("unknown host")
        || lower.contains("usage:")
}

/// Reads hop lines until EOF, sending each hop as soon as it is complete.
/// Returns how many hops were forwarded.
fn forward_hops<R: Read>(stdout: R, events: &UnboundedSender<HopEvent>) -> usize {
    let mut forwarded = 0usize;
    for line in io::BufReader::new(stdout).lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Failed to read line from traceroute: {}", e);
                break;
            }
        };
        let Some(event) = hop_line::parse(&line) else {
            trace!("[[traceroute non-hop]] {}", line);
            continue;
        };
        trace!("[[traceroute hop]] {:?}", event);
        if let Err(e) = events.send(event) {
            warn!(
                "Unable to send hop over channel; maybe the receiver disconnected? {}",
                e
            );
            break;
        }
        forwarded += 1;
    }
    forwarded
}

impl HopSource for Caller {
    fn trace(
        &self,
        target: Ipv4Addr,
        options: &ProbeOptions,
        events: UnboundedSender<HopEvent>,
    ) -> Result<()> {
        let mut cmd = self.make_cmd(target, options);
        if log_enabled!(Debug) {
            let args: Vec<Cow<'_, str>> = cmd
                .get_args()
                .map(|os_str| os_str.to_string_lossy())
                .collect();
            debug!("Calling {} with arguments: {}", self.bin_path, args.join(" "));
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn traceroute process {}", self.bin_path))?;
        self.watch_logger_fd(child.stderr.take())?;
        let stdout = child
            .stdout
            .take()
            .with_context(|| "Failed to open output stream of traceroute")?;

        let forwarded = forward_hops(stdout, &events);
        drop(events); // end of stream for the consumer, even if we fail below
        trace!("Done reading from traceroute stdout, {} hops", forwarded);

        let exit_status = child
            .wait()
            .with_context(|| "Failed to wait for traceroute to exit")?;
        if exit_status.success() {
            debug!("traceroute to {} exited successfully", target);
            Ok(())
        } else {
            bail!(
                "traceroute to {} exited with non-successful status {:?}",
                target,
                exit_status
            )
        }
    }
}
