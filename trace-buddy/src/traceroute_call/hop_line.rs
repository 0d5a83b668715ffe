use std::net::Ipv4Addr;
use std::time::Duration;

use hop_models::hop_event::HopEvent;
use log::warn;

/// Parses one line of `traceroute` output, such as
/// ` 3  10.1.1.1  5.104 ms * 10.1.1.2  6.01 ms`.
///
/// The first answered probe of the line wins. Returns `None` for lines that are not hops
/// (e.g. the header); a hop line without any answer yields a timed-out event.
pub fn parse(line: &str) -> Option<HopEvent> {
    let mut tokens = line.split_whitespace();
    let ttl = tokens.next()?.parse::<u8>().ok()?;
    let tokens: Vec<&str> = tokens.collect();

    let mut current: Option<Ipv4Addr> = None;
    let mut host_name: Option<&str> = None;
    for (idx, token) in tokens.iter().copied().enumerate() {
        let next = tokens.get(idx + 1).copied();
        if let Some(addr) = parse_addr(token) {
            current = Some(addr);
        } else if let Some(elapsed) = parse_rtt(token, next) {
            if let Some(addr) = current {
                let event = HopEvent::answered(ttl, addr, elapsed);
                return Some(match host_name {
                    Some(name) => event.with_host_name(name),
                    None => event,
                });
            }
        } else if is_name(token) && next.and_then(parse_parenthesised_addr).is_some() {
            host_name = Some(token);
        }
    }
    if let Some(addr) = current {
        warn!("traceroute hop {} names {} but no readable RTT, treating as lost: {}", ttl, addr, line);
    }
    Some(HopEvent::timed_out(ttl))
}

fn parse_addr(token: &str) -> Option<Ipv4Addr> {
    token.parse().ok().or_else(|| parse_parenthesised_addr(token))
}

fn parse_parenthesised_addr(token: &str) -> Option<Ipv4Addr> {
    token.strip_prefix('(')?.strip_suffix(')')?.parse().ok()
}

/// Accepts both `0.491 ms` and `0.491ms` (inetutils).
fn parse_rtt(token: &str, next: Option<&str>) -> Option<Duration> {
    let millis_str = match token.strip_suffix("ms") {
        Some(attached) => attached,
        None if next == Some("ms") => token,
        None => return None,
    };
    let millis = millis_str.parse::<f64>().ok()?;
    Duration::try_from_secs_f64(millis / 1000.0).ok()
}

/// `*` marks a lost probe, `!H` & co. annotate the previous answer.
fn is_name(token: &str) -> bool {
    token != "*" && token != "ms" && !token.starts_with('!')
}
