use clap::Args;
use log::debug;

pub use self::caller::Caller;

mod caller;
mod hop_line;

#[derive(Args, Clone)]
#[group(id = "traceroute")]
pub struct Params {
    /// FQ path to traceroute binary
    #[arg(
        long = "traceroute-bin",
        default_value = "/usr/bin/traceroute",
        env = "TRACEROUTE_BIN_PATH"
    )]
    bin_path: String,

    /// How many seconds traceroute waits for the response to a single probe
    #[arg(long, env = "TRACEROUTE_WAIT_SECS", default_value = "3")]
    wait_secs: u8,
}

impl Params {
    pub fn to_caller(&self) -> Caller {
        let caller = Caller::new(self.bin_path.to_string(), self.wait_secs);
        debug!("Using traceroute caller: {:?}", caller);
        caller
    }
}
