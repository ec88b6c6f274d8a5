// Tue Jan 13 2026 - Alex

pub mod host;
pub mod result;
pub mod scheduler;
pub mod stream;
pub mod transport;

pub use host::{CapturedOutput, HostProcess, HostState};
pub use result::{HostOutcome, HostResult, RunSummary};
pub use scheduler::{run_hosts, Scheduler};
pub use stream::PipeReader;
pub use transport::{SshTransport, Transport, TransportSpec};
