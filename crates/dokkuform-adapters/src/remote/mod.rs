//! Remote command clients.

mod memory;
mod ssh;

pub use memory::InMemoryDokku;
pub use ssh::{SshClient, SshConfig};
