mod docker;
mod host;

pub use docker::{ContainerClient, ContainerRun, DockerCli, VolumeMapping, CONTAINER_MOUNT_POINT};
pub use host::HostExecutor;

/// Raw output of a host process; streams are kept separate and undecoded.
#[derive(Debug, Default)]
pub struct CapturedOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code, if the process exited normally
    pub exit_code: Option<i32>,
}
