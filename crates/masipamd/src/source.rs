//! MAS configuration source.
//!
//! Loads the host agent's interface descriptor file once, matches it against
//! the live host interfaces and commits the resulting local address space to
//! the attached sink. After the first successful refresh the source is
//! `Loaded` for the rest of its life and further refreshes do nothing.

use crate::address_space::{AddressConfigSink, AddressScope, LOCAL_DEFAULT_ADDRESS_SPACE_ID};
use crate::config::MasSourceConfig;
use crate::descriptor::load_descriptors;
use crate::error::{IpamError, IpamResult};
use crate::host::HostInterfaceSource;
use crate::populate::{populate_address_space, PopulateReport};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Name reported by the MAS source.
pub const MAS_SOURCE_NAME: &str = "MAS";

/// Lifecycle state of a configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    /// No sink attached.
    Stopped,
    /// Sink attached, descriptor file not loaded yet.
    Started,
    /// Descriptor file loaded and committed. Terminal.
    Loaded,
}

/// Result of a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// An earlier refresh already loaded the descriptor file; nothing was read.
    AlreadyLoaded,
    /// The descriptor file was loaded and committed in this call.
    Loaded(PopulateReport),
}

/// A provider of address spaces for the IPAM manager.
pub trait AddressConfigSource {
    fn name(&self) -> &str;

    /// Attaches the sink that receives address spaces.
    fn start(&mut self, sink: Arc<dyn AddressConfigSink>) -> IpamResult<()>;

    /// Detaches and returns the sink.
    fn stop(&mut self) -> Option<Arc<dyn AddressConfigSink>>;

    /// Pushes the source's current configuration to the sink.
    fn refresh(&mut self) -> IpamResult<RefreshOutcome>;
}

/// Address config source backed by the MAS interface descriptor file.
pub struct MasSource {
    file_path: PathBuf,
    host: Box<dyn HostInterfaceSource>,
    sink: Option<Arc<dyn AddressConfigSink>>,
    file_loaded: bool,
}

impl MasSource {
    /// Creates the source, resolving the descriptor path once.
    pub fn new(config: &MasSourceConfig, host: impl HostInterfaceSource + 'static) -> Self {
        let file_path = config.resolved_file_path();
        debug!(path = %file_path.display(), "Created MAS address config source");

        Self {
            file_path,
            host: Box::new(host),
            sink: None,
            file_loaded: false,
        }
    }

    /// Path of the descriptor file this source reads.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    pub fn state(&self) -> SourceState {
        if self.file_loaded {
            SourceState::Loaded
        } else if self.sink.is_some() {
            SourceState::Started
        } else {
            SourceState::Stopped
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.file_loaded
    }

    fn load(&self, sink: &dyn AddressConfigSink) -> IpamResult<PopulateReport> {
        let interfaces = self.host.interfaces()?;
        let descriptors = load_descriptors(&self.file_path)?;

        let mut local =
            sink.new_address_space(LOCAL_DEFAULT_ADDRESS_SPACE_ID, AddressScope::Local)?;
        let report = populate_address_space(&mut local, &descriptors, &interfaces);

        sink.set_address_space(local)?;
        Ok(report)
    }
}

impl AddressConfigSource for MasSource {
    fn name(&self) -> &str {
        MAS_SOURCE_NAME
    }

    fn start(&mut self, sink: Arc<dyn AddressConfigSink>) -> IpamResult<()> {
        self.sink = Some(sink);
        Ok(())
    }

    fn stop(&mut self) -> Option<Arc<dyn AddressConfigSink>> {
        self.sink.take()
    }

    fn refresh(&mut self) -> IpamResult<RefreshOutcome> {
        if self.file_loaded {
            return Ok(RefreshOutcome::AlreadyLoaded);
        }

        let sink = self.sink.clone().ok_or_else(|| IpamError::NotStarted {
            source_name: MAS_SOURCE_NAME.to_string(),
        })?;

        let report = self.load(sink.as_ref())?;
        self.file_loaded = true;

        info!(
            path = %self.file_path.display(),
            pools = report.pools_created,
            addresses = report.addresses_added,
            "Loaded MAS interface descriptors"
        );

        Ok(RefreshOutcome::Loaded(report))
    }
}
