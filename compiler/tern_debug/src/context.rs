//! Per-output compilation context for debug info emission.

use std::sync::Arc;

use tern_session::SessionConfig;

use crate::constants::DebugConstants;
use crate::error::Result;
use crate::layout::{DataLayout, TargetLayout};
use crate::sink::DebugMetadataSink;

/// Everything debug info emission reads or writes for one output.
///
/// Bundles the session configuration, the debug constants, the target
/// layout and the artifact receiving metadata.
pub struct CompilationContext<S: DebugMetadataSink> {
    config: Arc<SessionConfig>,
    constants: &'static DebugConstants,
    layout: Box<dyn TargetLayout>,
    sink: S,
    header_emitted: bool,
}

impl<S: DebugMetadataSink> CompilationContext<S> {
    pub fn new(config: Arc<SessionConfig>, layout: impl TargetLayout + 'static, sink: S) -> Self {
        Self {
            config,
            constants: DebugConstants::current(),
            layout: Box::new(layout),
            sink,
            header_emitted: false,
        }
    }

    /// Context whose layout is derived from the configured target triple.
    pub fn for_target(config: Arc<SessionConfig>, sink: S) -> Result<Self> {
        let layout = DataLayout::for_triple(config.target())?;
        Ok(Self::new(config, layout, sink))
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn constants(&self) -> &'static DebugConstants {
        self.constants
    }

    #[must_use]
    pub fn layout(&self) -> &dyn TargetLayout {
        self.layout.as_ref()
    }

    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Give back the artifact.
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Whether this output carries debug info.
    #[must_use]
    pub fn should_contain_debug_info(&self) -> bool {
        self.config.debug_info_enabled()
    }

    pub(crate) fn header_emitted(&self) -> bool {
        self.header_emitted
    }

    pub(crate) fn set_header_emitted(&mut self) {
        self.header_emitted = true;
    }
}

impl<S: DebugMetadataSink + std::fmt::Debug> std::fmt::Debug for CompilationContext<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompilationContext")
            .field("config", &self.config)
            .field("sink", &self.sink)
            .field("header_emitted", &self.header_emitted)
            .finish_non_exhaustive()
    }
}
